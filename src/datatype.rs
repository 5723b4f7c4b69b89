// used for timestamps wrapped by TimeInfo
use chrono::{Datelike, Local, NaiveDateTime, Timelike};

// used to identify info kinds independently of their display names
use std::any::{Any, TypeId};
// used to print out readable forms of an info
use std::fmt;
// used to indicate that info types need to be hashable
use std::hash::{Hash, Hasher};
// infos are shared between the caller and every edge that produces them
use std::sync::Arc;

use crate::interface::InfoApi;
use crate::Result;

/// A typed, read-only fact about some runtime entity.
///
/// Implementors only provide a stable kind name. The registry identifies the
/// kind by the Rust type itself, so two infos sharing a name never collide.
pub trait Info: fmt::Display + Send + Sync + 'static {
    // static stuff which needs to be implemented downstream
    const INFO_TYPE: &'static str;
    // instance callable with pre-made implementation
    fn info_type(&self) -> InfoType
    where
        Self: Sized,
    {
        InfoType::of::<Self>()
    }
}

// ------------- Info Type -------------
#[derive(Clone, Copy, Debug, Eq)]
pub struct InfoType {
    id: TypeId,
    name: &'static str,
}

impl InfoType {
    pub fn of<I: Info>() -> Self {
        Self {
            id: TypeId::of::<I>(),
            name: I::INFO_TYPE,
        }
    }
    pub fn name(&self) -> &'static str {
        self.name
    }
}
// the name is only a label, identity is carried by the type id
impl PartialEq for InfoType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Hash for InfoType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl fmt::Display for InfoType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ------------- Info Value -------------
trait ErasedInfo: fmt::Display + Send + Sync {
    fn erased_type(&self) -> InfoType;
    fn as_any(&self) -> &dyn Any;
}
impl<I: Info> ErasedInfo for I {
    fn erased_type(&self) -> InfoType {
        InfoType::of::<I>()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An info of any registered kind, paired with its type tag.
#[derive(Clone)]
pub struct InfoValue {
    info: Arc<dyn ErasedInfo>,
}

impl InfoValue {
    pub fn new<I: Info>(info: I) -> Self {
        Self {
            info: Arc::new(info),
        }
    }
    pub fn info_type(&self) -> InfoType {
        self.info.erased_type()
    }
    pub fn is<I: Info>(&self) -> bool {
        self.info_type() == InfoType::of::<I>()
    }
    pub fn downcast_ref<I: Info>(&self) -> Option<&I> {
        self.info.as_any().downcast_ref::<I>()
    }
}
impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&*self.info, f)
    }
}
impl fmt::Debug for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InfoValue({}: {})", self.info_type(), self.info)
    }
}
impl<I: Info> From<I> for InfoValue {
    fn from(info: I) -> Self {
        Self::new(info)
    }
}

// ------------- Infos --------------
#[derive(Clone, Debug, PartialEq)]
pub struct NumberInfo(f64);

impl NumberInfo {
    pub fn new<T: Into<f64>>(value: T) -> Self {
        Self(value.into())
    }
    pub fn value(&self) -> f64 {
        self.0
    }
}
impl Info for NumberInfo {
    const INFO_TYPE: &'static str = "number";
}
impl fmt::Display for NumberInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // whole numbers are printed without a trailing ".0"
        if self.0.is_finite() && self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StringInfo(String);

impl StringInfo {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }
    pub fn value(&self) -> &str {
        &self.0
    }
}
impl Info for StringInfo {
    const INFO_TYPE: &'static str = "string";
}
impl fmt::Display for StringInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimeInfo(NaiveDateTime);

impl TimeInfo {
    pub fn new(moment: NaiveDateTime) -> Self {
        Self(moment)
    }
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }
    pub fn value(&self) -> &NaiveDateTime {
        &self.0
    }

    /// Registers the date and time parts of a time.
    pub fn init(api: &InfoApi) -> Result<()> {
        api.provide_info("infoapi.time.year", |info: &TimeInfo| {
            Some(NumberInfo::new(info.0.year()))
        })?
        .set_metadata("description", "The year part of a date")?
        .set_metadata("example", "2006")?;
        api.provide_info("infoapi.time.month", |info: &TimeInfo| {
            Some(NumberInfo::new(info.0.month()))
        })?
        .set_metadata("description", "The month part of a date")?
        .set_metadata("example", "1")?;
        api.provide_info("infoapi.time.date", |info: &TimeInfo| {
            Some(NumberInfo::new(info.0.day()))
        })?
        .set_metadata("description", "The date part of a date")?
        .set_metadata("example", "2")?;
        api.provide_info("infoapi.time.weekday", |info: &TimeInfo| {
            Some(StringInfo::new(info.0.format("%a").to_string()))
        })?
        .set_metadata("description", "The weekday part of a date")?
        .set_metadata("example", "Mon")?;
        api.provide_info("infoapi.time.hour", |info: &TimeInfo| {
            Some(NumberInfo::new(info.0.hour()))
        })?
        .set_metadata("description", "The hour part of a time")?
        .set_metadata("example", "15")?;
        api.provide_info("infoapi.time.minute", |info: &TimeInfo| {
            Some(NumberInfo::new(info.0.minute()))
        })?
        .set_metadata("description", "The minute part of a time")?
        .set_metadata("example", "4")?;
        api.provide_info("infoapi.time.second", |info: &TimeInfo| {
            Some(NumberInfo::new(info.0.second()))
        })?
        .set_metadata("description", "The second part of a time")?
        .set_metadata("example", "5")?;
        Ok(())
    }
}
impl Info for TimeInfo {
    const INFO_TYPE: &'static str = "time";
}
impl fmt::Display for TimeInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.nanosecond() == 0 {
            write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
        } else {
            write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.f"))
        }
    }
}

/// The parts of a host world that WorldInfo exposes.
pub trait World: Send + Sync {
    fn folder_name(&self) -> String;
    fn display_name(&self) -> String;
    fn time(&self) -> i64;
    fn seed(&self) -> i64;
}

#[derive(Clone)]
pub struct WorldInfo(Arc<dyn World>);

impl WorldInfo {
    pub fn new(world: Arc<dyn World>) -> Self {
        Self(world)
    }
    pub fn world(&self) -> &Arc<dyn World> {
        &self.0
    }

    pub fn init(api: &InfoApi) -> Result<()> {
        api.provide_info("infoapi.world.name", |info: &WorldInfo| {
            Some(StringInfo::new(info.0.folder_name()))
        })?
        .set_metadata("description", "The folder name of a world")?;
        api.provide_info("infoapi.world.folderName", |info: &WorldInfo| {
            Some(StringInfo::new(info.0.folder_name()))
        })?
        .set_metadata("description", "The folder name of a world")?;
        api.provide_info("infoapi.world.customName", |info: &WorldInfo| {
            Some(StringInfo::new(info.0.display_name()))
        })?
        .set_metadata("description", "The display name of a world")?;
        api.provide_info("infoapi.world.displayName", |info: &WorldInfo| {
            Some(StringInfo::new(info.0.display_name()))
        })?
        .set_metadata("description", "The display name of a world")?;
        api.provide_info("infoapi.world.time", |info: &WorldInfo| {
            Some(NumberInfo::new(info.0.time() as f64))
        })?
        .set_metadata("description", "The in-game time of a world")?;
        api.provide_info("infoapi.world.seed", |info: &WorldInfo| {
            Some(NumberInfo::new(info.0.seed() as f64))
        })?
        .set_metadata("description", "The generation seed of a world")?;
        Ok(())
    }
}
impl Info for WorldInfo {
    const INFO_TYPE: &'static str = "world";
}
impl fmt::Display for WorldInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.folder_name())
    }
}

/// Registers every info kind shipped with this crate.
pub fn register_builtins(api: &InfoApi) -> Result<()> {
    TimeInfo::init(api)?;
    WorldInfo::init(api)?;
    Ok(())
}
