//! InfoAPI – a registry of typed infos resolvable by dotted names.
//!
//! Independent plugins publish *infos*: typed, read-only facts about runtime
//! objects such as a time, a world or a number. A template engine then asks
//! for a dotted name like `infoapi.time.year` starting from some info, and
//! the registry walks the conversions plugins registered until it reaches a
//! value, without those plugins ever referencing each other.
//!
//! * A [`datatype::Info`] is any type with a stable kind name; an
//!   [`datatype::InfoValue`] pairs a value with its [`datatype::InfoType`].
//! * A *named edge* converts one info into another under a case-insensitive
//!   dotted name. Conversions are partial: an offline player has no location.
//! * A *fallback edge* lets a name that is not found on one info type be
//!   searched again, in full, on another.
//!
//! ## Modules
//! * [`datatype`] – The [`datatype::Info`] trait, type tags, type-erased values
//!   and the infos shipped with the crate (time, number, string, world).
//! * [`construct`] – Edge keepers and the [`construct::ResolutionGraph`] with
//!   its lookup.
//! * [`interface`] – The [`interface::InfoApi`] facade: name validation, typed
//!   registration, lookups and the lazily created process-wide instance.
//! * [`settings`] – Runtime settings read through the `config` crate.
//!
//! ## Quick Start
//! ```
//! use chrono::NaiveDate;
//! use infoapi::datatype::{InfoValue, NumberInfo, TimeInfo};
//! use infoapi::interface::InfoApi;
//! let api = InfoApi::new();
//! TimeInfo::init(&api).unwrap();
//! let moment = NaiveDate::from_ymd_opt(2006, 1, 2).unwrap().and_hms_opt(15, 4, 5).unwrap();
//! let time = InfoValue::new(TimeInfo::new(moment));
//! let year = api.resolve(&time, "infoapi.time.year").unwrap();
//! assert_eq!(year.downcast_ref::<NumberInfo>().unwrap().value(), 2006.0);
//! assert_eq!(api.resolve_to_string(&time, "InfoAPI.Time.Weekday").as_deref(), Some("Mon"));
//! ```
//!
//! ## Resolution order
//! Registration order is the only ordering signal. Plugins that need a
//! particular precedence must control the order in which they register.

pub mod construct;
pub mod datatype;
pub mod error;
pub mod interface;
pub mod settings;

pub use error::{InfoApiError, Result};
