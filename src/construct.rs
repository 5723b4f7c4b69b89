//! Keepers for named and fallback edges, and the resolution graph over them.
//!
//! Edges are owned by their keeper and shared through `Arc`, so a lookup can
//! take a snapshot of the candidates for one step, release the lock, and run
//! the resolvers while other threads keep registering. Keepers are append-only:
//! nothing is ever removed or reordered once kept.
//!
//! Two keepers are needed:
//! - NamedEdgeKeeper: `(parent type, name)` -> edges, in registration order
//! - FallbackKeeper: `parent type` -> fallback edges, in registration order

// used to share edges between keepers, handles and running lookups
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// keepers use HashMap, the current lookup path uses HashSet
use core::hash::BuildHasherDefault;
use std::collections::{HashMap, HashSet};
use seahash::SeaHasher;

// used to print out readable forms of an edge
use std::fmt;

use tracing::{debug, trace};

// our own stuff that we need
use crate::datatype::{InfoType, InfoValue};
use crate::{InfoApiError, Result};

pub type OtherHasher = BuildHasherDefault<SeaHasher>;

/// A partial conversion: `None` means the edge does not apply to this instance.
pub type Resolver = Arc<dyn Fn(&InfoValue) -> Option<InfoValue> + Send + Sync>;

// (type, remaining dotted name) pairs entered on the current path
type Path = HashSet<(InfoType, String), OtherHasher>;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    // keepers only ever append, so a poisoned keeper is still consistent
    lock.read().unwrap_or_else(PoisonError::into_inner)
}
fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

// ------------- Edge -------------
pub struct Edge {
    parent: InfoType,
    child: InfoType,
    name: Option<String>, // None for fallback edges
    resolver: Resolver,
    metadata: Mutex<Vec<(String, String)>>,
    used: AtomicBool,
}

impl Edge {
    fn new(parent: InfoType, child: InfoType, name: Option<String>, resolver: Resolver) -> Self {
        Self {
            parent,
            child,
            name,
            resolver,
            metadata: Mutex::new(Vec::new()),
            used: AtomicBool::new(false),
        }
    }
    pub fn parent(&self) -> InfoType {
        self.parent
    }
    pub fn child(&self) -> InfoType {
        self.child
    }
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    pub fn is_fallback(&self) -> bool {
        self.name.is_none()
    }
    pub fn used(&self) -> bool {
        self.used.load(Ordering::Acquire)
    }
    /// Metadata in the order the keys were first set.
    pub fn metadata(&self) -> Vec<(String, String)> {
        self.metadata
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
    pub fn metadata_value(&self, key: &str) -> Option<String> {
        self.metadata
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
    fn set_metadata(&self, key: String, value: String) -> Result<()> {
        let mut metadata = self.metadata.lock().unwrap_or_else(PoisonError::into_inner);
        // checked under the metadata lock so a concurrent first use cannot slip in between
        if self.used() {
            return Err(InfoApiError::MetadataSealed {
                name: self.to_string(),
                key,
            });
        }
        match metadata.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => metadata.push((key, value)),
        }
        Ok(())
    }
    pub fn resolve(&self, value: &InfoValue) -> Option<InfoValue> {
        if !self.used.load(Ordering::Relaxed) {
            let _metadata = self.metadata.lock().unwrap_or_else(PoisonError::into_inner);
            self.used.store(true, Ordering::Release);
        }
        let resolved = (self.resolver)(value)?;
        debug_assert_eq!(resolved.info_type(), self.child);
        Some(resolved)
    }
}
impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} -[{}]-> {}", self.parent, name, self.child),
            None => write!(f, "{} -[fallback]-> {}", self.parent, self.child),
        }
    }
}
impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Edge")
            .field("parent", &self.parent)
            .field("child", &self.child)
            .field("name", &self.name)
            .field("used", &self.used())
            .finish()
    }
}

/// Returned by every registration so the registrant can attach metadata.
#[derive(Clone, Debug)]
pub struct EdgeHandle {
    edge: Arc<Edge>,
}

impl EdgeHandle {
    pub fn new(edge: Arc<Edge>) -> Self {
        Self { edge }
    }
    pub fn edge(&self) -> &Arc<Edge> {
        &self.edge
    }
    pub fn name(&self) -> Option<&str> {
        self.edge.name()
    }
    pub fn parent(&self) -> InfoType {
        self.edge.parent()
    }
    pub fn child(&self) -> InfoType {
        self.edge.child()
    }
    pub fn metadata(&self) -> Vec<(String, String)> {
        self.edge.metadata()
    }
    pub fn metadata_value(&self, key: &str) -> Option<String> {
        self.edge.metadata_value(key)
    }
    /// Sets or replaces a metadata entry. Fails once a lookup has used the edge.
    pub fn set_metadata<K: Into<String>, V: Into<String>>(&self, key: K, value: V) -> Result<&Self> {
        self.edge.set_metadata(key.into(), value.into())?;
        Ok(self)
    }
}

// ------------- NamedEdgeKeeper -------------
#[derive(Debug)]
pub struct NamedEdgeKeeper {
    kept: HashMap<(InfoType, String), Vec<Arc<Edge>>, OtherHasher>,
    by_parent: HashMap<InfoType, Vec<Arc<Edge>>, OtherHasher>, // double indexing for listings
    length: usize,
}
impl NamedEdgeKeeper {
    pub fn new() -> Self {
        Self {
            kept: HashMap::default(),
            by_parent: HashMap::default(),
            length: 0,
        }
    }
    pub fn keep(
        &mut self,
        parent: InfoType,
        name: &str,
        child: InfoType,
        resolver: Resolver,
    ) -> Result<Arc<Edge>> {
        if name.is_empty() {
            return Err(InfoApiError::EmptyName);
        }
        let name = name.to_lowercase();
        let edge = Arc::new(Edge::new(parent, child, Some(name.clone()), resolver));
        // same-name edges are kept side by side, never overwritten
        self.kept
            .entry((parent, name))
            .or_default()
            .push(Arc::clone(&edge));
        self.by_parent
            .entry(parent)
            .or_default()
            .push(Arc::clone(&edge));
        self.length += 1;
        Ok(edge)
    }
    pub fn candidates(&self, parent: InfoType, name: &str) -> Vec<Arc<Edge>> {
        self.kept
            .get(&(parent, name.to_lowercase()))
            .cloned()
            .unwrap_or_default()
    }
    pub fn edges_of(&self, parent: InfoType) -> Vec<Arc<Edge>> {
        self.by_parent.get(&parent).cloned().unwrap_or_default()
    }
    pub fn edges_between(&self, parent: InfoType, child: InfoType) -> Vec<Arc<Edge>> {
        self.by_parent
            .get(&parent)
            .map(|edges| {
                edges
                    .iter()
                    .filter(|edge| edge.child() == child)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
    pub fn len(&self) -> usize {
        self.length
    }
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}
impl Default for NamedEdgeKeeper {
    fn default() -> Self {
        Self::new()
    }
}

// ------------- FallbackKeeper -------------
#[derive(Debug)]
pub struct FallbackKeeper {
    kept: HashMap<InfoType, Vec<Arc<Edge>>, OtherHasher>,
    length: usize,
}
impl FallbackKeeper {
    pub fn new() -> Self {
        Self {
            kept: HashMap::default(),
            length: 0,
        }
    }
    // Self-fallbacks and longer cycles are accepted here and cut during lookup.
    pub fn keep(&mut self, parent: InfoType, fallback: InfoType, resolver: Resolver) -> Arc<Edge> {
        let edge = Arc::new(Edge::new(parent, fallback, None, resolver));
        self.kept.entry(parent).or_default().push(Arc::clone(&edge));
        self.length += 1;
        edge
    }
    pub fn fallbacks_of(&self, parent: InfoType) -> Vec<Arc<Edge>> {
        self.kept.get(&parent).cloned().unwrap_or_default()
    }
    pub fn len(&self) -> usize {
        self.length
    }
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}
impl Default for FallbackKeeper {
    fn default() -> Self {
        Self::new()
    }
}

// ------------- ResolutionGraph -------------
pub struct ResolutionGraph {
    pub named_edge_keeper: Arc<RwLock<NamedEdgeKeeper>>,
    pub fallback_keeper: Arc<RwLock<FallbackKeeper>>,
}

impl ResolutionGraph {
    pub fn new() -> Self {
        Self {
            named_edge_keeper: Arc::new(RwLock::new(NamedEdgeKeeper::new())),
            fallback_keeper: Arc::new(RwLock::new(FallbackKeeper::new())),
        }
    }
    pub fn named_edge_keeper(&self) -> Arc<RwLock<NamedEdgeKeeper>> {
        Arc::clone(&self.named_edge_keeper)
    }
    pub fn fallback_keeper(&self) -> Arc<RwLock<FallbackKeeper>> {
        Arc::clone(&self.fallback_keeper)
    }
    pub fn register_info(
        &self,
        parent: InfoType,
        name: &str,
        child: InfoType,
        resolver: Resolver,
    ) -> Result<EdgeHandle> {
        let edge = write(&self.named_edge_keeper).keep(parent, name, child, resolver)?;
        debug!(%parent, %child, name = ?edge.name(), "registered info");
        Ok(EdgeHandle::new(edge))
    }
    pub fn register_fallback(
        &self,
        parent: InfoType,
        fallback: InfoType,
        resolver: Resolver,
    ) -> EdgeHandle {
        let edge = write(&self.fallback_keeper).keep(parent, fallback, resolver);
        debug!(%parent, %fallback, "registered fallback");
        EdgeHandle::new(edge)
    }
    pub fn infos_of(&self, parent: InfoType) -> Vec<EdgeHandle> {
        read(&self.named_edge_keeper)
            .edges_of(parent)
            .into_iter()
            .map(EdgeHandle::new)
            .collect()
    }
    pub fn infos_between(&self, parent: InfoType, child: InfoType) -> Vec<EdgeHandle> {
        read(&self.named_edge_keeper)
            .edges_between(parent, child)
            .into_iter()
            .map(EdgeHandle::new)
            .collect()
    }
    pub fn fallbacks_of(&self, parent: InfoType) -> Vec<EdgeHandle> {
        read(&self.fallback_keeper)
            .fallbacks_of(parent)
            .into_iter()
            .map(EdgeHandle::new)
            .collect()
    }

    /// Resolves `dotted_name` starting from `start`.
    ///
    /// Names are matched case-insensitively. At each value the leading
    /// segments are matched against the names registered on its type,
    /// shortest prefix first and same-name edges in registration order,
    /// backtracking whenever the rest of the name cannot be resolved from the
    /// produced child. When no named edge leads anywhere, each fallback of the
    /// type is tried in registration order with the whole name. A `(type, name)`
    /// pair already being resolved further up the path is never entered again,
    /// which bounds the search however the fallbacks are wired.
    ///
    /// `None` means the name has no value for this particular instance.
    pub fn lookup(&self, start: &InfoValue, dotted_name: &str) -> Option<InfoValue> {
        let name = dotted_name.to_lowercase();
        let mut path = Path::default();
        let found = self.descend(start, &name, &mut path);
        if found.is_none() {
            trace!(info_type = %start.info_type(), name = %name, "no result");
        }
        found
    }

    fn descend(&self, value: &InfoValue, name: &str, path: &mut Path) -> Option<InfoValue> {
        let step = (value.info_type(), name.to_owned());
        if !path.insert(step.clone()) {
            return None;
        }
        let found = self
            .resolve_direct(value, name, path)
            .or_else(|| self.resolve_fallback(value, name, path));
        path.remove(&step);
        found
    }

    fn resolve_direct(&self, value: &InfoValue, name: &str, path: &mut Path) -> Option<InfoValue> {
        let info_type = value.info_type();
        let boundaries = name
            .match_indices('.')
            .map(|(at, _)| at)
            .chain(std::iter::once(name.len()));
        for end in boundaries {
            let head = &name[..end];
            let rest = name.get(end + 1..);
            let candidates = read(&self.named_edge_keeper).candidates(info_type, head);
            for edge in candidates {
                let Some(child) = edge.resolve(value) else {
                    continue;
                };
                let Some(rest) = rest else {
                    return Some(child);
                };
                if let Some(found) = self.descend(&child, rest, path) {
                    return Some(found);
                }
                trace!(%edge, rest, "backtracking");
            }
        }
        None
    }

    fn resolve_fallback(&self, value: &InfoValue, name: &str, path: &mut Path) -> Option<InfoValue> {
        let fallbacks = read(&self.fallback_keeper).fallbacks_of(value.info_type());
        for edge in fallbacks {
            if path.contains(&(edge.child(), name.to_owned())) {
                trace!(%edge, name, "fallback cycle cut");
                continue;
            }
            let Some(substitute) = edge.resolve(value) else {
                continue;
            };
            if let Some(found) = self.descend(&substitute, name, path) {
                return Some(found);
            }
        }
        None
    }
}
impl Default for ResolutionGraph {
    fn default() -> Self {
        Self::new()
    }
}
