//! The registry facade plugins and template engines talk to.
//!
//! Plugins call [`InfoApi::provide_info`] and [`InfoApi::provide_fallback`]
//! once while loading, with closures over their own info types. Template
//! engines hand a starting [`InfoValue`] and a dotted name to
//! [`InfoApi::resolve`] and decide themselves what to print for `None`.
//!
//! A process normally shares [`InfoApi::global`], which is created on first
//! access. Independent instances from [`InfoApi::new`] are useful in tests and
//! when embedding several registries in one process.

use std::sync::{Arc, OnceLock};

// used to validate dotted names at registration
use lazy_static::lazy_static;
use regex::Regex;

use tracing::warn;

use crate::construct::{EdgeHandle, ResolutionGraph, Resolver};
use crate::datatype::{Info, InfoType, InfoValue};
use crate::{InfoApiError, Result};

lazy_static! {
    static ref INFO_NAME: Regex = Regex::new(r"^[A-Za-z0-9]+(\.[A-Za-z0-9]+)*$").unwrap();
}

static GLOBAL: OnceLock<InfoApi> = OnceLock::new();

/// Checks that `fqn` is a dotted name and returns its canonical lowercase form.
pub fn canonical_name(fqn: &str) -> Result<String> {
    if fqn.is_empty() {
        return Err(InfoApiError::EmptyName);
    }
    if !INFO_NAME.is_match(fqn) {
        return Err(InfoApiError::MalformedName(fqn.to_string()));
    }
    Ok(fqn.to_lowercase())
}

// Lifts a typed closure into one that works on any info value.
fn erase<P, C, F>(resolve: F) -> Resolver
where
    P: Info,
    C: Info,
    F: Fn(&P) -> Option<C> + Send + Sync + 'static,
{
    Arc::new(move |value: &InfoValue| {
        value
            .downcast_ref::<P>()
            .and_then(|parent| resolve(parent))
            .map(InfoValue::new)
    })
}

pub struct InfoApi {
    graph: Arc<ResolutionGraph>,
}

impl InfoApi {
    pub fn new() -> Self {
        Self::with_graph(Arc::new(ResolutionGraph::new()))
    }
    pub fn with_graph(graph: Arc<ResolutionGraph>) -> Self {
        Self { graph }
    }

    /// The process-wide registry, created on first access.
    ///
    /// Concurrent first accesses all observe the same instance.
    pub fn global() -> &'static InfoApi {
        GLOBAL.get_or_init(InfoApi::new)
    }
    pub fn is_global_initialized() -> bool {
        GLOBAL.get().is_some()
    }

    pub fn graph(&self) -> Arc<ResolutionGraph> {
        Arc::clone(&self.graph)
    }

    /// Registers a child info for infos of type `P`.
    ///
    /// `fqn` is a dot-delimited name with increasing specificness, e.g.
    /// `multieconomy.money`. It is matched case-insensitively, so `fooBar` and
    /// `foobar` are the same name. Registering a name that already exists on
    /// `P` adds another candidate after the existing ones.
    ///
    /// `resolve` returns `None` when the info is not available for that
    /// instance.
    pub fn provide_info<P, C, F>(&self, fqn: &str, resolve: F) -> Result<EdgeHandle>
    where
        P: Info,
        C: Info,
        F: Fn(&P) -> Option<C> + Send + Sync + 'static,
    {
        let name = canonical_name(fqn).inspect_err(|e| {
            warn!(parent = P::INFO_TYPE, fqn, error = %e, "rejected info registration");
        })?;
        self.graph
            .register_info(InfoType::of::<P>(), &name, InfoType::of::<C>(), erase(resolve))
    }

    /// Registers `C` as a fallback for infos of type `P`.
    ///
    /// A name not found on `P` is searched again, in full, on the fallback,
    /// and transitively on the fallback's own fallbacks. Fallbacks of the same
    /// type are tried in the order they were registered. Cycles are allowed and
    /// simply stop the search on the branch that closes them.
    pub fn provide_fallback<P, C, F>(&self, resolve: F) -> EdgeHandle
    where
        P: Info,
        C: Info,
        F: Fn(&P) -> Option<C> + Send + Sync + 'static,
    {
        self.graph
            .register_fallback(InfoType::of::<P>(), InfoType::of::<C>(), erase(resolve))
    }

    pub fn resolve(&self, start: &InfoValue, dotted_name: &str) -> Option<InfoValue> {
        self.graph.lookup(start, dotted_name)
    }
    pub fn resolve_to_string(&self, start: &InfoValue, dotted_name: &str) -> Option<String> {
        self.resolve(start, dotted_name).map(|info| info.to_string())
    }

    /// Every named info registered on `P`, in registration order.
    pub fn infos_of<P: Info>(&self) -> Vec<EdgeHandle> {
        self.graph.infos_of(InfoType::of::<P>())
    }
    pub fn fallbacks_of<P: Info>(&self) -> Vec<EdgeHandle> {
        self.graph.fallbacks_of(InfoType::of::<P>())
    }
}

impl Default for InfoApi {
    fn default() -> Self {
        Self::new()
    }
}
