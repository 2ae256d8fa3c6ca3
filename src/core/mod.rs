// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core primitives – requests, route entries & errors.
//!
//! Everything a routing decision is made *of* lives in this module. The
//! matching machinery sits in `matcher.rs` (predicates) and `router.rs`
//! (virtual hosts and the configuration builder).

#[cfg(test)]
mod tests;

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::config::RouteActionDescriptor;
use crate::filters::RouteFilterConfigFactory;

/// Errors that can occur while building a route configuration.
///
/// All of these are build-time and fatal: a failed build returns no partial
/// structure and the caller keeps serving its previous configuration.
/// Request-time matching never raises; absent routes and absent per-filter
/// configs are `None` results, not errors.
#[derive(Error, Debug)]
pub enum RouteError {
    /// A host domain appears more than once across the configuration.
    #[error("duplicate domain '{domain}' in route configuration '{config}'")]
    DuplicateHost { config: String, domain: String },

    /// More than one catch-all (`"*"`) domain was configured.
    #[error("only a single wildcard domain is permitted in route configuration '{config}'")]
    MultipleWildcard { config: String },

    /// A host domain was the empty string.
    #[error("invalid empty host in route configuration '{config}'")]
    EmptyHost { config: String },

    /// Fallback routes and a catch-all virtual host were both configured.
    #[error(
        "fallback routes cannot be combined with a catch-all ('*') virtual host in route configuration '{config}'"
    )]
    ConflictingCatchAll { config: String },

    /// A match tree referenced a data input kind nobody registered.
    #[error("unknown data input type: {0}")]
    UnknownInput(String),

    /// The validation visitor rejected a data input kind for this context.
    #[error("data input '{input}' is not usable in this routing context: {reason}")]
    DisallowedInput { input: String, reason: String },

    /// A predicate or value matcher was malformed.
    #[error("invalid matcher configuration: {0}")]
    InvalidMatcher(String),

    /// A per-filter config factory rejected its configuration blob.
    #[error("per-filter config error: {filter}: {message}")]
    FilterConfig { filter: String, message: String },
}

impl RouteError {
    /// Create a new per-filter config error.
    pub fn filter_config<F: std::fmt::Display, M: std::fmt::Display>(
        filter: F,
        message: M,
    ) -> Self {
        Self::FilterConfig {
            filter: filter.to_string(),
            message: message.to_string(),
        }
    }
}

/// Accessors the codec/transport collaborator provides for a request to be
/// routable.
///
/// The built-in data input kinds (`host`, `method`, `property`) read
/// exactly these three accessors. "Unavailable" (`None`) is a valid result
/// for a property: predicates over a missing property evaluate false
/// instead of raising.
pub trait MatchRequest {
    /// Host or service name the request is addressed to.
    fn host(&self) -> &str;

    /// Method or operation name of the request.
    fn method(&self) -> &str;

    /// Arbitrary protocol property by key.
    fn property(&self, key: &str) -> Option<&str>;
}

/// Filter-keyed metadata attached to a route entry.
///
/// Always present on an entry (possibly empty) and read-only after the
/// build.
#[derive(Debug, Clone, Default)]
pub struct RouteMetadata {
    filter_metadata: HashMap<String, Value>,
}

impl RouteMetadata {
    pub(crate) fn new(filter_metadata: HashMap<String, Value>) -> Self {
        Self { filter_metadata }
    }

    /// The metadata struct configured for a filter, if any.
    pub fn filter(&self, filter: &str) -> Option<&Value> {
        self.filter_metadata.get(filter)
    }

    /// A single value inside a filter's metadata struct.
    pub fn value(&self, filter: &str, key: &str) -> Option<&Value> {
        self.filter(filter)?.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.filter_metadata.is_empty()
    }
}

/// Opaque, filter-defined configuration attached to a route entry.
///
/// The concrete type is only known to the filter that registered the
/// factory; consumers recover it through [`as_any`](Self::as_any) or
/// [`RouteEntry::typed_per_filter_config`].
pub trait RouteFilterConfig: Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// Shared reference to a [`RouteEntry`].
///
/// Entries are reference-counted: every request that resolved to an entry
/// holds its own reference, so an entry outlives any single request and any
/// configuration swap that happens underneath it.
pub type RouteEntryRef = Arc<RouteEntry>;

/// Terminal routing record: the cluster to send the request to plus
/// per-route metadata and per-filter configuration overlays.
#[derive(Debug)]
pub struct RouteEntry {
    cluster: String,
    metadata: RouteMetadata,
    per_filter_configs: HashMap<String, Arc<dyn RouteFilterConfig>>,
}

impl RouteEntry {
    /// Build an entry from its descriptor, resolving per-filter overlays
    /// through the registered factories.
    pub(crate) fn from_descriptor(descriptor: &RouteActionDescriptor) -> Result<Self, RouteError> {
        let mut per_filter_configs = HashMap::new();
        for (filter, blob) in &descriptor.per_filter_config {
            if let Some(config) =
                RouteFilterConfigFactory::create_route_filter_config(filter, blob.clone())?
            {
                per_filter_configs.insert(filter.clone(), config);
            }
        }

        Ok(Self {
            cluster: descriptor.cluster.clone(),
            metadata: RouteMetadata::new(descriptor.metadata.clone()),
            per_filter_configs,
        })
    }

    /// Name of the upstream cluster this route targets.
    ///
    /// Cluster existence is not validated here; that is the cluster
    /// manager's concern.
    pub fn cluster_name(&self) -> &str {
        &self.cluster
    }

    /// The route's filter-keyed metadata. Always present, possibly empty.
    pub fn metadata(&self) -> &RouteMetadata {
        &self.metadata
    }

    /// The per-filter config built for `filter`.
    ///
    /// `None` if no configuration blob was supplied for the filter, no
    /// factory is registered under its name, or the factory produced no
    /// object. Repeated calls return the same object.
    pub fn per_filter_config(&self, filter: &str) -> Option<&dyn RouteFilterConfig> {
        self.per_filter_configs.get(filter).map(Arc::as_ref)
    }

    /// [`per_filter_config`](Self::per_filter_config), downcast to the
    /// filter's concrete type. `None` on a type mismatch as well.
    pub fn typed_per_filter_config<T: RouteFilterConfig + 'static>(
        &self,
        filter: &str,
    ) -> Option<&T> {
        self.per_filter_config(filter)?.as_any().downcast_ref::<T>()
    }
}

/// Match-tree terminal action binding a shared [`RouteEntry`].
#[derive(Debug, Clone)]
pub struct RouteAction {
    route: RouteEntryRef,
}

impl RouteAction {
    pub(crate) fn new(route: RouteEntryRef) -> Self {
        Self { route }
    }

    /// The bound route entry. Repeated calls on the same action yield the
    /// identical (reference-equal) entry, never a reconstruction.
    pub fn route(&self) -> RouteEntryRef {
        Arc::clone(&self.route)
    }
}
