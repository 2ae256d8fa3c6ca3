// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-filter route configuration overlays.
//!
//! A route entry can carry one opaque, filter-defined configuration object
//! per filter name. Filters are **opt-in** – a filter that wants route-level
//! overrides registers a factory under its name; the builder feeds it each
//! route's configuration blob for that name. A filter name with no
//! registered factory is silently skipped: the route simply has no
//! overlay for that filter, which is not an error.

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::core::{RouteError, RouteFilterConfig};

/// Constructor signature every per-filter config factory must implement.
///
/// Returning `Ok(None)` means the filter declines to produce an overlay for
/// this route; returning `Err` rejects the blob and fails the whole build.
pub type RouteFilterConfigConstructor =
    fn(serde_json::Value) -> Result<Option<Arc<dyn RouteFilterConfig>>, RouteError>;

/// Global registry – `register_route_filter_config()` writes to it,
/// `RouteFilterConfigFactory::create_route_filter_config()` reads from it.
static ROUTE_FILTER_CONFIG_REGISTRY: Lazy<RwLock<HashMap<String, RouteFilterConfigConstructor>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a per-filter config factory under the filter's unique name.
/// Call this **before** building a configuration that references it:
///
/// ```rust
/// use std::any::Any;
/// use std::sync::Arc;
/// use crossbar::{register_route_filter_config, RouteFilterConfig};
///
/// #[derive(Debug)]
/// struct RateLimitOverride {
///     requests_per_second: u32,
/// }
///
/// impl RouteFilterConfig for RateLimitOverride {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// register_route_filter_config("rate_limit", |cfg| {
///     let requests_per_second = cfg["requests_per_second"].as_u64().unwrap_or(0) as u32;
///     Ok(Some(Arc::new(RateLimitOverride { requests_per_second })))
/// });
/// ```
pub fn register_route_filter_config(name: &str, ctor: RouteFilterConfigConstructor) {
    ROUTE_FILTER_CONFIG_REGISTRY
        .write()
        .expect("ROUTE_FILTER_CONFIG_REGISTRY poisoned")
        .insert(name.to_string(), ctor);
}

/// Internal helper – fetch a constructor if somebody registered one.
fn get_registered_factory(name: &str) -> Option<RouteFilterConfigConstructor> {
    ROUTE_FILTER_CONFIG_REGISTRY
        .read()
        .expect("ROUTE_FILTER_CONFIG_REGISTRY poisoned")
        .get(name)
        .copied()
}

/// Factory resolving per-route filter overlays by filter name.
#[derive(Debug)]
pub struct RouteFilterConfigFactory;

impl RouteFilterConfigFactory {
    /// Build the overlay for `filter` from its configuration blob.
    ///
    /// An unregistered filter name yields `Ok(None)`. A registered factory
    /// that rejects the blob fails the build.
    pub fn create_route_filter_config(
        filter: &str,
        config: serde_json::Value,
    ) -> Result<Option<Arc<dyn RouteFilterConfig>>, RouteError> {
        match get_registered_factory(filter) {
            Some(ctor) => {
                log::debug!("Creating per-filter config for '{}'", filter);
                ctor(config)
            }
            None => {
                log::debug!(
                    "No per-filter config factory registered for '{}', skipping",
                    filter
                );
                Ok(None)
            }
        }
    }
}
