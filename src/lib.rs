// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Crossbar - a protocol-agnostic route matching core for extensible proxies
//!
//! Crossbar resolves an inbound request - identified by its host or service
//! name, its method, and arbitrary key/value properties - to a routing
//! decision: a destination cluster plus per-route metadata and per-filter
//! configuration overlays. It is a pure library, consumed inside a larger
//! proxy filter chain; it owns no sockets, no wire format and no CLI.
//!
//! # Core Principles
//!
//! - **Immutability**: a [`RouteConfiguration`] is built once from a
//!   descriptor and never mutated. Reconfiguration builds a new instance and
//!   swaps it in atomically through a [`RouteConfigHandle`].
//! - **Fail fast**: every shape invariant (domain uniqueness, wildcard
//!   rules, data input resolution) is enforced while building. Request-time
//!   matching never raises - it yields a route entry or `None`.
//! - **Extensibility**: data inputs and per-filter route configs are
//!   resolved by name through constructor registries, so protocols and
//!   filters plug in without touching this crate.
//!
//! # Two-stage matching
//!
//! Request handling first resolves a virtual host from the request's host
//! string (exact domain, then longest `"x*"` prefix pattern, then longest
//! `"*x"` suffix pattern, then the `"*"` catch-all), then evaluates that
//! virtual host's match tree: a boolean and/or/single predicate structure
//! over pluggable [`DataInput`]s, where the first matching node (in
//! declaration order) that carries an action decides the route.
//!
//! # Example
//!
//! ```rust
//! use crossbar::{MatchRequest, RouteConfigDescriptor, RouteConfiguration};
//!
//! struct Request {
//!     host: String,
//!     method: String,
//! }
//!
//! impl MatchRequest for Request {
//!     fn host(&self) -> &str {
//!         &self.host
//!     }
//!
//!     fn method(&self) -> &str {
//!         &self.method
//!     }
//!
//!     fn property(&self, _key: &str) -> Option<&str> {
//!         None
//!     }
//! }
//!
//! let descriptor: RouteConfigDescriptor = serde_json::from_value(serde_json::json!({
//!     "name": "example",
//!     "virtual_hosts": [{
//!         "name": "echo",
//!         "hosts": ["echo.local"],
//!         "routes": [{
//!             "predicate": {
//!                 "single": { "input": { "type": "method" }, "value": { "exact": "Echo" } }
//!             },
//!             "action": { "cluster": "echo_backend" }
//!         }]
//!     }]
//! }))
//! .unwrap();
//!
//! let config = RouteConfiguration::from_descriptor(&descriptor).unwrap();
//! let request = Request {
//!     host: "echo.local".to_string(),
//!     method: "Echo".to_string(),
//! };
//!
//! let entry = config.route_entry(&request).expect("route should match");
//! assert_eq!(entry.cluster_name(), "echo_backend");
//! ```

// Module declarations
pub mod config;
pub mod core;
pub mod filters;
pub mod matcher;
pub mod router;

// Re-export key types at the crate root for convenience
pub use config::{
    DataInputDescriptor, MatchRuleDescriptor, PredicateDescriptor, RouteActionDescriptor,
    RouteConfigDescriptor, SinglePredicateDescriptor, ValueMatchDescriptor,
    VirtualHostDescriptor,
};
pub use core::{
    MatchRequest, RouteAction, RouteEntry, RouteEntryRef, RouteError, RouteFilterConfig,
    RouteMetadata,
};
pub use filters::{
    RouteFilterConfigConstructor, RouteFilterConfigFactory, register_route_filter_config,
};
pub use matcher::{
    AcceptAllInputs, DataInput, DataInputConstructor, DataInputFactory, DataInputValidator,
    HostInput, MatchRule, MatchTree, MethodInput, PropertyInput, PropertyInputConfig,
    SinglePredicate, ValueMatcher, register_data_input,
};
pub use router::{RouteConfigBuilder, RouteConfigHandle, RouteConfiguration, VirtualHost};
