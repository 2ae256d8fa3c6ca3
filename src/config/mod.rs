// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Route configuration descriptor model.
//!
//! The descriptor is the crate's only input: a plain serde tree handed over
//! by whatever configuration-delivery machinery the embedding proxy uses (a
//! file watcher, a control-plane subscription, a test fixture). Crossbar
//! never loads descriptors itself; it deserializes whatever document the
//! collaborator supplies and hands it to
//! [`RouteConfigBuilder`](crate::router::RouteConfigBuilder).
//!
//! ### Host patterns
//!
//! | pattern      | meaning                              | example match      |
//! |--------------|--------------------------------------|--------------------|
//! | `"api.svc"`  | exact, case-sensitive                | `api.svc`          |
//! | `"api*"`     | prefix wildcard                      | `api.v2.svc`       |
//! | `"*svc"`     | suffix wildcard                      | `billing.svc`      |
//! | `"*"`        | catch-all, at most one per config    | anything           |


use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level descriptor consumed by the configuration builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfigDescriptor {
    /// Name of the configuration (for logging and error reporting).
    #[serde(default)]
    pub name: String,

    /// Virtual hosts, in declaration order.
    #[serde(default)]
    pub virtual_hosts: Vec<VirtualHostDescriptor>,

    /// Match tree consulted when no virtual host matches the request host.
    /// Mutually exclusive with a catch-all (`"*"`) virtual host.
    #[serde(default)]
    pub fallback_routes: Vec<MatchRuleDescriptor>,
}

/// A named group of host domain patterns sharing one match tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualHostDescriptor {
    /// Name of the virtual host (for logging and error reporting).
    #[serde(default)]
    pub name: String,

    /// Host domain patterns owned by this virtual host. Every pattern must
    /// be unique across the whole configuration.
    pub hosts: Vec<String>,

    /// The virtual host's match tree, in declaration order.
    #[serde(default)]
    pub routes: Vec<MatchRuleDescriptor>,
}

/// One node of a match tree: a predicate plus an optional terminal action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRuleDescriptor {
    /// The node's predicate.
    pub predicate: PredicateDescriptor,

    /// Terminal action carried by this node. The first node (in declaration
    /// order) whose predicate matches and that carries an action decides
    /// the route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<RouteActionDescriptor>,
}

/// Predicate variants of a match-tree node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateDescriptor {
    /// Every child must match; evaluation short-circuits in order.
    And(Vec<MatchRuleDescriptor>),

    /// At least one child must match; evaluation short-circuits in order.
    Or(Vec<MatchRuleDescriptor>),

    /// A single data input compared against a value matcher.
    Single(SinglePredicateDescriptor),
}

/// Leaf predicate: one data input, one value matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinglePredicateDescriptor {
    pub input: DataInputDescriptor,
    pub value: ValueMatchDescriptor,
}

/// Reference to a data input kind plus its kind-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataInputDescriptor {
    /// The data input kind: `"host"`, `"method"`, `"property"`, or any
    /// registered custom kind.
    #[serde(rename = "type")]
    pub type_: String,

    /// Kind-specific configuration blob, passed to the input's constructor
    /// verbatim.
    #[serde(default)]
    pub config: Value,
}

/// Value matcher kinds a single predicate can compare its input against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueMatchDescriptor {
    /// Case-sensitive string equality.
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    /// Compiled at build time; an invalid pattern fails the build.
    Regex(String),
}

/// Terminal routing action: destination cluster plus route-scoped data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteActionDescriptor {
    /// Name of the upstream cluster. Existence is not validated here.
    pub cluster: String,

    /// Filter-keyed metadata made available to filters at request time.
    #[serde(default)]
    pub metadata: HashMap<String, Value>,

    /// Filter-keyed configuration blobs, resolved through the per-filter
    /// config factories at build time.
    #[serde(default)]
    pub per_filter_config: HashMap<String, Value>,
}
