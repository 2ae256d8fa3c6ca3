// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Virtual-host routing – domain resolution & the immutable configuration.
//!
//! A [`RouteConfiguration`] resolves a request in two stages: the domain
//! table maps the request host to a virtual host (exact domain first, then
//! the longest `"x*"` prefix pattern, then the longest `"*x"` suffix
//! pattern, then the single catch-all), and the selected virtual host's
//! match tree resolves the request to a route entry. Both stages are pure
//! reads; every mutation and every failure belongs to
//! [`RouteConfigBuilder`].


use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::{RouteConfigDescriptor, VirtualHostDescriptor};
use crate::core::{MatchRequest, RouteEntryRef, RouteError};
use crate::matcher::{AcceptAllInputs, DataInputValidator, MatchTree};

/// A named group of host domain patterns sharing one match tree.
#[derive(Debug)]
pub struct VirtualHost {
    name: String,
    tree: MatchTree,
}

impl VirtualHost {
    fn build(
        descriptor: &VirtualHostDescriptor,
        validator: &dyn DataInputValidator,
    ) -> Result<Self, RouteError> {
        Ok(Self {
            name: descriptor.name.clone(),
            tree: MatchTree::build(&descriptor.routes, validator)?,
        })
    }

    /// Name of the virtual host (for logging and reference).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate this virtual host's match tree against the request.
    pub fn evaluate(&self, request: &dyn MatchRequest) -> Option<RouteEntryRef> {
        self.tree.evaluate(request)
    }
}

/// Domain-pattern index over the configuration's virtual hosts.
///
/// Wildcard stems are sorted longest-first at build time so resolution is
/// a first-hit scan. Domains are globally unique, so ties within a
/// specificity class cannot occur.
#[derive(Debug, Default)]
struct VirtualHostTable {
    exact: HashMap<String, Arc<VirtualHost>>,
    /// `"stem*"` patterns as (stem, vhost), longest stem first.
    prefix: Vec<(String, Arc<VirtualHost>)>,
    /// `"*stem"` patterns as (stem, vhost), longest stem first.
    suffix: Vec<(String, Arc<VirtualHost>)>,
    catch_all: Option<Arc<VirtualHost>>,
}

impl VirtualHostTable {
    fn find(&self, host: &str) -> Option<&Arc<VirtualHost>> {
        if let Some(vhost) = self.exact.get(host) {
            return Some(vhost);
        }
        if let Some((_, vhost)) = self
            .prefix
            .iter()
            .find(|(stem, _)| host.starts_with(stem.as_str()))
        {
            return Some(vhost);
        }
        if let Some((_, vhost)) = self
            .suffix
            .iter()
            .find(|(stem, _)| host.ends_with(stem.as_str()))
        {
            return Some(vhost);
        }
        self.catch_all.as_ref()
    }
}

/// Immutable routing decision structure.
///
/// Built once by [`RouteConfigBuilder`], then queried lock-free from any
/// number of request-handling threads. Reconfiguration builds a new
/// instance; nothing here ever mutates.
#[derive(Debug)]
pub struct RouteConfiguration {
    name: String,
    virtual_hosts: Vec<Arc<VirtualHost>>,
    table: VirtualHostTable,
    fallback: MatchTree,
}

impl RouteConfiguration {
    /// Build a configuration with the default validation visitor.
    pub fn from_descriptor(descriptor: &RouteConfigDescriptor) -> Result<Self, RouteError> {
        RouteConfigBuilder::new().build(descriptor)
    }

    /// Name of the configuration (for logging and reference).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configuration's virtual hosts, in declaration order.
    pub fn virtual_hosts(&self) -> &[Arc<VirtualHost>] {
        &self.virtual_hosts
    }

    /// Resolve the virtual host for a request host string.
    ///
    /// Precedence: exact domain, else longest prefix pattern, else longest
    /// suffix pattern, else the catch-all if one was configured.
    pub fn find_virtual_host(&self, host: &str) -> Option<&VirtualHost> {
        self.table.find(host).map(Arc::as_ref)
    }

    /// Resolve a request to its route entry.
    ///
    /// Pure and read-only; never fails. A request that matches no virtual
    /// host and no fallback rule yields `None`. A virtual host that
    /// matches the host but whose tree yields no action also resolves to
    /// `None` - there is no fall-through to the catch-all.
    pub fn route_entry(&self, request: &dyn MatchRequest) -> Option<RouteEntryRef> {
        log::trace!(
            "Routing host '{}' method '{}' against configuration '{}'",
            request.host(),
            request.method(),
            self.name
        );

        match self.find_virtual_host(request.host()) {
            Some(vhost) => {
                log::trace!(
                    "Virtual host '{}' selected for host '{}'",
                    vhost.name(),
                    request.host()
                );
                vhost.evaluate(request)
            }
            None => {
                log::trace!("No virtual host matched host '{}'", request.host());
                self.fallback.evaluate(request)
            }
        }
    }
}

/// Fail-fast builder for [`RouteConfiguration`].
///
/// Building either returns a complete, frozen configuration or an error
/// with no partial structure retained - the caller keeps serving its
/// previous configuration. The build runs synchronously and must not run
/// on a request-serving thread.
#[derive(Debug)]
pub struct RouteConfigBuilder {
    validator: Arc<dyn DataInputValidator>,
}

impl Default for RouteConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteConfigBuilder {
    /// Create a builder with the default validation visitor.
    pub fn new() -> Self {
        Self {
            validator: Arc::new(AcceptAllInputs),
        }
    }

    /// Replace the validation visitor run on every single-predicate node.
    pub fn with_validator(mut self, validator: Arc<dyn DataInputValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Build an immutable configuration from its descriptor.
    pub fn build(&self, descriptor: &RouteConfigDescriptor) -> Result<RouteConfiguration, RouteError> {
        log::debug!(
            "Building route configuration '{}' with {} virtual hosts",
            descriptor.name,
            descriptor.virtual_hosts.len()
        );

        match self.build_inner(descriptor) {
            Ok(config) => {
                log::debug!("Built route configuration '{}'", config.name());
                Ok(config)
            }
            Err(error) => {
                log::warn!(
                    "Failed to build route configuration '{}': {}",
                    descriptor.name,
                    error
                );
                Err(error)
            }
        }
    }

    fn build_inner(
        &self,
        descriptor: &RouteConfigDescriptor,
    ) -> Result<RouteConfiguration, RouteError> {
        enum Pattern {
            Exact(String),
            Prefix(String),
            Suffix(String),
        }

        // Shape invariants come first: domain uniqueness and wildcard
        // rules are checked before any extension is instantiated.
        let mut patterns: Vec<(Pattern, usize)> = Vec::new();
        let mut catch_all_index: Option<usize> = None;
        let mut seen_domains: HashSet<&str> = HashSet::new();

        for (index, vhost) in descriptor.virtual_hosts.iter().enumerate() {
            for domain in &vhost.hosts {
                if domain.is_empty() {
                    return Err(RouteError::EmptyHost {
                        config: descriptor.name.clone(),
                    });
                }
                if domain == "*" {
                    if catch_all_index.is_some() {
                        return Err(RouteError::MultipleWildcard {
                            config: descriptor.name.clone(),
                        });
                    }
                    catch_all_index = Some(index);
                    continue;
                }
                if !seen_domains.insert(domain) {
                    return Err(RouteError::DuplicateHost {
                        config: descriptor.name.clone(),
                        domain: domain.clone(),
                    });
                }
                let pattern = if let Some(stem) = domain.strip_suffix('*') {
                    Pattern::Prefix(stem.to_string())
                } else if let Some(stem) = domain.strip_prefix('*') {
                    Pattern::Suffix(stem.to_string())
                } else {
                    Pattern::Exact(domain.clone())
                };
                patterns.push((pattern, index));
            }
        }

        if catch_all_index.is_some() && !descriptor.fallback_routes.is_empty() {
            return Err(RouteError::ConflictingCatchAll {
                config: descriptor.name.clone(),
            });
        }

        // Instantiate the match trees: data inputs, validation visitor and
        // per-filter configs all resolve here, never at request time.
        let virtual_hosts = descriptor
            .virtual_hosts
            .iter()
            .map(|vhost| VirtualHost::build(vhost, self.validator.as_ref()).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        let fallback = MatchTree::build(&descriptor.fallback_routes, self.validator.as_ref())?;

        // Freeze the domain index, longest stems first within each class.
        let mut table = VirtualHostTable::default();
        for (pattern, index) in patterns {
            let vhost = Arc::clone(&virtual_hosts[index]);
            match pattern {
                Pattern::Exact(domain) => {
                    table.exact.insert(domain, vhost);
                }
                Pattern::Prefix(stem) => table.prefix.push((stem, vhost)),
                Pattern::Suffix(stem) => table.suffix.push((stem, vhost)),
            }
        }
        table.catch_all = catch_all_index.map(|index| Arc::clone(&virtual_hosts[index]));
        table.prefix.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        table.suffix.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Ok(RouteConfiguration {
            name: descriptor.name.clone(),
            virtual_hosts,
            table,
            fallback,
        })
    }
}

/// Atomically swappable handle to the active [`RouteConfiguration`].
///
/// Readers load a complete snapshot without locking; a store installs a
/// freshly built configuration in one atomic step. Outstanding snapshots
/// stay valid until their last holder drops them, so in-flight requests
/// are never torn between two configurations.
#[derive(Debug)]
pub struct RouteConfigHandle {
    active: ArcSwap<RouteConfiguration>,
}

impl RouteConfigHandle {
    pub fn new(initial: RouteConfiguration) -> Self {
        Self {
            active: ArcSwap::from_pointee(initial),
        }
    }

    /// The current snapshot. Each caller holds its own reference.
    pub fn current(&self) -> Arc<RouteConfiguration> {
        self.active.load_full()
    }

    /// Install a newly built configuration, returning the previous one.
    pub fn store(&self, next: RouteConfiguration) -> Arc<RouteConfiguration> {
        let next = Arc::new(next);
        log::debug!("Activating route configuration '{}'", next.name());
        self.active.swap(next)
    }
}
