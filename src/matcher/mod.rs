// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Match trees – boolean predicates over pluggable data inputs.
//!
//! A [`MatchTree`] owns an ordered list of [`MatchRule`] nodes. Evaluation
//! is depth-first and short-circuiting; the first node (in declaration
//! order) whose predicate matches and that carries an action decides the
//! route. There is no priority field, only declaration order.
//!
//! ### Built-in data inputs
//! | type       | configuration key | yields                        |
//! |------------|-------------------|-------------------------------|
//! | `host`     | –                 | the request host/service name |
//! | `method`   | –                 | the request method            |
//! | `property` | `name`            | an arbitrary property by key  |
//!
//! Custom kinds register through [`register_data_input`] and resolve by
//! name, exactly like the built-ins.

mod inputs;


pub use inputs::*;

use std::fmt::Debug;
use std::sync::Arc;

use regex::Regex;

use crate::config::{MatchRuleDescriptor, PredicateDescriptor, ValueMatchDescriptor};
use crate::core::{MatchRequest, RouteAction, RouteEntry, RouteEntryRef, RouteError};

/// A named extractor from a request to an optional string value.
///
/// `None` means "unavailable" - a valid, non-error result that fails the
/// enclosing predicate. Implementations must be pure: the same request
/// always yields the same value.
pub trait DataInput: Debug + Send + Sync {
    /// The kind this input resolves under.
    fn input_type(&self) -> &str;

    /// Extract the value from the request.
    fn fetch<'a>(&self, request: &'a dyn MatchRequest) -> Option<&'a str>;
}

/// Build-time policy hook deciding whether a data input kind is usable in
/// this routing context.
///
/// Runs once per single-predicate node during the build; a rejection fails
/// the whole build with a message naming the offending input. This is
/// deliberately separate from "does this input exist" - the factory
/// answers that.
pub trait DataInputValidator: Debug + Send + Sync {
    fn validate(&self, input: &dyn DataInput) -> Result<(), RouteError>;
}

/// Default visitor for the routing context: accepts every input the
/// factory can resolve.
#[derive(Debug, Default)]
pub struct AcceptAllInputs;

impl DataInputValidator for AcceptAllInputs {
    fn validate(&self, _input: &dyn DataInput) -> Result<(), RouteError> {
        Ok(())
    }
}

/// Compiled value matcher a single predicate compares its input against.
#[derive(Debug, Clone)]
pub enum ValueMatcher {
    /// Case-sensitive string equality.
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    Regex(Regex),
}

impl ValueMatcher {
    /// Compile a matcher from its descriptor.
    pub fn from_descriptor(descriptor: &ValueMatchDescriptor) -> Result<Self, RouteError> {
        match descriptor {
            ValueMatchDescriptor::Exact(value) => Ok(ValueMatcher::Exact(value.clone())),
            ValueMatchDescriptor::Prefix(value) => Ok(ValueMatcher::Prefix(value.clone())),
            ValueMatchDescriptor::Suffix(value) => Ok(ValueMatcher::Suffix(value.clone())),
            ValueMatchDescriptor::Contains(value) => Ok(ValueMatcher::Contains(value.clone())),
            ValueMatchDescriptor::Regex(pattern) => {
                let regex = Regex::new(pattern).map_err(|e| {
                    RouteError::InvalidMatcher(format!("invalid regex pattern '{pattern}': {e}"))
                })?;
                Ok(ValueMatcher::Regex(regex))
            }
        }
    }

    /// Whether `value` satisfies this matcher.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            ValueMatcher::Exact(expected) => value == expected,
            ValueMatcher::Prefix(prefix) => value.starts_with(prefix),
            ValueMatcher::Suffix(suffix) => value.ends_with(suffix),
            ValueMatcher::Contains(needle) => value.contains(needle),
            ValueMatcher::Regex(regex) => regex.is_match(value),
        }
    }
}

/// Leaf predicate: one data input compared against one value matcher.
#[derive(Debug)]
pub struct SinglePredicate {
    input: Arc<dyn DataInput>,
    value: ValueMatcher,
}

impl SinglePredicate {
    /// An unavailable input fails the predicate; it never errors.
    fn matches(&self, request: &dyn MatchRequest) -> bool {
        match self.input.fetch(request) {
            Some(value) => self.value.matches(value),
            None => false,
        }
    }
}

/// One node of a match tree. Any node may carry a terminal action.
#[derive(Debug)]
pub enum MatchRule {
    /// Every child must match; evaluation short-circuits in order.
    And {
        rules: Vec<MatchRule>,
        action: Option<RouteAction>,
    },
    /// At least one child must match; evaluation short-circuits in order.
    Or {
        rules: Vec<MatchRule>,
        action: Option<RouteAction>,
    },
    /// Leaf predicate.
    Single {
        predicate: SinglePredicate,
        action: Option<RouteAction>,
    },
}

impl MatchRule {
    /// Whether this node's predicate holds for the request.
    fn matches(&self, request: &dyn MatchRequest) -> bool {
        match self {
            MatchRule::And { rules, .. } => rules.iter().all(|rule| rule.matches(request)),
            MatchRule::Or { rules, .. } => rules.iter().any(|rule| rule.matches(request)),
            MatchRule::Single { predicate, .. } => predicate.matches(request),
        }
    }

    fn action(&self) -> Option<&RouteAction> {
        match self {
            MatchRule::And { action, .. }
            | MatchRule::Or { action, .. }
            | MatchRule::Single { action, .. } => action.as_ref(),
        }
    }

    /// First action (in declaration order) carried by a matching node in
    /// this subtree, the node's own action taking precedence over its
    /// children's.
    fn select(&self, request: &dyn MatchRequest) -> Option<&RouteAction> {
        if !self.matches(request) {
            return None;
        }
        if let Some(action) = self.action() {
            return Some(action);
        }
        match self {
            MatchRule::And { rules, .. } | MatchRule::Or { rules, .. } => {
                rules.iter().find_map(|rule| rule.select(request))
            }
            MatchRule::Single { .. } => None,
        }
    }
}

/// An ordered boolean match tree terminating in route actions.
#[derive(Debug, Default)]
pub struct MatchTree {
    rules: Vec<MatchRule>,
}

impl MatchTree {
    /// Build a tree from descriptors, resolving data inputs through the
    /// factory and running the validation visitor on every single
    /// predicate. Any resolution or validation failure is fatal.
    pub(crate) fn build(
        descriptors: &[MatchRuleDescriptor],
        validator: &dyn DataInputValidator,
    ) -> Result<Self, RouteError> {
        let rules = descriptors
            .iter()
            .map(|descriptor| Self::build_rule(descriptor, validator))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    fn build_rule(
        descriptor: &MatchRuleDescriptor,
        validator: &dyn DataInputValidator,
    ) -> Result<MatchRule, RouteError> {
        let action = descriptor
            .action
            .as_ref()
            .map(RouteEntry::from_descriptor)
            .transpose()?
            .map(|entry| RouteAction::new(Arc::new(entry)));

        match &descriptor.predicate {
            PredicateDescriptor::And(children) => {
                let rules = children
                    .iter()
                    .map(|child| Self::build_rule(child, validator))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(MatchRule::And { rules, action })
            }
            PredicateDescriptor::Or(children) => {
                let rules = children
                    .iter()
                    .map(|child| Self::build_rule(child, validator))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(MatchRule::Or { rules, action })
            }
            PredicateDescriptor::Single(single) => {
                let input = DataInputFactory::create_data_input(
                    &single.input.type_,
                    single.input.config.clone(),
                )?;
                validator.validate(input.as_ref())?;
                let value = ValueMatcher::from_descriptor(&single.value)?;
                Ok(MatchRule::Single {
                    predicate: SinglePredicate { input, value },
                    action,
                })
            }
        }
    }

    /// Depth-first, short-circuiting evaluation against a request.
    ///
    /// Never fails: an unmatched request yields `None`.
    pub fn evaluate(&self, request: &dyn MatchRequest) -> Option<RouteEntryRef> {
        self.rules
            .iter()
            .find_map(|rule| rule.select(request))
            .map(RouteAction::route)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
