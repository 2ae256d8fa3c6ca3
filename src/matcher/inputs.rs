// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Built-in data inputs and the input factory.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::DataInput;
use crate::core::{MatchRequest, RouteError};

/// Constructor signature every custom data input must implement.
pub type DataInputConstructor = fn(serde_json::Value) -> Result<Arc<dyn DataInput>, RouteError>;

/// Global registry – `register_data_input()` writes to it,
/// `DataInputFactory::create_data_input()` reads from it.
static DATA_INPUT_REGISTRY: Lazy<RwLock<HashMap<String, DataInputConstructor>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a data input kind under a unique name.
/// Call this **before** building a configuration that references it:
///
/// ```rust
/// use std::sync::Arc;
/// use crossbar::{register_data_input, DataInput, MatchRequest};
///
/// #[derive(Debug)]
/// struct TransportInput;
///
/// impl DataInput for TransportInput {
///     fn input_type(&self) -> &str {
///         "transport"
///     }
///
///     fn fetch<'a>(&self, request: &'a dyn MatchRequest) -> Option<&'a str> {
///         request.property("transport")
///     }
/// }
///
/// register_data_input("transport", |_cfg| Ok(Arc::new(TransportInput)));
/// ```
pub fn register_data_input(name: &str, ctor: DataInputConstructor) {
    DATA_INPUT_REGISTRY
        .write()
        .expect("DATA_INPUT_REGISTRY poisoned")
        .insert(name.to_string(), ctor);
}

/// Internal helper – fetch a constructor if somebody registered one.
fn get_registered_input(name: &str) -> Option<DataInputConstructor> {
    DATA_INPUT_REGISTRY
        .read()
        .expect("DATA_INPUT_REGISTRY poisoned")
        .get(name)
        .copied()
}

/// The request's host or service name.
#[derive(Debug, Default)]
pub struct HostInput;

impl DataInput for HostInput {
    fn input_type(&self) -> &str {
        "host"
    }

    fn fetch<'a>(&self, request: &'a dyn MatchRequest) -> Option<&'a str> {
        Some(request.host())
    }
}

/// The request's method or operation name.
#[derive(Debug, Default)]
pub struct MethodInput;

impl DataInput for MethodInput {
    fn input_type(&self) -> &str {
        "method"
    }

    fn fetch<'a>(&self, request: &'a dyn MatchRequest) -> Option<&'a str> {
        Some(request.method())
    }
}

/// Configuration for a property input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyInputConfig {
    /// The property key to extract.
    pub name: String,
}

/// An arbitrary request property, extracted by key.
#[derive(Debug)]
pub struct PropertyInput {
    config: PropertyInputConfig,
}

impl PropertyInput {
    /// Create a new property input with the given configuration.
    pub fn new(config: PropertyInputConfig) -> Self {
        Self { config }
    }
}

impl DataInput for PropertyInput {
    fn input_type(&self) -> &str {
        "property"
    }

    fn fetch<'a>(&self, request: &'a dyn MatchRequest) -> Option<&'a str> {
        request.property(&self.config.name)
    }
}

/// Factory for creating data inputs based on configuration.
#[derive(Debug)]
pub struct DataInputFactory;

impl DataInputFactory {
    /// Create a data input for the given kind.
    ///
    /// An unknown kind is a fatal build-time error; it can never surface at
    /// request time.
    pub fn create_data_input(
        input_type: &str,
        config: serde_json::Value,
    ) -> Result<Arc<dyn DataInput>, RouteError> {
        log::debug!("Creating data input of type '{}'", input_type);

        match input_type {
            "host" => Ok(Arc::new(HostInput)),
            "method" => Ok(Arc::new(MethodInput)),
            "property" => {
                let property_config: PropertyInputConfig = serde_json::from_value(config)
                    .map_err(|e| {
                        let err = RouteError::InvalidMatcher(format!(
                            "invalid property input config: {e}"
                        ));
                        log::error!("{}", err);
                        err
                    })?;
                Ok(Arc::new(PropertyInput::new(property_config)))
            }
            _ => match get_registered_input(input_type) {
                Some(ctor) => ctor(config),
                None => {
                    let err = RouteError::UnknownInput(input_type.to_string());
                    log::error!("{}", err);
                    Err(err)
                }
            },
        }
    }
}
