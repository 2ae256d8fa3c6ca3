// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod filters_tests {
    use std::any::Any;
    use std::collections::HashMap;
    use std::sync::Arc;

    use serde_json::json;

    use crate::config::RouteActionDescriptor;
    use crate::core::{RouteEntry, RouteError, RouteFilterConfig};
    use crate::filters::{RouteFilterConfigFactory, register_route_filter_config};

    #[derive(Debug)]
    struct EchoConfig {
        value: String,
    }

    impl RouteFilterConfig for EchoConfig {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_unregistered_filter_yields_none() {
        let result = RouteFilterConfigFactory::create_route_filter_config(
            "filters_test_never_registered",
            json!({ "key_0": "value_0" }),
        );
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_registered_factory_receives_blob() {
        register_route_filter_config("filters_test_echo", |cfg| {
            let value = cfg["key_0"].as_str().unwrap_or_default().to_string();
            Ok(Some(Arc::new(EchoConfig { value })))
        });

        let config = RouteFilterConfigFactory::create_route_filter_config(
            "filters_test_echo",
            json!({ "key_0": "value_0" }),
        )
        .unwrap()
        .expect("factory should produce a config");

        let echo = config.as_any().downcast_ref::<EchoConfig>().unwrap();
        assert_eq!(echo.value, "value_0");
    }

    #[test]
    fn test_factory_may_decline() {
        register_route_filter_config("filters_test_declining", |_cfg| Ok(None));

        let result = RouteFilterConfigFactory::create_route_filter_config(
            "filters_test_declining",
            json!({}),
        );
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_factory_rejection_fails_entry_build() {
        register_route_filter_config("filters_test_rejecting", |_cfg| {
            Err(RouteError::filter_config(
                "filters_test_rejecting",
                "blob is malformed",
            ))
        });

        let mut per_filter_config = HashMap::new();
        per_filter_config.insert("filters_test_rejecting".to_string(), json!({}));
        let descriptor = RouteActionDescriptor {
            cluster: "cluster_0".to_string(),
            metadata: HashMap::new(),
            per_filter_config,
        };

        match RouteEntry::from_descriptor(&descriptor) {
            Err(RouteError::FilterConfig { filter, .. }) => {
                assert_eq!(filter, "filters_test_rejecting");
            }
            other => panic!("Expected FilterConfig error, got {:?}", other),
        }
    }

    // All three absence cases resolve to `None` on the built entry: no
    // blob supplied, no factory registered, factory declined.
    #[test]
    fn test_absence_cases_on_route_entry() {
        register_route_filter_config("filters_test_absent_decline", |_cfg| Ok(None));

        let mut per_filter_config = HashMap::new();
        per_filter_config.insert(
            "filters_test_absent_unregistered".to_string(),
            json!({ "key_0": "value_0" }),
        );
        per_filter_config.insert("filters_test_absent_decline".to_string(), json!({}));
        let descriptor = RouteActionDescriptor {
            cluster: "cluster_0".to_string(),
            metadata: HashMap::new(),
            per_filter_config,
        };

        let entry = RouteEntry::from_descriptor(&descriptor).unwrap();
        assert!(entry.per_filter_config("filters_test_no_blob").is_none());
        assert!(
            entry
                .per_filter_config("filters_test_absent_unregistered")
                .is_none()
        );
        assert!(
            entry
                .per_filter_config("filters_test_absent_decline")
                .is_none()
        );
    }
}
