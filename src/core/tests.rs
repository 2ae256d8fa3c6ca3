// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod core_tests {
    use std::any::Any;
    use std::collections::HashMap;
    use std::sync::Arc;

    use serde_json::json;

    use crate::config::RouteActionDescriptor;
    use crate::core::{RouteAction, RouteEntry, RouteError, RouteFilterConfig, RouteMetadata};
    use crate::filters::register_route_filter_config;

    #[derive(Debug)]
    struct MarkerConfig {
        marker: String,
    }

    impl RouteFilterConfig for MarkerConfig {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn action_descriptor(cluster: &str) -> RouteActionDescriptor {
        RouteActionDescriptor {
            cluster: cluster.to_string(),
            metadata: HashMap::new(),
            per_filter_config: HashMap::new(),
        }
    }

    #[test]
    fn test_duplicate_host_error_names_domain_and_config() {
        let error = RouteError::DuplicateHost {
            config: "test_matcher_tree".to_string(),
            domain: "service_0".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "duplicate domain 'service_0' in route configuration 'test_matcher_tree'"
        );
    }

    #[test]
    fn test_multiple_wildcard_error_names_config() {
        let error = RouteError::MultipleWildcard {
            config: "test_matcher_tree".to_string(),
        };
        assert!(error.to_string().contains("single wildcard domain"));
        assert!(error.to_string().contains("test_matcher_tree"));
    }

    #[test]
    fn test_disallowed_input_error_names_input() {
        let error = RouteError::DisallowedInput {
            input: "property".to_string(),
            reason: "properties are opaque here".to_string(),
        };
        assert!(error.to_string().contains("'property'"));
        assert!(error.to_string().contains("properties are opaque here"));
    }

    #[test]
    fn test_filter_config_error_constructor() {
        let error = RouteError::filter_config("rate_limit", "missing field");
        match &error {
            RouteError::FilterConfig { filter, message } => {
                assert_eq!(filter, "rate_limit");
                assert_eq!(message, "missing field");
            }
            _ => panic!("Expected FilterConfig variant"),
        }
        assert_eq!(
            error.to_string(),
            "per-filter config error: rate_limit: missing field"
        );
    }

    #[test]
    fn test_metadata_lookup() {
        let mut filter_metadata = HashMap::new();
        filter_metadata.insert("mock_filter".to_string(), json!({ "key_0": "value_0" }));
        let metadata = RouteMetadata::new(filter_metadata);

        assert!(!metadata.is_empty());
        assert_eq!(
            metadata.filter("mock_filter"),
            Some(&json!({ "key_0": "value_0" }))
        );
        assert_eq!(
            metadata.value("mock_filter", "key_0"),
            Some(&json!("value_0"))
        );

        // Absent filter and absent key are both plain `None`.
        assert_eq!(metadata.filter("other_filter"), None);
        assert_eq!(metadata.value("mock_filter", "key_1"), None);
    }

    #[test]
    fn test_metadata_default_is_empty() {
        let metadata = RouteMetadata::default();
        assert!(metadata.is_empty());
        assert_eq!(metadata.filter("anything"), None);
    }

    #[test]
    fn test_route_entry_cluster_name() {
        let entry = RouteEntry::from_descriptor(&action_descriptor("cluster_0")).unwrap();
        assert_eq!(entry.cluster_name(), "cluster_0");
        assert!(entry.metadata().is_empty());
    }

    #[test]
    fn test_route_entry_metadata() {
        let mut descriptor = action_descriptor("cluster_0");
        descriptor
            .metadata
            .insert("mock_filter".to_string(), json!({ "key_0": "value_0" }));

        let entry = RouteEntry::from_descriptor(&descriptor).unwrap();
        assert_eq!(
            entry.metadata().value("mock_filter", "key_0"),
            Some(&json!("value_0"))
        );
    }

    #[test]
    fn test_route_entry_typed_per_filter_config() {
        register_route_filter_config("core_marker_filter", |cfg| {
            let marker = cfg["marker"].as_str().unwrap_or_default().to_string();
            Ok(Some(Arc::new(MarkerConfig { marker })))
        });

        let mut descriptor = action_descriptor("cluster_0");
        descriptor
            .per_filter_config
            .insert("core_marker_filter".to_string(), json!({ "marker": "m_0" }));

        let entry = RouteEntry::from_descriptor(&descriptor).unwrap();

        let typed = entry
            .typed_per_filter_config::<MarkerConfig>("core_marker_filter")
            .expect("typed config should resolve");
        assert_eq!(typed.marker, "m_0");

        // Repeated lookups hand back the same object.
        let first = entry.per_filter_config("core_marker_filter").unwrap();
        let second = entry.per_filter_config("core_marker_filter").unwrap();
        assert!(std::ptr::eq(
            first as *const _ as *const (),
            second as *const _ as *const ()
        ));
    }

    #[test]
    fn test_route_action_returns_identical_entry() {
        let entry = Arc::new(RouteEntry::from_descriptor(&action_descriptor("cluster_0")).unwrap());
        let action = RouteAction::new(Arc::clone(&entry));

        assert!(Arc::ptr_eq(&action.route(), &action.route()));
        assert!(Arc::ptr_eq(&action.route(), &entry));
    }
}
