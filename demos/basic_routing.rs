// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimal routing walkthrough: build a configuration from a YAML
//! descriptor and resolve a few requests against it.
//!
//! Run with: `cargo run --example basic_routing`

use std::collections::HashMap;

use crossbar::{MatchRequest, RouteConfigDescriptor, RouteConfiguration};

struct DemoRequest {
    host: String,
    method: String,
    properties: HashMap<String, String>,
}

impl MatchRequest for DemoRequest {
    fn host(&self) -> &str {
        &self.host
    }

    fn method(&self) -> &str {
        &self.method
    }

    fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

static DESCRIPTOR_YAML: &str = r#"
name: demo_routes
virtual_hosts:
  - name: users
    hosts: ["users.svc", "users*"]
    routes:
      - predicate:
          and:
            - predicate:
                single:
                  input: { type: method }
                  value: { exact: GetUser }
            - predicate:
                single:
                  input: { type: property, config: { name: region } }
                  value: { exact: eu }
        action:
          cluster: users_eu
      - predicate:
          single:
            input: { type: method }
            value: { prefix: Get }
        action:
          cluster: users_global
  - name: fallback
    hosts: ["*"]
    routes:
      - predicate:
          single:
            input: { type: method }
            value: { suffix: Health }
        action:
          cluster: health
"#;

fn main() {
    env_logger::init();

    let descriptor: RouteConfigDescriptor =
        serde_yaml::from_str(DESCRIPTOR_YAML).expect("descriptor should parse");
    let config = RouteConfiguration::from_descriptor(&descriptor).expect("build should succeed");

    let requests = [
        ("users.svc", "GetUser", Some(("region", "eu"))),
        ("users-shard-3.svc", "GetUser", None),
        ("billing.svc", "CheckHealth", None),
        ("users.svc", "DeleteUser", None),
    ];

    for (host, method, property) in requests {
        let mut properties = HashMap::new();
        if let Some((key, value)) = property {
            properties.insert(key.to_string(), value.to_string());
        }
        let request = DemoRequest {
            host: host.to_string(),
            method: method.to_string(),
            properties,
        };

        match config.route_entry(&request) {
            Some(entry) => println!("{host} {method} -> {}", entry.cluster_name()),
            None => println!("{host} {method} -> no route"),
        }
    }
}
