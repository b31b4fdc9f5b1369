// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Global property inheritance.
//!
//! Every top-level key other than `applications` is a global property. For
//! each application and each global `key`:
//! - Absent locally: the global value is deep-copied in, after the
//!   application's own keys.
//! - Both sides are mappings: the merge recurses into the sub-keys.
//! - Anything else: the local value wins.
//!
//! Lists are never merged. Recursion stops at `max_inheritance_depth`
//! nested levels, keeping the local mapping as is below that.

use log::{debug, warn};
use manifest_parser::{APPLICATIONS_KEY, Configuration, LookupError, Manifest, NodeId, NodeRef};

/// Applies global properties to every application of a manifest.
#[derive(Debug, Clone)]
pub struct Transformator {
    max_depth: usize,
}

impl Default for Transformator {
    fn default() -> Self {
        Self::new(&Configuration::default())
    }
}

impl Transformator {
    #[must_use]
    pub const fn new(config: &Configuration) -> Self {
        Self {
            max_depth: config.max_inheritance_depth,
        }
    }

    /// Merge the global properties into each application.
    ///
    /// Global properties stay in place at the top level. Fails if the
    /// manifest no longer has an `applications` sequence of mappings.
    pub fn apply(&self, mut manifest: Manifest) -> Result<Manifest, LookupError> {
        let globals = owned_entries(manifest.root());
        let applications: Vec<NodeId> = manifest
            .applications()?
            .into_iter()
            .map(NodeRef::id)
            .collect();

        for &application in &applications {
            for (key, global) in &globals {
                self.inherit(&mut manifest, application, key, *global, 0)?;
            }
        }

        debug!(
            "Applied {} global properties to {} applications",
            globals.len(),
            applications.len()
        );
        Ok(manifest)
    }

    fn inherit(
        &self,
        manifest: &mut Manifest,
        target: NodeId,
        key: &str,
        global: NodeId,
        depth: usize,
    ) -> Result<(), LookupError> {
        let Some(local) = manifest.node(target).and_then(|node| node.get_opt(key)) else {
            manifest.graft(target, key, global)?;
            return Ok(());
        };

        let global_node = manifest.node(global);
        if !local.is_mapping() || !global_node.is_some_and(NodeRef::is_mapping) {
            return Ok(());
        }
        if depth >= self.max_depth {
            warn!(
                "Inheritance depth limit {} reached at '{}', keeping the local value",
                self.max_depth,
                local.path()
            );
            return Ok(());
        }

        let local = local.id();
        let sub_entries = global_node.map(owned_entries).unwrap_or_default();
        for (sub_key, sub_global) in sub_entries {
            self.inherit(manifest, local, &sub_key, sub_global, depth + 1)?;
        }
        Ok(())
    }
}

/// Mapping entries detached from the manifest borrow, skipping `applications`
/// at the root.
fn owned_entries(node: NodeRef<'_>) -> Vec<(String, NodeId)> {
    let is_root = node.parent().is_none();
    node.entries()
        .unwrap_or_default()
        .into_iter()
        .filter(|(key, _)| !(is_root && *key == APPLICATIONS_KEY))
        .map(|(key, child)| (key.to_owned(), child.id()))
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    reason = "Tests benefit from direct indexing for readability"
)]
mod tests {
    use manifest_parser::{LookupErrorKind, parse};
    use serde_json::json;

    use super::*;

    fn inherit(input: &str) -> serde_json::Value {
        let manifest = parse(input).unwrap();
        Transformator::default().apply(manifest).unwrap().to_json()
    }

    #[test]
    fn test_global_scalar_is_copied() {
        let result = inherit("memory: 256M\napplications:\n- name: a\n- name: b\n  memory: 1G\n");
        assert_eq!(
            result,
            json!({
                "memory": "256M",
                "applications": [
                    {"name": "a", "memory": "256M"},
                    {"name": "b", "memory": "1G"},
                ],
            })
        );
    }

    #[test]
    fn test_nested_mapping_merges_sub_keys() {
        let result = inherit(
            "env:\n  A: global\n  B: global\napplications:\n- name: a\n  env:\n    B: local\n    C: local\n",
        );
        assert_eq!(
            result["applications"][0]["env"],
            json!({"B": "local", "C": "local", "A": "global"})
        );
    }

    #[test]
    fn test_scalar_and_mapping_conflicts_keep_local() {
        let result = inherit(
            "env:\n  A: global\nhost: global-host\napplications:\n- name: a\n  env: none\n  host:\n    nested: local\n",
        );
        assert_eq!(result["applications"][0]["env"], json!("none"));
        assert_eq!(result["applications"][0]["host"], json!({"nested": "local"}));
    }

    #[test]
    fn test_lists_are_not_merged() {
        let result = inherit(
            "services:\n- global-db\napplications:\n- name: a\n  services:\n  - local-db\n- name: b\n",
        );
        assert_eq!(result["applications"][0]["services"], json!(["local-db"]));
        assert_eq!(result["applications"][1]["services"], json!(["global-db"]));
    }

    #[test]
    fn test_copies_are_independent() {
        let manifest = parse("env:\n  A: global\napplications:\n- name: a\n- name: b\n").unwrap();
        let mut manifest = Transformator::default().apply(manifest).unwrap();

        let first_env = manifest.applications().unwrap()[0].get("env").unwrap().id();
        manifest.set_scalar(first_env, "A", "changed").unwrap();

        let json = manifest.to_json();
        assert_eq!(json["applications"][0]["env"]["A"], json!("changed"));
        assert_eq!(json["applications"][1]["env"]["A"], json!("global"));
        assert_eq!(json["env"]["A"], json!("global"));
    }

    #[test]
    fn test_deep_merge_and_depth_limit() {
        let input = "\
limits:
  memory:
    soft: 1G
    hard: 2G
applications:
- name: a
  limits:
    memory:
      soft: 512M
";
        let deep = inherit(input);
        assert_eq!(
            deep["applications"][0]["limits"],
            json!({"memory": {"soft": "512M", "hard": "2G"}})
        );

        let config = Configuration {
            max_inheritance_depth: 1,
            ..Configuration::default()
        };
        let shallow = Transformator::new(&config)
            .apply(parse(input).unwrap())
            .unwrap()
            .to_json();
        assert_eq!(
            shallow["applications"][0]["limits"],
            json!({"memory": {"soft": "512M"}})
        );
    }

    #[test]
    fn test_without_globals_is_unchanged() {
        let input = "applications:\n- name: a\n  host: h\n";
        let manifest = parse(input).unwrap();
        let before = manifest.to_string();
        assert_eq!(Transformator::default().apply(manifest).unwrap().to_string(), before);
    }

    #[test]
    fn test_applications_replaced_by_scalar() {
        let mut manifest = parse("memory: 1G\napplications:\n- name: a\n").unwrap();
        let root = manifest.root().id();
        manifest.set_scalar(root, "applications", "none").unwrap();

        let err = Transformator::default().apply(manifest).unwrap_err();
        assert_eq!(err.kind, LookupErrorKind::NotASequence);
        assert_eq!(err.path, "applications");
    }
}
