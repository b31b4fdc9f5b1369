// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! End-to-end tests over the manifests in `tests/fixtures`.

use std::fs;
use std::path::{Path, PathBuf};

use manifest_parser::{Configuration, Manifest, NodeRef, parse};
use manifest_transform::{PipelineError, SymbolResolver, Transformator, prepare};

const DOMAIN: &str = "api.sauron.mordor.com";

fn fixture(name: &str) -> String {
    let path: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("{}: {err}", path.display()))
}

fn inherited(name: &str) -> Manifest {
    let manifest = parse(&fixture(name)).unwrap();
    Transformator::default().apply(manifest).unwrap()
}

fn value(node: NodeRef<'_>, path: &[&str]) -> String {
    path.iter()
        .try_fold(node, |node, key| node.get(*key))
        .and_then(NodeRef::value)
        .map(str::to_owned)
        .unwrap_or_else(|err| panic!("{err}"))
}

#[test]
#[allow(clippy::tests_outside_test_module, reason = "Integration test")]
fn global_properties_reach_every_application() {
    let manifest = inherited("inheritance/01.yml");
    let applications = manifest.applications().unwrap();
    assert_eq!(applications.len(), 3);
    for application in applications {
        assert_eq!(value(application, &["propertyA"]), "valueA");
        assert_eq!(value(application, &["propertyB"]), "valueB");
    }
}

#[test]
#[allow(clippy::tests_outside_test_module, reason = "Integration test")]
fn local_properties_override_globals() {
    let manifest = inherited("inheritance/02.yml");
    let apps = manifest.applications().unwrap();

    let expected = [
        [("A", "nativeA"), ("B", "nativeB"), ("C", "overriddenC")],
        [("A", "overriddenA"), ("B", "nativeB"), ("C", "nativeC")],
        [("A", "nativeA"), ("B", "overriddenB"), ("C", "nativeC")],
        [("A", "overriddenA"), ("B", "overriddenB"), ("C", "overriddenC")],
    ];
    for (application, properties) in apps.iter().zip(expected) {
        for (key, expected_value) in properties {
            assert_eq!(value(*application, &[key]), expected_value, "{}", application.path());
        }
    }

    for application in apps.iter().take(3) {
        assert_eq!(value(*application, &["D", "overriddenD"]), "valueD");
        assert_eq!(value(*application, &["D", "nativeD"]), "valueD");
    }
    let last = apps.last().copied().unwrap();
    assert_eq!(value(last, &["D", "nativeD"]), "valueD");
    assert!(!last.get("D").unwrap().has("overriddenD"));
}

#[test]
#[allow(clippy::tests_outside_test_module, reason = "Integration test")]
fn inherited_manifest_is_a_serialization_fixed_point() {
    let exported = inherited("inheritance/02.yml").to_string();
    let reparsed = parse(&exported).unwrap();
    assert_eq!(reparsed.to_string(), exported);
}

#[test]
#[allow(
    clippy::indexing_slicing,
    clippy::tests_outside_test_module,
    reason = "Integration test with direct indexing for readability"
)]
fn target_base_manifest_properties() {
    let manifest = parse(&fixture("targetBaseManifest.yml")).unwrap();
    let manifest = SymbolResolver::new(DOMAIN).apply(manifest).unwrap();

    let application = manifest.applications().unwrap()[0];
    assert_eq!(value(application, &["domain"]), DOMAIN);

    let url = value(application, &["url"]);
    assert!(url.ends_with(".api.sauron.mordor.com"), "{url}");
    assert!(url.starts_with("target-base-"), "{url}");
    assert!(!url.contains("${"), "{url}");
}

#[test]
#[allow(
    clippy::indexing_slicing,
    clippy::tests_outside_test_module,
    reason = "Integration test with direct indexing for readability"
)]
fn prepare_runs_every_pass() {
    let manifest = prepare(&fixture("inheritance/01.yml"), DOMAIN, &Configuration::default()).unwrap();
    for application in manifest.applications().unwrap() {
        assert_eq!(value(application, &["propertyA"]), "valueA");
        assert_eq!(value(application, &["domain"]), DOMAIN);
    }

    let first = manifest.applications().unwrap()[0];
    assert_eq!(value(first, &["url"]), "first-host.api.sauron.mordor.com");
    let second = manifest.applications().unwrap()[1];
    assert!(!second.has("url"));
}

#[test]
#[allow(clippy::tests_outside_test_module, reason = "Integration test")]
fn prepare_rejects_blank_domain() {
    let err = prepare(&fixture("inheritance/01.yml"), " ", &Configuration::default()).unwrap_err();
    assert_eq!(err, PipelineError::InvalidDomain(" ".to_owned()));
    assert_eq!(err.to_string(), "invalid deployment domain ' '");
}
