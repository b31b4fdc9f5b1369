// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Fixture-driven integration tests.
//!
//! `tests/fixtures/correct` holds manifests that must parse and serialize to
//! a fixed point; `tests/fixtures/incorrect` holds manifests that every
//! stage combined must reject.

use std::fs;
use std::path::{Path, PathBuf};

use manifest_parser::{Configuration, parse, parse_reader};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// All `.yml` files in a fixture directory, sorted for deterministic order.
fn manifests_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(dir_entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = dir_entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("yml"))
        })
        .collect();
    paths.sort();
    paths
}

fn check_round_trip(path: &Path) -> Result<(), String> {
    let input = fs::read_to_string(path).map_err(|err| format!("unreadable: {err}"))?;
    let exported = parse(&input)
        .map_err(|err| format!("parse failed: {err}"))?
        .to_string();
    let reexported = parse(&exported)
        .map_err(|err| format!("reparse failed: {err}\n{exported}"))?
        .to_string();
    if exported == reexported {
        Ok(())
    } else {
        Err(format!("not a fixed point:\n{exported}\n---\n{reexported}"))
    }
}

#[test]
#[allow(
    clippy::print_stderr,
    clippy::tests_outside_test_module,
    reason = "Integration test with test output"
)]
fn correct_manifests_round_trip() {
    let manifests = manifests_in(&fixtures_dir().join("correct"));
    assert!(!manifests.is_empty(), "no correct fixtures found");

    let mut failures = Vec::new();
    for path in &manifests {
        if let Err(err) = check_round_trip(path) {
            eprintln!("  -> FAIL {}: {err}", path.display());
            failures.push(path.display().to_string());
        }
    }
    assert!(failures.is_empty(), "failed fixtures: {failures:?}");
}

#[test]
#[allow(
    clippy::print_stderr,
    clippy::tests_outside_test_module,
    reason = "Integration test with test output"
)]
fn incorrect_manifests_are_rejected() {
    let manifests = manifests_in(&fixtures_dir().join("incorrect"));
    assert!(!manifests.is_empty(), "no incorrect fixtures found");

    let mut accepted = Vec::new();
    for path in &manifests {
        let Ok(file) = fs::File::open(path) else {
            continue;
        };
        match parse_reader(file, &Configuration::default()) {
            Ok(_) => accepted.push(path.display().to_string()),
            Err(err) => eprintln!(
                "{}: rejected by {} at line {}: {err}",
                path.display(),
                err.stage(),
                err.line()
            ),
        }
    }
    assert!(accepted.is_empty(), "accepted invalid fixtures: {accepted:?}");
}

#[test]
#[allow(clippy::tests_outside_test_module, reason = "Integration test")]
fn quoted_manifest_properties() {
    let input = fs::read_to_string(fixtures_dir().join("quotedPropertiesManifest.yml")).unwrap();
    let manifest = parse(&input).unwrap();

    let application = manifest
        .root()
        .get("applications")
        .and_then(|applications| applications.get(0))
        .unwrap();
    assert_eq!(application.get("path").unwrap().value().unwrap(), ".");
    assert_eq!(
        application.get("host").unwrap().value().unwrap(),
        "quoted-path-application"
    );
    assert_eq!(
        application.get("domain").unwrap().value().unwrap(),
        "cloud-foundry-domain.org"
    );
}

#[test]
#[allow(clippy::tests_outside_test_module, reason = "Integration test")]
fn fixture_errors_point_at_lines() {
    let cases = [
        ("duplicate-key.yml", "parser", 5),
        ("tab-indentation.yml", "preprocessor", 2),
        ("unterminated-quote.yml", "preprocessor", 3),
        ("inconsistent-dedent.yml", "tokenizer", 5),
        ("unmaterialized-block.yml", "tokenizer", 3),
        ("mixed-list-and-mapping.yml", "parser", 6),
        ("missing-applications.yml", "parser", 0),
    ];
    for (name, stage, line) in cases {
        let input = fs::read_to_string(fixtures_dir().join("incorrect").join(name)).unwrap();
        let err = parse(&input).unwrap_err();
        assert_eq!(err.stage().to_string(), stage, "{name}: {err}");
        assert_eq!(err.line(), line, "{name}: {err}");
    }
}

#[test]
#[allow(clippy::tests_outside_test_module, reason = "Integration test")]
fn inner_quotes_survive_export() {
    let input =
        fs::read_to_string(fixtures_dir().join("correct/07-commands-with-quotes.yml")).unwrap();
    let exported = parse(&input).unwrap().to_string();
    let manifest = parse(&exported).unwrap();

    let applications = manifest.applications().unwrap();
    let values: Vec<&str> = applications
        .iter()
        .filter_map(|application| application.get("command").ok())
        .filter_map(|command| command.value().ok())
        .collect();
    assert_eq!(
        values,
        vec![
            "echo \"ready: yes\"",
            "run --label \"a #b\" --mode \"fast: true\""
        ]
    );
    let health_check = applications
        .first()
        .and_then(|application| application.get("health-check").ok())
        .and_then(|check| check.value().ok().map(str::to_owned));
    assert_eq!(health_check.as_deref(), Some("echo \"x #y\""));
}
