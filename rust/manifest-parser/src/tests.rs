// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Unit tests for the full parse pipeline.

use super::*;

#[test]
fn test_minimal_manifest() {
    let manifest = parse("applications:\n- name: app\n").unwrap();
    assert_eq!(manifest.applications().unwrap().len(), 1);
    assert!(manifest.globals().is_empty());
}

#[test]
fn test_quoted_host_and_dot_path() {
    let input = "\
applications:
- name: quoted
  path: .
  host: \"quoted-path-application\"
";
    let manifest = parse(input).unwrap();
    let app = manifest.root().get("applications").and_then(|apps| apps.get(0)).unwrap();
    assert_eq!(app.get("host").unwrap().value().unwrap(), "quoted-path-application");
    assert_eq!(app.get("path").unwrap().value().unwrap(), ".");
    assert!(manifest.to_string().contains("    path: .\n"));
}

#[test]
fn test_round_trip_is_fixed_point() {
    let input = "\
# deployment
instances: 2   # default
applications:
-   name: web
    command: \"node server.js
      --port 8080\"
    env:
        GREETING: \"hello: world\"
        EMPTY: \"\"
    services: [ignored]
- name: worker
  command: run \\
    --queue jobs
";
    let first = parse(input).unwrap().to_string();
    let second = parse(&first).unwrap().to_string();
    assert_eq!(first, second);
    assert!(first.contains("GREETING: hello: world\n"));
    assert!(first.contains("command: run --queue jobs"));
    assert!(first.contains("command: node server.js --port 8080"));
}

#[test]
fn test_errors_name_their_stage() {
    let cases = [
        ("applications:\n\t- name: a\n", Stage::Preprocessor, 2),
        (
            "applications:\n- name: a\n  env:\n    K: v\n host: b\n",
            Stage::Tokenizer,
            5,
        ),
        ("applications:\n- name: a\n  name: b\n", Stage::Parser, 3),
    ];
    for (input, stage, line) in cases {
        let err = parse(input).unwrap_err();
        assert_eq!(err.stage(), stage, "{input:?}: {err}");
        assert_eq!(err.line(), line, "{input:?}: {err}");
    }
}

#[test]
fn test_parse_with_size_limit() {
    let config = Configuration {
        max_input_bytes: Some(10),
        ..Configuration::default()
    };
    let err = parse_with("applications:\n- name: a\n", &config).unwrap_err();
    assert!(matches!(
        err,
        ManifestError::MalformedInput(MalformedInputError {
            kind: InputErrorKind::InputTooLarge { .. },
            ..
        })
    ));
}

#[test]
fn test_parse_reader() {
    let input: &[u8] = b"applications:\n- name: from-reader\n";
    let manifest = parse_reader(input, &Configuration::default()).unwrap();
    let app = manifest.root().get("applications").and_then(|apps| apps.get(0)).unwrap();
    assert_eq!(app.get("name").unwrap().value().unwrap(), "from-reader");
}

#[test]
fn test_tokens_are_exposed() {
    let lines = preprocess("applications:\n- name: a\n").unwrap();
    let tokens = tokenize(&lines).unwrap();
    assert_eq!(tokens.first().map(|rt| &rt.token), Some(&Token::Key("applications".to_owned())));
    assert_eq!(tokens.last().map(|rt| &rt.token), Some(&Token::EndOfInput));
    assert!(parse_tokens(&tokens).is_ok());
}
