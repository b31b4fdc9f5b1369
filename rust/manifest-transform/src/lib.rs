// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.
#![deny(unused_crate_dependencies)]

//! Prepare parsed deployment manifests for a target.
//!
//! A manifest goes through two passes after parsing:
//! - [`Transformator`] copies global properties into every application
//! - [`SymbolResolver`] substitutes placeholders and sets `domain` and `url`
//!
//! [`prepare`] runs the parser and both passes in order.

use log::debug;
use manifest_parser::{Configuration, Manifest, ManifestError, parse_with};

mod inherit;
mod symbols;

pub use inherit::Transformator;
pub use symbols::{RANDOM_WORD, SymbolResolver, TARGET_BASE};

/// Error raised while preparing a manifest for deployment.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum PipelineError {
    Manifest(ManifestError),
    /// The deployment domain is empty or contains whitespace.
    #[display("invalid deployment domain '{_0}'")]
    #[from(ignore)]
    InvalidDomain(String),
}

impl std::error::Error for PipelineError {}

fn check_domain(domain: &str) -> Result<(), PipelineError> {
    if domain.is_empty() || domain.contains(char::is_whitespace) {
        return Err(PipelineError::InvalidDomain(domain.to_owned()));
    }
    Ok(())
}

/// Parse `input`, apply global inheritance and resolve it against `domain`.
pub fn prepare(
    input: &str,
    domain: &str,
    config: &Configuration,
) -> Result<Manifest, PipelineError> {
    check_domain(domain)?;
    let manifest = parse_with(input, config)?;
    let manifest = Transformator::new(config)
        .apply(manifest)
        .map_err(ManifestError::from)?;
    let manifest = SymbolResolver::new(domain)
        .apply(manifest)
        .map_err(ManifestError::from)?;

    debug!(
        "Prepared manifest for '{domain}' with {} nodes",
        manifest.node_count()
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use manifest_parser::Stage;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_prepare() {
        let input = "memory: 256M\napplications:\n- name: web\n  host: web\n";
        let manifest = prepare(input, "example.org", &Configuration::default()).unwrap();
        assert_eq!(
            manifest.to_json(),
            json!({
                "memory": "256M",
                "applications": [{
                    "name": "web",
                    "host": "web",
                    "memory": "256M",
                    "domain": "example.org",
                    "url": "web.example.org",
                }],
            })
        );
    }

    #[test]
    fn test_invalid_domain() {
        for domain in ["", "a b.org", "\texample.org"] {
            let err = prepare("applications:\n- name: a\n", domain, &Configuration::default())
                .unwrap_err();
            assert_eq!(err, PipelineError::InvalidDomain(domain.to_owned()));
        }
    }

    #[test]
    fn test_parse_errors_pass_through() {
        let err = prepare("memory: 1G\n", "example.org", &Configuration::default()).unwrap_err();
        let PipelineError::Manifest(err) = err else {
            panic!("expected a manifest error, got {err}");
        };
        assert_eq!(err.stage(), Stage::Parser);
    }

    #[test]
    fn test_host_mapping_is_a_lookup_error() {
        let input = "applications:\n- name: a\n  host:\n    primary: h\n";
        let err = prepare(input, "example.org", &Configuration::default()).unwrap_err();
        let PipelineError::Manifest(err) = err else {
            panic!("expected a manifest error, got {err}");
        };
        assert_eq!(err.stage(), Stage::Lookup);
    }
}
