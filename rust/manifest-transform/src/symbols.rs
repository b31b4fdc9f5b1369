// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Deployment target symbol resolution.

use log::debug;
use manifest_parser::{LookupError, Manifest, NodeId, NodeRef};
use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom as _;

/// Replaced with the deployment target domain.
pub const TARGET_BASE: &str = "${target-base}";
/// Replaced with a generated `adjective-noun` word.
pub const RANDOM_WORD: &str = "${random-word}";

const ADJECTIVES: &[&str] = &[
    "amber", "brave", "calm", "daring", "eager", "fancy", "gentle", "happy", "icy", "jolly",
    "keen", "lucky", "mellow", "nimble", "proud", "quiet", "rapid", "shiny", "tidy", "vivid",
];

const NOUNS: &[&str] = &[
    "badger", "comet", "dolphin", "ember", "falcon", "glacier", "harbor", "island", "jaguar",
    "kestrel", "lantern", "meadow", "nebula", "otter", "pebble", "quartz", "river", "sparrow",
    "tundra", "willow",
];

/// Sets the deployment domain on every application.
///
/// Placeholders in scalar values are substituted first, then each
/// application gets `domain` set and, when it has a `host`, `url` set to
/// `<host>.<domain>`. Existing values are overwritten.
#[derive(Debug)]
pub struct SymbolResolver<R = ThreadRng> {
    domain: String,
    rng: R,
}

impl SymbolResolver<ThreadRng> {
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self::with_rng(domain, rand::thread_rng())
    }
}

impl<R: Rng> SymbolResolver<R> {
    /// Create a resolver drawing random words from `rng`.
    #[must_use]
    pub fn with_rng(domain: impl Into<String>, rng: R) -> Self {
        Self {
            domain: domain.into(),
            rng,
        }
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    fn random_word(&mut self) -> String {
        let adjective = ADJECTIVES.choose(&mut self.rng).unwrap_or(&"fresh");
        let noun = NOUNS.choose(&mut self.rng).unwrap_or(&"app");
        format!("{adjective}-{noun}")
    }

    fn substitute(&mut self, text: &str) -> String {
        let mut resolved = text.replace(TARGET_BASE, &self.domain);
        while let Some(start) = resolved.find(RANDOM_WORD) {
            let word = self.random_word();
            resolved.replace_range(start..start + RANDOM_WORD.len(), &word);
        }
        resolved
    }

    fn resolve_placeholders(&mut self, manifest: &mut Manifest) -> Result<usize, LookupError> {
        let pending: Vec<(NodeId, String)> = manifest
            .root()
            .descendants()
            .into_iter()
            .filter_map(|node| {
                let text = node.value().ok()?;
                (text.contains(TARGET_BASE) || text.contains(RANDOM_WORD))
                    .then(|| (node.id(), text.to_owned()))
            })
            .collect();

        for (id, text) in &pending {
            let resolved = self.substitute(text);
            manifest.update_scalar(*id, resolved)?;
        }
        Ok(pending.len())
    }

    /// Resolve placeholders and set `domain` and `url` on every application.
    pub fn apply(&mut self, mut manifest: Manifest) -> Result<Manifest, LookupError> {
        let substituted = self.resolve_placeholders(&mut manifest)?;

        let applications: Vec<NodeId> = manifest
            .applications()?
            .into_iter()
            .map(NodeRef::id)
            .collect();
        for &application in &applications {
            manifest.set_scalar(application, "domain", self.domain.as_str())?;

            let host = manifest
                .node(application)
                .and_then(|node| node.get_opt("host"))
                .map(|host| host.value().map(str::to_owned))
                .transpose()?;
            if let Some(host) = host {
                manifest.set_scalar(application, "url", format!("{host}.{}", self.domain))?;
            }
        }

        debug!(
            "Resolved {substituted} placeholders and domain '{}' for {} applications",
            self.domain,
            applications.len()
        );
        Ok(manifest)
    }
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    reason = "Tests benefit from direct indexing for readability"
)]
mod tests {
    use manifest_parser::{LookupErrorKind, parse};
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;
    use serde_json::json;

    use super::*;

    const DOMAIN: &str = "api.sauron.mordor.com";

    fn is_random_word(word: &str) -> bool {
        word.split_once('-')
            .is_some_and(|(adjective, noun)| ADJECTIVES.contains(&adjective) && NOUNS.contains(&noun))
    }

    #[test]
    fn test_domain_and_url() {
        let manifest = parse("applications:\n- name: a\n  host: h\n  url: stale.example.org\n- name: b\n").unwrap();
        let manifest = SymbolResolver::new(DOMAIN).apply(manifest).unwrap();
        assert_eq!(
            manifest.to_json()["applications"],
            json!([
                {
                    "name": "a",
                    "host": "h",
                    "url": "h.api.sauron.mordor.com",
                    "domain": DOMAIN,
                },
                {"name": "b", "domain": DOMAIN},
            ])
        );
    }

    #[test]
    fn test_existing_domain_is_overwritten_in_place() {
        let manifest = parse("applications:\n- name: a\n  domain: old.org\n  host: h\n").unwrap();
        let manifest = SymbolResolver::new(DOMAIN).apply(manifest).unwrap();
        assert_eq!(
            manifest.to_string(),
            "applications:\n  - name: a\n    domain: api.sauron.mordor.com\n    host: h\n    url: h.api.sauron.mordor.com\n"
        );
    }

    #[test]
    fn test_target_base_placeholder() {
        let manifest =
            parse("applications:\n- name: a\n  route: www.${target-base}/path\n").unwrap();
        let manifest = SymbolResolver::new(DOMAIN).apply(manifest).unwrap();
        let app = manifest.applications().unwrap()[0];
        assert_eq!(
            app.get("route").unwrap().value().unwrap(),
            "www.api.sauron.mordor.com/path"
        );
    }

    #[test]
    fn test_random_word_flows_into_url() {
        let manifest = parse("applications:\n- name: a\n  host: ${random-word}\n").unwrap();
        let mut resolver = SymbolResolver::with_rng(DOMAIN, StdRng::seed_from_u64(7));
        let manifest = resolver.apply(manifest).unwrap();

        let app = manifest.applications().unwrap()[0];
        let host = app.get("host").unwrap().value().unwrap();
        assert!(is_random_word(host), "unexpected word {host}");
        assert_eq!(
            app.get("url").unwrap().value().unwrap(),
            format!("{host}.{DOMAIN}")
        );
    }

    #[test]
    fn test_seeded_words_are_deterministic() {
        let mut first = SymbolResolver::with_rng(DOMAIN, StdRng::seed_from_u64(42));
        let mut second = SymbolResolver::with_rng(DOMAIN, StdRng::seed_from_u64(42));
        let words: Vec<String> = (0..4).map(|_| first.substitute(RANDOM_WORD)).collect();
        let again: Vec<String> = (0..4).map(|_| second.substitute(RANDOM_WORD)).collect();
        assert_eq!(words, again);
        assert!(words.iter().all(|word| is_random_word(word)));
    }

    #[test]
    fn test_every_placeholder_is_replaced() {
        let mut resolver = SymbolResolver::with_rng(DOMAIN, StdRng::seed_from_u64(1));
        let resolved = resolver.substitute("${random-word}.${random-word}.${target-base}");
        assert!(!resolved.contains("${"));
        assert!(resolved.ends_with(".api.sauron.mordor.com"));
    }

    #[test]
    fn test_non_scalar_host() {
        let manifest = parse("applications:\n- name: a\n  host:\n    primary: h\n").unwrap();
        let err = SymbolResolver::new(DOMAIN).apply(manifest).unwrap_err();
        assert_eq!(err.kind, LookupErrorKind::NotAScalar);
        assert_eq!(err.path, "applications[0].host");
    }
}
