#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! Manifest policy tests for the queue dashboard.
//!
//! These tests verify that Cargo.toml keeps the panic-free lint set, the
//! feature layout, and the demo targets agreed on for the crate. If any test
//! fails, the manifest has drifted from policy.
//!
//! All checks are synchronous filesystem reads; no network access or async
//! runtime needed.

use std::path::PathBuf;

/// Returns the project root directory (where Cargo.toml lives).
fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Parses Cargo.toml into a TOML table.
fn manifest() -> toml::Table {
    let path = project_root().join("Cargo.toml");
    let contents = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read '{}': {e}", path.display()));
    toml::from_str(&contents).unwrap_or_else(|e| panic!("Cargo.toml is not valid TOML: {e}"))
}

fn table<'a>(value: &'a toml::Table, key: &str) -> &'a toml::Table {
    value
        .get(key)
        .and_then(toml::Value::as_table)
        .unwrap_or_else(|| panic!("Cargo.toml is missing the [{key}] table"))
}

fn string_array(value: &toml::Value) -> Vec<&str> {
    value
        .as_array()
        .expect("expected an array")
        .iter()
        .map(|v| v.as_str().expect("expected a string"))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Module: panic_policy
// ─────────────────────────────────────────────────────────────────────────────

mod panic_policy {
    use super::*;

    const REQUIRED_DENY_LINTS: &[&str] = &[
        "unwrap_used",
        "expect_used",
        "panic",
        "todo",
        "unimplemented",
        "indexing_slicing",
    ];

    #[test]
    fn cargo_toml_denies_all_panic_prone_lints() {
        let manifest = manifest();
        let clippy = table(table(&manifest, "lints"), "clippy");

        for lint in REQUIRED_DENY_LINTS {
            assert_eq!(
                clippy.get(*lint).and_then(toml::Value::as_str),
                Some("deny"),
                "[lints.clippy] must set `{lint} = \"deny\"` to keep library code panic-free."
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Module: feature_policy
// ─────────────────────────────────────────────────────────────────────────────

mod feature_policy {
    use super::*;

    #[test]
    fn default_features_enable_websocket_and_http() {
        let manifest = manifest();
        let features = table(&manifest, "features");
        let default = string_array(&features["default"]);
        assert!(default.contains(&"transport-websocket"));
        assert!(default.contains(&"http-client"));
    }

    #[test]
    fn transport_crates_are_optional() {
        let manifest = manifest();
        let deps = table(&manifest, "dependencies");

        for name in ["tokio-tungstenite", "futures-util", "reqwest"] {
            let optional = deps
                .get(name)
                .and_then(|d| d.get("optional"))
                .and_then(toml::Value::as_bool);
            assert_eq!(
                optional,
                Some(true),
                "`{name}` must stay optional so the core builds without network stacks."
            );
        }
    }

    #[test]
    fn library_tokio_does_not_enable_full() {
        let manifest = manifest();
        let tokio = &table(&manifest, "dependencies")["tokio"];
        let features = string_array(&tokio["features"]);
        assert!(
            !features.contains(&"full"),
            "the library must not force tokio's `full` feature on downstream crates"
        );
        for needed in ["sync", "macros", "rt", "time"] {
            assert!(features.contains(&needed), "tokio feature `{needed}` is required");
        }
    }

    #[test]
    fn reqwest_uses_rustls_without_default_features() {
        let manifest = manifest();
        let reqwest = &table(&manifest, "dependencies")["reqwest"];
        assert_eq!(
            reqwest.get("default-features").and_then(toml::Value::as_bool),
            Some(false)
        );
        assert!(string_array(&reqwest["features"]).contains(&"rustls-tls"));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Module: demo_targets
// ─────────────────────────────────────────────────────────────────────────────

mod demo_targets {
    use super::*;

    #[test]
    fn every_declared_demo_exists() {
        let manifest = manifest();
        let examples = manifest["example"].as_array().expect("[[example]] targets");
        assert!(!examples.is_empty());

        for example in examples {
            let path = example["path"].as_str().expect("example path");
            assert!(
                path.starts_with("demos/"),
                "demo '{path}' must live under demos/"
            );
            assert!(
                project_root().join(path).is_file(),
                "demo '{path}' is declared in Cargo.toml but missing"
            );
        }
    }
}
