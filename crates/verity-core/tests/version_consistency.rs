//! Ensures all workspace crates use `version.workspace = true` and that
//! the workspace version matches what the core library reports.

use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .unwrap()
        .to_path_buf()
}

fn read_toml(path: &Path) -> toml::Value {
    let text = std::fs::read_to_string(path).unwrap();
    text.parse().unwrap()
}

#[test]
fn all_crates_use_workspace_version() {
    let root = workspace_root();
    for krate in ["crates/verity-core", "crates/verity-cli"] {
        let doc = read_toml(&root.join(krate).join("Cargo.toml"));
        let inherits = doc["package"]["version"]
            .get("workspace")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        assert!(inherits, "{} should use version.workspace = true", krate);
    }
}

#[test]
fn workspace_version_matches_library_version() {
    let doc = read_toml(&workspace_root().join("Cargo.toml"));
    let ws_version = doc["workspace"]["package"]["version"].as_str().unwrap();
    assert_eq!(ws_version, verity_core::VERSION);
}
