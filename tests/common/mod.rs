#![allow(dead_code)]

use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write a one-entry sketch with a `ksize` signature holding `mins`, plus a
/// k=21 decoy signature that must never be read at other sizes.
pub fn write_sig(dir: &TempDir, name: &str, ksize: u32, mins: &[u64]) -> PathBuf {
    let doc = json!([{
        "class": "sourmash_signature",
        "name": name,
        "signatures": [
            { "ksize": 21, "num": 0, "seed": 42, "mins": [u64::MAX - 1] },
            { "ksize": ksize, "num": 0, "seed": 42, "molecule": "DNA", "mins": mins }
        ]
    }]);
    let path = dir.path().join(format!("{name}.sig"));
    std::fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();
    path
}

pub fn sorted(mut v: Vec<u64>) -> Vec<u64> {
    v.sort_unstable();
    v
}
