//! Fake scc for integration tests.
//!
//! One shell script serves every test. It looks at its last argument (the
//! analyzed path) and replays fixture files found there:
//!
//! - `scc.json` is printed to stdout
//! - `stderr.txt` is printed to stderr
//! - `exit_code` sets the exit status
//! - `sleep` delays the response by that many seconds
//!
//! The arguments it received are written to `args.seen`.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use scc_metrics::SccConfig;
use tempfile::TempDir;

pub const GO_PROJECT: &str = r#"[{"Name":"Go","Lines":100,"Code":80,"Comment":10,"Blank":10,"Complexity":5,"Bytes":2000,"Count":2,"Files":[{"Filename":"a.go","Location":"/x","Language":"Go","Lines":60,"Code":50,"Comment":5,"Blank":5,"Complexity":3,"Bytes":1200},{"Filename":"b.go","Location":"/x","Language":"Go","Lines":40,"Code":30,"Comment":5,"Blank":5,"Complexity":2,"Bytes":800}]}]"#;

pub const MIXED_PROJECT: &str = r#"[
  {"Name":"Rust","Lines":300,"Code":240,"Comment":30,"Blank":30,"Complexity":41,"Bytes":9000,"Count":2,"Files":[
    {"Filename":"src/lib.rs","Location":"src","Language":"Rust","Lines":200,"Code":160,"Comment":20,"Blank":20,"Complexity":30,"Bytes":6000},
    {"Filename":"src/cli.rs","Location":"src","Language":"Rust","Lines":100,"Code":80,"Comment":10,"Blank":10,"Complexity":11,"Bytes":3000}]},
  {"Name":"Shell","Lines":20,"Code":15,"Comment":3,"Blank":2,"Complexity":4,"Bytes":400,"Count":1,"Files":[
    {"Filename":"build.sh","Location":".","Language":"Shell","Lines":20,"Code":15,"Comment":3,"Blank":2,"Complexity":4,"Bytes":400}]}
]"#;

const SCRIPT: &str = r#"#!/bin/sh
for target; do :; done
if [ -d "$target" ]; then printf '%s\n' "$@" > "$target/args.seen"; fi
if [ -f "$target/sleep" ]; then sleep "$(cat "$target/sleep")"; fi
if [ -f "$target/stderr.txt" ]; then cat "$target/stderr.txt" >&2; fi
if [ -f "$target/scc.json" ]; then cat "$target/scc.json"; fi
if [ -f "$target/exit_code" ]; then exit "$(cat "$target/exit_code")"; fi
exit 0
"#;

/// Path to the shared fake scc, written once per test binary.
pub fn fake_scc() -> &'static Path {
    static SCRIPT_PATH: OnceLock<PathBuf> = OnceLock::new();
    SCRIPT_PATH.get_or_init(|| {
        let dir = std::env::temp_dir().join(format!("scc-metrics-fake-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create fake scc dir");
        let path = dir.join("scc");
        std::fs::write(&path, SCRIPT).expect("write fake scc");
        let mut perms = std::fs::metadata(&path).expect("stat fake scc").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod fake scc");
        path
    })
}

pub fn config() -> SccConfig {
    SccConfig {
        binary: fake_scc().display().to_string(),
        ..SccConfig::default()
    }
}

/// A project directory whose fake scc run prints `json`.
pub fn project(json: &str) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("scc.json"), json).expect("write fixture");
    dir
}

pub fn path_of(dir: &TempDir) -> String {
    dir.path().display().to_string()
}

pub fn seen_args(dir: &TempDir) -> Vec<String> {
    std::fs::read_to_string(dir.path().join("args.seen"))
        .expect("fake scc was not invoked")
        .lines()
        .map(str::to_string)
        .collect()
}
