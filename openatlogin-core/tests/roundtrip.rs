//! Descriptor file round-trip tests for `openatlogin-core`.
//!
//! Each `#[case]` is isolated — no shared state.

use std::fs;
use std::path::Path;

use assert_fs::prelude::*;
use openatlogin_core::{
    build_descriptor, build_identity, paths, Environment, HostEnvironment, LaunchAgent,
};
use plist::Value;
use rstest::rstest;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn env_at(home: &Path, identifier: Option<&str>, bundle: &str) -> HostEnvironment {
    HostEnvironment::for_home(home, 501, identifier.map(str::to_owned), bundle)
}

// ---------------------------------------------------------------------------
// 1. File round-trip
// ---------------------------------------------------------------------------

#[rstest]
#[case(Some("com.example.MyApp"), "/Applications/MyApp.app")]
#[case(None, "/Users/tester/Applications/Dev Build.app")]
#[case(Some("jp.example.アプリ"), "/Applications/アプリ.app")]
fn descriptor_survives_disk_roundtrip(#[case] identifier: Option<&str>, #[case] bundle: &str) {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let env = env_at(home.path(), identifier, bundle);
    let agent = build_descriptor(&env);

    let path = paths::descriptor_path(&env.per_user_agent_dir(), &build_identity(&env));
    fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
    fs::write(&path, agent.to_xml().expect("encode")).expect("write");

    let bytes = fs::read(&path).expect("read back");
    let decoded = LaunchAgent::from_xml(&bytes).expect("decode");
    assert_eq!(decoded, agent);
}

#[test]
fn decoded_fields_have_expected_plist_types() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let env = env_at(home.path(), Some("com.example.MyApp"), "/Applications/MyApp.app");
    let file = home.child("agent.plist");
    file.write_binary(&build_descriptor(&env).to_xml().expect("encode"))
        .expect("write");

    let value = Value::from_file(file.path()).expect("parse");
    let dict = value.as_dictionary().expect("root dict");

    assert!(dict.get("Label").and_then(Value::as_string).is_some());
    let args = dict
        .get("ProgramArguments")
        .and_then(Value::as_array)
        .expect("ProgramArguments array");
    assert!(args.iter().all(|v| v.as_string().is_some()));
    assert_eq!(dict.get("RunAtLoad").and_then(Value::as_boolean), Some(true));
    assert_eq!(
        dict.get("LimitLoadToSessionType").and_then(Value::as_string),
        Some("Aqua")
    );
}

// ---------------------------------------------------------------------------
// 2. Identity stability
// ---------------------------------------------------------------------------

#[test]
fn identity_is_stable_across_fresh_environments() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let first = build_identity(&env_at(home.path(), Some("com.example.MyApp"), "/a.app"));
    let second = build_identity(&env_at(home.path(), Some("com.example.MyApp"), "/moved/a.app"));
    assert_eq!(first, second, "bundle location must not affect the label");
    assert!(!first.as_str().is_empty());
}

#[test]
fn descriptor_path_lives_in_launch_agents() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let env = env_at(home.path(), Some("com.example.MyApp"), "/a.app");
    let path = paths::descriptor_path(&env.per_user_agent_dir(), &build_identity(&env));
    assert_eq!(
        path,
        home.path()
            .join("Library/LaunchAgents/com.example.MyApp.openatlogin.plist")
    );
}
