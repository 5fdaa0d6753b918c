// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::panic)]

use graft_config::{ConfigError, FsProfileStore, ProfileName, ProfileStore, RuleSystemProfiles};
use graft_core::{ParityCheck, RuleSystemConfig};

fn profiles(dir: &tempfile::TempDir) -> RuleSystemProfiles<FsProfileStore> {
    RuleSystemProfiles::new(FsProfileStore::at(dir.path()).unwrap())
}

fn name(s: &str) -> ProfileName {
    ProfileName::new(s).unwrap()
}

#[test]
fn missing_profile_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let profiles = profiles(&dir);
    assert!(profiles.load_stored(&name("absent")).unwrap().is_none());
    assert_eq!(
        profiles.load(&name("absent")).unwrap(),
        RuleSystemConfig::default()
    );
    assert!(profiles.names().unwrap().is_empty());
}

#[test]
fn saved_profiles_round_trip_and_are_listed() {
    let dir = tempfile::tempdir().unwrap();
    let profiles = profiles(&dir);
    let dense = RuleSystemConfig {
        parity_check: ParityCheck::WhenArmed,
        match_limit: Some(8),
        trace_pregraph: true,
    };
    profiles.save(&name("dense"), &dense).unwrap();
    profiles
        .save(&ProfileName::default(), &RuleSystemConfig::default())
        .unwrap();

    assert!(dir.path().join("dense.json").exists());
    assert!(!dir.path().join(".dense.json.tmp").exists());
    assert_eq!(profiles.load(&name("dense")).unwrap(), dense);
    assert_eq!(
        profiles.names().unwrap(),
        vec![name("dense"), ProfileName::default()]
    );
}

#[test]
fn stray_files_are_not_listed() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Notes.json"), "{}").unwrap();
    std::fs::write(dir.path().join("readme.txt"), "").unwrap();
    std::fs::write(dir.path().join("ok.json"), "{}").unwrap();
    let store = FsProfileStore::at(dir.path()).unwrap();
    assert_eq!(store.names().unwrap(), vec![name("ok")]);
}

#[test]
fn bad_documents_name_the_profile_and_key() {
    let dir = tempfile::tempdir().unwrap();
    let profiles = profiles(&dir);
    let write = |doc: &str| std::fs::write(dir.path().join("bad.json"), doc).unwrap();
    let bad = name("bad");

    write("{ not json");
    assert!(matches!(profiles.load(&bad), Err(ConfigError::Json { .. })));

    write("[1, 2]");
    assert!(matches!(profiles.load(&bad), Err(ConfigError::NotAnObject { .. })));

    write(r#"{"match_limt": 3}"#);
    match profiles.load(&bad) {
        Err(ConfigError::UnknownField { profile, field }) => {
            assert_eq!(profile, bad);
            assert_eq!(field, "match_limt");
        }
        other => panic!("unexpected {other:?}"),
    }

    write(r#"{"parity_check": "sometimes"}"#);
    match profiles.load(&bad) {
        Err(ConfigError::InvalidParity { value, .. }) => assert_eq!(value, "\"sometimes\""),
        other => panic!("unexpected {other:?}"),
    }

    write(r#"{"match_limit": 0}"#);
    assert!(matches!(
        profiles.load(&bad),
        Err(ConfigError::ZeroMatchLimit { .. })
    ));

    write(r#"{"match_limit": "many"}"#);
    assert!(matches!(profiles.load(&bad), Err(ConfigError::Json { .. })));

    write("");
    assert_eq!(profiles.load(&bad).unwrap(), RuleSystemConfig::default());
}

#[test]
fn invalid_configs_are_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let profiles = profiles(&dir);
    let zero = RuleSystemConfig {
        match_limit: Some(0),
        ..RuleSystemConfig::default()
    };
    assert!(matches!(
        profiles.save(&name("zero"), &zero),
        Err(ConfigError::ZeroMatchLimit { .. })
    ));
    assert!(!dir.path().join("zero.json").exists());
}
