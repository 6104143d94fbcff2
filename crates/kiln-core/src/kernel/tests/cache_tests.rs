use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde_json::json;
use tempfile::tempdir;

use crate::config::data::ConfigData;
use crate::kernel::cache::BootCache;
use crate::kernel::directories::Directories;
use crate::tests::integration::common::set_modified;

fn layout() -> Directories {
    Directories::new("/srv/app", "/srv/app")
}

fn snapshot(sources: Vec<PathBuf>, packages: Vec<String>) -> BootCache {
    BootCache::new(SystemTime::now(), layout(), sources, config(), packages)
}

fn config() -> ConfigData {
    ConfigData::from_map(json!({ "name": "demo", "nested": { "n": 1 } }).as_object().unwrap().clone())
}

#[test]
fn test_store_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("var/cache/kernel.json");
    let cache = snapshot(vec![dir.path().join("composer.json")], vec!["A".to_string()]);

    cache.store(&path).unwrap();
    assert_eq!(BootCache::load(&path), Some(cache));
}

#[test]
fn test_missing_or_invalid_file_is_a_miss() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kernel.json");
    assert!(BootCache::load(&path).is_none());

    fs::write(&path, "[1, 2").unwrap();
    assert!(BootCache::load(&path).is_none());

    fs::write(&path, r#"{ "built_at": "yesterday" }"#).unwrap();
    assert!(BootCache::load(&path).is_none());
}

#[test]
fn test_fresh_only_when_newer_than_every_source() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("app.json");
    fs::write(&source, "{}").unwrap();
    set_modified(&source, SystemTime::now() - Duration::from_secs(60));

    let sources = vec![source.clone()];
    let cache = snapshot(sources.clone(), Vec::new());
    assert!(cache.is_fresh(&layout(), &sources));

    set_modified(&source, SystemTime::now() + Duration::from_secs(60));
    assert!(!cache.is_fresh(&layout(), &sources));
}

#[test]
fn test_changed_source_list_is_stale() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");
    fs::write(&a, "{}").unwrap();
    fs::write(&b, "{}").unwrap();
    set_modified(&a, SystemTime::now() - Duration::from_secs(60));
    set_modified(&b, SystemTime::now() - Duration::from_secs(60));

    let cache = snapshot(vec![a.clone()], Vec::new());
    assert!(!cache.is_fresh(&layout(), &[a.clone(), b]));
}

#[test]
fn test_vanished_source_is_stale() {
    let dir = tempdir().unwrap();
    let gone = dir.path().join("gone.json");
    let cache = snapshot(vec![gone.clone()], Vec::new());
    assert!(!cache.is_fresh(&layout(), &[gone]));
}

#[test]
fn test_store_fails_when_cache_dir_is_a_file() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("var");
    fs::write(&blocker, "not a directory").unwrap();

    let cache = snapshot(Vec::new(), Vec::new());
    assert!(cache.store(&blocker.join("cache/kernel.json")).is_err());
}

#[test]
fn test_changed_directory_layout_is_stale() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("app.json");
    fs::write(&source, "{}").unwrap();
    set_modified(&source, SystemTime::now() - Duration::from_secs(60));

    let sources = vec![source];
    let cache = snapshot(sources.clone(), Vec::new());
    assert!(cache.is_fresh(&layout(), &sources));
    assert!(!cache.is_fresh(&Directories::new("/srv/app", "/home/someone"), &sources));
    assert!(!cache.is_fresh(&Directories::new("/srv/other", "/srv/app"), &sources));
}

#[test]
fn test_stamp_is_taken_from_the_boot_start() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("app.json");
    fs::write(&source, "{}").unwrap();
    let started = SystemTime::now() - Duration::from_secs(30);
    set_modified(&source, SystemTime::now() - Duration::from_secs(10));

    // Edited after the boot started reading, so the snapshot is already stale
    let sources = vec![source];
    let cache = BootCache::new(started, layout(), sources.clone(), config(), Vec::new());
    assert!(!cache.is_fresh(&layout(), &sources));
}
