// tests/resolve.rs

//! End-to-end resolution tests: pkg-config-with-probe-fallback, priority
//! merging, and aggregated failure reporting.

mod common;

use common::{MockHandle, MockQuery, add_header, init_logging, prefix_with_libs};
use nativedep::{
    Error, Origin, PkgConfigData, PkgConfigTool, QueryOutcome, RawRequirement, Requirement,
    Resolver, SearchPrefixes, normalize,
};
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(target_os = "linux")]
#[test]
fn test_mixed_pkgconfig_and_probe_merge() {
    init_logging();

    // libfoo comes from pkg-config; libbar only exists on disk
    let usr_local = prefix_with_libs(&["libbar.so"]);

    let foo = PkgConfigData {
        version: Some("1.3".to_string()),
        include_dirs: vec![PathBuf::from("/opt/pkgA/include")],
        library_dirs: vec![PathBuf::from("/opt/pkgA/lib")],
        link_names: vec!["foo".to_string()],
        ..Default::default()
    };
    let mock = MockQuery::new(vec![("libfoo", QueryOutcome::Found(foo))]);

    let prefixes = SearchPrefixes::from_dirs(vec![
        PathBuf::from("/opt/pkgA"),
        usr_local.path().to_path_buf(),
    ]);
    let resolver = Resolver::new(Box::new(MockHandle(Arc::clone(&mock))), prefixes);

    let requirements = normalize(&[
        RawRequirement::Spec("libfoo >= 1.2".to_string()),
        RawRequirement::Name("libbar".to_string()),
    ])
    .unwrap();

    let set = resolver.resolve(&requirements).unwrap();

    assert_eq!(set.include_dirs, vec![PathBuf::from("/opt/pkgA/include")]);
    assert_eq!(
        set.library_dirs,
        vec![PathBuf::from("/opt/pkgA/lib"), usr_local.path().join("lib")]
    );
    assert_eq!(
        set.link_names,
        vec!["foo".to_string(), "bar".to_string()]
    );
    assert!(set.missing.is_empty());

    assert_eq!(set.packages.len(), 2);
    assert_eq!(set.packages[0].origin, Some(Origin::PkgConfig));
    assert_eq!(set.packages[0].version.as_deref(), Some("1.3"));
    assert_eq!(set.packages[1].origin, Some(Origin::Probe));
}

#[test]
fn test_version_mismatch_reported_with_reason() {
    init_logging();

    let baz = PkgConfigData {
        version: Some("1.0".to_string()),
        library_dirs: vec![PathBuf::from("/usr/lib")],
        link_names: vec!["baz".to_string()],
        ..Default::default()
    };
    let mock = MockQuery::new(vec![("libbaz", QueryOutcome::Found(baz))]);
    let empty = tempfile::tempdir().unwrap();
    let resolver = Resolver::new(
        Box::new(MockHandle(mock)),
        SearchPrefixes::from_dirs(vec![empty.path().to_path_buf()]),
    );

    let requirements = normalize(&[RawRequirement::Spec("libbaz >= 9.9".to_string())]).unwrap();
    let err = resolver.resolve(&requirements).unwrap_err();

    match err {
        Error::Unresolved(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].name, "libbaz");
            assert_eq!(
                failures[0].reason.to_string(),
                "version 1.0 does not satisfy >=9.9"
            );
        }
        other => panic!("expected Unresolved, got {:?}", other),
    }
}

#[cfg(target_os = "linux")]
#[test]
fn test_all_requirements_attempted_before_failure() {
    init_logging();

    let usr_local = prefix_with_libs(&["libok.so"]);
    let mock = MockQuery::new(Vec::new()); // everything unknown to pkg-config

    let resolver = Resolver::new(
        Box::new(MockHandle(Arc::clone(&mock))),
        SearchPrefixes::from_dirs(vec![usr_local.path().to_path_buf()]),
    );

    let requirements = normalize(&[
        RawRequirement::Name("libmissing".to_string()),
        RawRequirement::Name("libok".to_string()),
    ])
    .unwrap();

    let err = resolver.resolve(&requirements).unwrap_err();
    match err {
        Error::Unresolved(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].name, "libmissing");
        }
        other => panic!("expected Unresolved, got {:?}", other),
    }

    // the resolvable requirement was attempted despite the earlier miss
    assert_eq!(mock.queried(), vec!["libmissing", "libok"]);
}

#[cfg(target_os = "linux")]
#[test]
fn test_probe_fallback_when_mechanism_absent() {
    init_logging();

    // a pkg-config binary that cannot be spawned: mechanism unavailable
    let tool = PkgConfigTool::new("nativedep-test-no-such-pkg-config");
    let prefix = prefix_with_libs(&["libwidget.so"]);
    let resolver = Resolver::new(
        Box::new(tool),
        SearchPrefixes::from_dirs(vec![prefix.path().to_path_buf()]),
    );

    let requirements = normalize(&[RawRequirement::Name("libwidget".to_string())]).unwrap();
    let set = resolver.resolve(&requirements).unwrap();

    assert_eq!(set.link_names, vec!["widget".to_string()]);
    assert_eq!(set.library_dirs, vec![prefix.path().join("lib")]);
    assert_eq!(set.packages[0].origin, Some(Origin::Probe));
}

#[cfg(target_os = "linux")]
#[test]
fn test_probe_adds_include_dir_only_with_header() {
    init_logging();

    let with_header = prefix_with_libs(&["libgadget.so"]);
    add_header(with_header.path(), "gadget.h");
    let without_header = prefix_with_libs(&["libgizmo.so"]);

    let mock = MockQuery::new(Vec::new());
    let resolver = Resolver::new(
        Box::new(MockHandle(Arc::clone(&mock))),
        SearchPrefixes::from_dirs(vec![
            with_header.path().to_path_buf(),
            without_header.path().to_path_buf(),
        ]),
    );

    let requirements = normalize(&[
        RawRequirement::Name("libgadget".to_string()),
        RawRequirement::Name("libgizmo".to_string()),
    ])
    .unwrap();
    let set = resolver.resolve(&requirements).unwrap();

    // only the prefix that actually carries gadget.h contributes an include dir
    assert_eq!(set.include_dirs, vec![with_header.path().join("include")]);
}

#[cfg(target_os = "linux")]
#[test]
fn test_probe_respects_constraint_from_filename_version() {
    init_logging();

    let prefix = prefix_with_libs(&["libold.so.1.0"]);
    let mock = MockQuery::new(Vec::new());
    let resolver = Resolver::new(
        Box::new(MockHandle(Arc::clone(&mock))),
        SearchPrefixes::from_dirs(vec![prefix.path().to_path_buf()]),
    );

    let requirements = normalize(&[RawRequirement::Spec("libold >= 2.0".to_string())]).unwrap();
    let err = resolver.resolve(&requirements).unwrap_err();

    assert!(err.to_string().contains("version 1.0 does not satisfy >=2.0"));
}

#[test]
fn test_optional_requirement_may_be_absent() {
    init_logging();

    let empty = tempfile::tempdir().unwrap();
    let mock = MockQuery::new(Vec::new());
    let resolver = Resolver::new(
        Box::new(MockHandle(Arc::clone(&mock))),
        SearchPrefixes::from_dirs(vec![empty.path().to_path_buf()]),
    );

    let requirement = Requirement::new("libextra").unwrap().optional();
    let set = resolver.resolve(&[requirement]).unwrap();

    assert_eq!(set.missing.len(), 1);
    assert_eq!(set.missing[0].name, "libextra");
    assert!(!set.packages[0].found);
    assert!(set.packages[0].link_names.is_empty());
    assert!(set.link_names.is_empty());
}

#[test]
fn test_resolution_is_deterministic() {
    init_logging();

    let foo = PkgConfigData {
        version: Some("2.1".to_string()),
        include_dirs: vec![PathBuf::from("/a/include"), PathBuf::from("/b/include")],
        library_dirs: vec![PathBuf::from("/a/lib")],
        link_names: vec!["foo".to_string()],
        ..Default::default()
    };
    let mock = MockQuery::new(vec![("libfoo", QueryOutcome::Found(foo))]);
    let empty = tempfile::tempdir().unwrap();
    let resolver = Resolver::new(
        Box::new(MockHandle(Arc::clone(&mock))),
        SearchPrefixes::from_dirs(vec![empty.path().to_path_buf()]),
    );

    let requirements = normalize(&[RawRequirement::Name("libfoo".to_string())]).unwrap();
    let first = resolver.resolve(&requirements).unwrap();
    let second = resolver.resolve(&requirements).unwrap();
    assert_eq!(first, second);
}
