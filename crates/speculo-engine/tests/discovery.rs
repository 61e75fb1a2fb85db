//! End-to-end discovery pipeline tests: registration, filesystem
//! scanning, argument-driven construction, and per-item reporting.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use speculo_engine::{
    collect_instances, create_instances, for_each_instance, ArgVec, ItemStatus, PackageScanner,
    ScanError, TypeBuilder, TypeRegistry,
};

trait Service: Send {
    fn name(&self) -> &'static str;
}

struct Relay {
    channel: i32,
}

impl Service for Relay {
    fn name(&self) -> &'static str {
        "relay"
    }
}

struct Mixer;

impl Service for Mixer {
    fn name(&self) -> &'static str {
        "mixer"
    }
}

struct Flaky;

impl Service for Flaky {
    fn name(&self) -> &'static str {
        "flaky"
    }
}

#[derive(Debug, thiserror::Error)]
#[error("flaky refused to start")]
struct StartRefused;

static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

fn service_registry() -> TypeRegistry {
    let registry = TypeRegistry::new();
    registry.register(
        TypeBuilder::<Relay>::new("app.services.Relay")
            .constructor(|(channel,): (i32,)| {
                CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
                Relay { channel }
            })
            .implements::<dyn Service>(|s| s as Box<dyn Service>),
    );
    registry.register(
        TypeBuilder::<Mixer>::new("app.services.Mixer")
            .constructor(|(_channel,): (i32,)| {
                CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
                Mixer
            })
            .implements::<dyn Service>(|s| s as Box<dyn Service>),
    );
    registry.register(
        TypeBuilder::<Flaky>::new("app.services.Flaky")
            .fallible_constructor(|(_channel,): (i32,)| Err::<Flaky, _>(StartRefused))
            .implements::<dyn Service>(|s| s as Box<dyn Service>),
    );
    registry
}

fn write_package(root: &Path, files: &[&str]) {
    let dir = root.join("app").join("services");
    fs::create_dir_all(&dir).unwrap();
    for file in files {
        fs::write(dir.join(file), "").unwrap();
    }
}

#[test]
fn test_collect_instances_yields_constructed_services() {
    let registry = service_registry();
    let temp = tempfile::tempdir().unwrap();
    write_package(temp.path(), &["Relay.rs", "Mixer.rs", "NOTES.txt"]);
    let scanner = PackageScanner::new(temp.path());

    let args = ArgVec::new().with(7i32);
    let (services, report) =
        collect_instances::<dyn Service>(&scanner, &registry, "app.services", &args).unwrap();

    let mut names: Vec<&str> = services.iter().map(|s| s.name()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["mixer", "relay"]);

    assert_eq!(report.constructed(), 2);
    assert!(report.is_clean());
    assert!(report
        .items
        .iter()
        .any(|i| i.entry == "NOTES.txt" && matches!(i.status, ItemStatus::SkippedNonSource)));
}

#[test]
fn test_constructor_arguments_reach_each_instance() {
    let registry = service_registry();
    let temp = tempfile::tempdir().unwrap();
    write_package(temp.path(), &["Relay.rs"]);
    let scanner = PackageScanner::new(temp.path());

    let args = ArgVec::new().with(42i32);
    let mut channels = Vec::new();
    for_each_instance::<dyn Service>(&scanner, &registry, "app.services", &args, |instance| {
        channels.push(instance.downcast_ref::<Relay>().unwrap().channel);
    })
    .unwrap();

    assert_eq!(channels, vec![42]);
}

#[test]
fn test_failing_candidate_does_not_abort_the_rest() {
    let registry = service_registry();
    let temp = tempfile::tempdir().unwrap();
    write_package(temp.path(), &["Flaky.rs", "Mixer.rs", "Relay.rs"]);
    let scanner = PackageScanner::new(temp.path());

    let args = ArgVec::new().with(1i32);
    let (services, report) =
        collect_instances::<dyn Service>(&scanner, &registry, "app.services", &args).unwrap();

    let mut names: Vec<&str> = services.iter().map(|s| s.name()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["mixer", "relay"]);

    assert!(!report.is_clean());
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].entry, "app.services.Flaky");
}

#[test]
fn test_mismatched_arguments_fail_every_candidate() {
    let registry = service_registry();
    let temp = tempfile::tempdir().unwrap();
    write_package(temp.path(), &["Relay.rs", "Mixer.rs"]);
    let scanner = PackageScanner::new(temp.path());

    // Constructors declare (i32,); a String argument matches nothing,
    // but the report still tells candidates apart from an empty scan.
    let args = ArgVec::new().with("seven".to_string());
    let (services, report) =
        collect_instances::<dyn Service>(&scanner, &registry, "app.services", &args).unwrap();

    assert!(services.is_empty());
    assert_eq!(report.items.len(), 2);
    assert_eq!(report.failures().len(), 2);
}

#[test]
fn test_create_instances_runs_construction_side_effects() {
    let registry = service_registry();
    let temp = tempfile::tempdir().unwrap();
    write_package(temp.path(), &["Relay.rs", "Mixer.rs"]);
    let scanner = PackageScanner::new(temp.path());

    let before = CONSTRUCTED.load(Ordering::SeqCst);
    let args = ArgVec::new().with(3i32);
    let report =
        create_instances::<dyn Service>(&scanner, &registry, "app.services", &args).unwrap();

    assert_eq!(report.constructed(), 2);
    assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), before + 2);
}

#[test]
fn test_unregistered_source_entry_is_reported_not_fatal() {
    let registry = service_registry();
    let temp = tempfile::tempdir().unwrap();
    write_package(temp.path(), &["Relay.rs", "Orphan.rs"]);
    let scanner = PackageScanner::new(temp.path());

    let args = ArgVec::new().with(5i32);
    let report =
        create_instances::<dyn Service>(&scanner, &registry, "app.services", &args).unwrap();

    assert_eq!(report.constructed(), 1);
    assert!(report
        .items
        .iter()
        .any(|i| i.entry == "app.services.Orphan"
            && matches!(i.status, ItemStatus::ResolutionFailed)));
}

#[test]
fn test_missing_namespace_is_fatal() {
    let registry = service_registry();
    let temp = tempfile::tempdir().unwrap();
    let scanner = PackageScanner::new(temp.path());

    let err = create_instances::<dyn Service>(
        &scanner,
        &registry,
        "app.nowhere",
        &ArgVec::new().with(1i32),
    )
    .unwrap_err();
    assert!(matches!(err, ScanError::PathNotFound(_)));
}

#[test]
fn test_collect_with_concrete_base_type() {
    let registry = service_registry();
    let temp = tempfile::tempdir().unwrap();
    write_package(temp.path(), &["Relay.rs", "Mixer.rs"]);
    let scanner = PackageScanner::new(temp.path());

    // Filtering on the concrete type uses the identity binding; Mixer is
    // excluded even though it shares the namespace.
    let args = ArgVec::new().with(9i32);
    let (relays, report) =
        collect_instances::<Relay>(&scanner, &registry, "app.services", &args).unwrap();

    assert_eq!(relays.len(), 1);
    assert_eq!(relays[0].channel, 9);
    assert!(report
        .items
        .iter()
        .any(|i| i.entry == "app.services.Mixer" && matches!(i.status, ItemStatus::Excluded)));
}

#[test]
fn test_shared_loader_across_threads() {
    let registry = Arc::new(service_registry());
    let temp = tempfile::tempdir().unwrap();
    write_package(temp.path(), &["Relay.rs", "Mixer.rs"]);
    let scanner = PackageScanner::new(temp.path());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = registry.clone();
            let scanner = scanner.clone();
            std::thread::spawn(move || {
                let args = ArgVec::new().with(i as i32);
                let (services, report) =
                    collect_instances::<dyn Service>(&scanner, &*registry, "app.services", &args)
                        .unwrap();
                assert_eq!(services.len(), 2);
                assert!(report.is_clean());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
