//! The instance pipeline: scan, construct, hand off.
//!
//! Composes the package scanner with the instantiator and a
//! caller-supplied consumer. Setup failures (a bad namespace path) abort
//! the call; per-item failures are recorded in the returned
//! [`PipelineReport`] and the pipeline continues over the remaining
//! entries, so callers can always tell "zero matches" from "zero
//! successes among many candidates".

use speculo_core::ArgVec;

use crate::construct::{construct, ConstructError};
use crate::instance::Instance;
use crate::registry::{global, TypeLoader};
use crate::scan::{PackageScanner, ScanError, ScanItem};

/// Outcome of one directory entry in a pipeline run.
#[derive(Debug)]
pub struct ItemOutcome {
    /// The entry: a fully-qualified type name, or the raw file name for
    /// entries skipped before name resolution.
    pub entry: String,
    /// What became of the entry.
    pub status: ItemStatus,
}

/// Per-entry status of a pipeline run.
#[derive(Debug)]
pub enum ItemStatus {
    /// An instance was constructed and handed to the consumer.
    Constructed,
    /// The entry did not carry the source suffix.
    SkippedNonSource,
    /// The dotted name did not resolve against the loader.
    ResolutionFailed,
    /// The type resolved but is not assignable to the base type.
    Excluded,
    /// Construction failed; the instance is absent from the results.
    ConstructionFailed(ConstructError),
}

/// Structured per-item results of a pipeline run.
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// One outcome per directory entry, in scan order.
    pub items: Vec<ItemOutcome>,
}

impl PipelineReport {
    /// Number of instances constructed.
    pub fn constructed(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.status, ItemStatus::Constructed))
            .count()
    }

    /// Outcomes for entries whose construction failed.
    pub fn failures(&self) -> Vec<&ItemOutcome> {
        self.items
            .iter()
            .filter(|i| matches!(i.status, ItemStatus::ConstructionFailed(_)))
            .collect()
    }

    /// Whether every resolved, assignable candidate was constructed.
    pub fn is_clean(&self) -> bool {
        self.failures().is_empty()
    }
}

/// Discover, construct, and hand off every matching instance in a
/// namespace.
///
/// Each candidate assignable to `B` is constructed with the shared
/// argument vector; successful instances go to `consumer` in scan order.
pub fn for_each_instance<B: ?Sized + 'static>(
    scanner: &PackageScanner,
    loader: &dyn TypeLoader,
    namespace: &str,
    args: &ArgVec,
    mut consumer: impl FnMut(Instance),
) -> Result<PipelineReport, ScanError> {
    let scan = scanner.scan::<B>(loader, namespace)?;
    let mut report = PipelineReport::default();

    for item in scan {
        let outcome = match item {
            ScanItem::Type(ty) => match construct(&ty, args) {
                Ok(instance) => {
                    consumer(instance);
                    ItemOutcome {
                        entry: ty.name().to_string(),
                        status: ItemStatus::Constructed,
                    }
                }
                Err(e) => ItemOutcome {
                    entry: ty.name().to_string(),
                    status: ItemStatus::ConstructionFailed(e),
                },
            },
            ScanItem::Skipped { file_name } => ItemOutcome {
                entry: file_name,
                status: ItemStatus::SkippedNonSource,
            },
            ScanItem::Unresolved { type_name } => ItemOutcome {
                entry: type_name,
                status: ItemStatus::ResolutionFailed,
            },
            ScanItem::Excluded { type_name } => ItemOutcome {
                entry: type_name,
                status: ItemStatus::Excluded,
            },
        };
        report.items.push(outcome);
    }

    Ok(report)
}

/// Discover and construct every matching instance, collecting them as
/// boxed base-type values in scan order.
pub fn collect_instances<B: ?Sized + 'static>(
    scanner: &PackageScanner,
    loader: &dyn TypeLoader,
    namespace: &str,
    args: &ArgVec,
) -> Result<(Vec<Box<B>>, PipelineReport), ScanError> {
    let mut instances = Vec::new();
    let report = for_each_instance::<B>(scanner, loader, namespace, args, |instance| {
        // The scan only yields types bound to B, so the cast holds.
        if let Ok(boxed) = instance.into_base::<B>() {
            instances.push(boxed);
        }
    })?;
    Ok((instances, report))
}

/// Discover and construct every matching instance purely for the side
/// effects of construction.
pub fn create_instances<B: ?Sized + 'static>(
    scanner: &PackageScanner,
    loader: &dyn TypeLoader,
    namespace: &str,
    args: &ArgVec,
) -> Result<PipelineReport, ScanError> {
    for_each_instance::<B>(scanner, loader, namespace, args, |_| {})
}

/// [`for_each_instance`] against the global registry and default scanner.
pub fn for_each_instance_global<B: ?Sized + 'static>(
    namespace: &str,
    args: &ArgVec,
    consumer: impl FnMut(Instance),
) -> Result<PipelineReport, ScanError> {
    for_each_instance::<B>(&PackageScanner::default(), global(), namespace, args, consumer)
}

/// [`collect_instances`] against the global registry and default scanner.
pub fn collect_instances_global<B: ?Sized + 'static>(
    namespace: &str,
    args: &ArgVec,
) -> Result<(Vec<Box<B>>, PipelineReport), ScanError> {
    collect_instances::<B>(&PackageScanner::default(), global(), namespace, args)
}

/// [`create_instances`] against the global registry and default scanner.
pub fn create_instances_global<B: ?Sized + 'static>(
    namespace: &str,
    args: &ArgVec,
) -> Result<PipelineReport, ScanError> {
    create_instances::<B>(&PackageScanner::default(), global(), namespace, args)
}
