//! Filesystem-based package scanning.
//!
//! A namespace path `a.b.c` maps to the physical directory
//! `<source_root>/a/b/c`. Each directory entry carrying the source
//! suffix is stripped to a short type name and resolved as
//! `a.b.c.<ShortName>` against a loader; resolved types are then
//! filtered on assignability to the requested base type.
//!
//! Setup failures (missing or unreadable directory) abort the scan call.
//! Everything that happens per entry is non-fatal and is surfaced as a
//! structured [`ScanItem`] so callers can tell skipped entries,
//! unresolvable names, and excluded types apart without a diagnostic
//! stream.

use std::any::TypeId;
use std::fs;
use std::io;
use std::path::{PathBuf, MAIN_SEPARATOR_STR};
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::registry::TypeLoader;

/// Default source root, relative to the process working directory.
pub const DEFAULT_SOURCE_ROOT: &str = "src";

/// Default source-file suffix.
pub const DEFAULT_SUFFIX: &str = ".rs";

/// Errors that abort a scan before any entry is visited.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The namespace directory does not exist.
    #[error("package path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// The namespace path exists but is not a directory.
    #[error("package path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The directory listing failed.
    #[error("package path is unreadable: {path}")]
    Unreadable {
        /// The directory that could not be listed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Scanner mapping namespace paths onto a source tree.
#[derive(Debug, Clone)]
pub struct PackageScanner {
    source_root: PathBuf,
    suffix: String,
}

impl Default for PackageScanner {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from(DEFAULT_SOURCE_ROOT),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl PackageScanner {
    /// Create a scanner over the given source root, recognizing the
    /// default source suffix.
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }

    /// Override the recognized source-file suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// The physical directory a namespace path maps to.
    pub fn package_dir(&self, namespace: &str) -> PathBuf {
        self.source_root
            .join(namespace.replace('.', MAIN_SEPARATOR_STR))
    }

    /// Scan a namespace for types assignable to `B`.
    ///
    /// The returned sequence is lazy: entries are resolved against the
    /// loader as the iterator advances. Handles are not retained by the
    /// scanner; every call re-resolves.
    pub fn scan<'a, B: ?Sized + 'static>(
        &self,
        loader: &'a dyn TypeLoader,
        namespace: &str,
    ) -> Result<Scan<'a>, ScanError> {
        self.scan_base(loader, namespace, TypeId::of::<B>())
    }

    /// Non-generic form of [`scan`](Self::scan), filtering on a base
    /// type id.
    pub fn scan_base<'a>(
        &self,
        loader: &'a dyn TypeLoader,
        namespace: &str,
        base: TypeId,
    ) -> Result<Scan<'a>, ScanError> {
        let dir = self.package_dir(namespace);

        if !dir.exists() {
            return Err(ScanError::PathNotFound(dir));
        }
        if !dir.is_dir() {
            return Err(ScanError::NotADirectory(dir));
        }

        let mut entries = Vec::new();
        let listing = fs::read_dir(&dir).map_err(|source| ScanError::Unreadable {
            path: dir.clone(),
            source,
        })?;
        for entry in listing {
            let entry = entry.map_err(|source| ScanError::Unreadable {
                path: dir.clone(),
                source,
            })?;
            entries.push(entry.file_name().to_string_lossy().into_owned());
        }

        Ok(Scan {
            loader,
            namespace: namespace.to_string(),
            suffix: self.suffix.clone(),
            base,
            entries: entries.into_iter(),
        })
    }
}

/// One per-entry outcome of a scan.
#[derive(Debug)]
pub enum ScanItem {
    /// The entry resolved to a type assignable to the requested base.
    Type(Arc<TypeDescriptor>),

    /// The entry does not carry the source suffix and was skipped.
    Skipped {
        /// The entry's file name.
        file_name: String,
    },

    /// The dotted name did not resolve against the loader.
    Unresolved {
        /// The fully-qualified name that failed to resolve.
        type_name: String,
    },

    /// The entry resolved to a type not assignable to the base.
    Excluded {
        /// The resolved type's fully-qualified name.
        type_name: String,
    },
}

/// Lazy sequence of per-entry scan outcomes.
pub struct Scan<'a> {
    loader: &'a dyn TypeLoader,
    namespace: String,
    suffix: String,
    base: TypeId,
    entries: std::vec::IntoIter<String>,
}

impl std::fmt::Debug for Scan<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scan")
            .field("namespace", &self.namespace)
            .field("suffix", &self.suffix)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl<'a> Scan<'a> {
    /// Adapt to just the matching type handles, dropping per-entry
    /// diagnostics.
    pub fn types(self) -> impl Iterator<Item = Arc<TypeDescriptor>> + 'a {
        self.filter_map(|item| match item {
            ScanItem::Type(ty) => Some(ty),
            _ => None,
        })
    }
}

impl Iterator for Scan<'_> {
    type Item = ScanItem;

    fn next(&mut self) -> Option<ScanItem> {
        let file_name = self.entries.next()?;

        let Some(short_name) = file_name.strip_suffix(self.suffix.as_str()) else {
            return Some(ScanItem::Skipped { file_name });
        };

        let type_name = format!("{}.{}", self.namespace, short_name);
        match self.loader.resolve(&type_name) {
            None => Some(ScanItem::Unresolved { type_name }),
            Some(ty) if ty.is_assignable_to_id(self.base) => Some(ScanItem::Type(ty)),
            Some(_) => Some(ScanItem::Excluded { type_name }),
        }
    }
}
