//! Collects a local metadata tree into an in-memory file set

use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::error::{DeployError, Result};

/// Name of the manifest that must sit at the root of every deployment
pub const MANIFEST_FILE: &str = "package.xml";

/// macOS Finder artifact that never belongs in a deployment
const IGNORED_FILE: &str = ".DS_Store";

/// Relative path (forward slashes) to raw file contents
///
/// Keys are kept sorted so the archive built from a set is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: BTreeMap<String, Vec<u8>>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file under a root-relative key.
    ///
    /// On Windows backslashes are normalized to `/`; elsewhere a backslash
    /// is an ordinary file name character. Keys that try to leave the root
    /// (`..`, absolute paths, empty) are rejected.
    pub fn insert(&mut self, path: &str, contents: Vec<u8>) -> Result<()> {
        let key = if cfg!(windows) {
            path.replace('\\', "/")
        } else {
            path.to_string()
        };
        let escapes = key.is_empty()
            || key.starts_with('/')
            || key.split('/').any(|segment| segment == ".." || segment.is_empty());
        if escapes {
            return Err(DeployError::Config(format!(
                "'{}' is not a path relative to the deployment root",
                path
            )));
        }
        self.files.insert(key, contents);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn has_manifest(&self) -> bool {
        self.contains(MANIFEST_FILE)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Total number of content bytes across all files
    pub fn total_bytes(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}

/// Resolve the user supplied directory into an absolute root.
///
/// A leading `~` is expanded with `home`; without a home directory that is a
/// configuration error and nothing on disk is touched. Relative paths are
/// joined to `cwd`, absolute ones are returned as given. `.` components are
/// dropped so `-d .` resolves to `cwd` itself.
pub fn resolve_root(input: &str, home: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    let expanded = if let Some(rest) = input.strip_prefix('~') {
        let home = home.ok_or_else(|| {
            DeployError::Config(
                "Cannot determine tilde expansion, please use relative or absolute path to directory."
                    .to_string(),
            )
        })?;
        PathBuf::from(format!("{}{}", home.display(), rest))
    } else {
        PathBuf::from(input)
    };

    let root = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };

    Ok(root
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect())
}

/// Walks a deployment root into a [`FileSet`]
#[derive(Debug, Clone)]
pub struct Collector<'a> {
    root: &'a Path,
    excluded: Vec<PathBuf>,
}

impl<'a> Collector<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self {
            root,
            excluded: Vec::new(),
        }
    }

    /// Never collect `path`, even when it lies under the root
    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded.push(path.into());
        self
    }

    pub fn excluding<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.excluded.extend(paths);
        self
    }

    /// Walk the root and read every regular file.
    ///
    /// Fails with [`DeployError::NotFound`] unless `package.xml` is a regular
    /// file directly under the root. Symlinks, directories and other
    /// irregular entries are skipped. The first walk or read error aborts
    /// the whole collection.
    pub fn collect(&self) -> Result<FileSet> {
        self.collect_with(|path| fs::read(path))
    }

    fn collect_with<R>(&self, read: R) -> Result<FileSet>
    where
        R: Fn(&Path) -> io::Result<Vec<u8>>,
    {
        let root = self.root;
        let manifest = root.join(MANIFEST_FILE);
        let manifest_is_file = fs::symlink_metadata(&manifest)
            .map(|meta| meta.file_type().is_file())
            .unwrap_or(false);
        if !manifest_is_file {
            return Err(DeployError::NotFound { path: manifest });
        }

        let excluded: Vec<PathBuf> = self
            .excluded
            .iter()
            .filter_map(|path| path.canonicalize().ok())
            .collect();

        let mut files = FileSet::new();
        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| DeployError::FileSystem {
                path: e.path().unwrap_or(root).to_path_buf(),
                source: e.into(),
            })?;

            if !entry.file_type().is_file() || entry.file_name() == IGNORED_FILE {
                continue;
            }

            let path = entry.path();
            if !excluded.is_empty()
                && path
                    .canonicalize()
                    .is_ok_and(|canonical| excluded.contains(&canonical))
            {
                debug!("Skipping excluded {}", path.display());
                continue;
            }

            let contents = read(path).map_err(|source| DeployError::FileSystem {
                path: path.to_path_buf(),
                source,
            })?;

            let key = relative_key(root, path)?;
            debug!("Collected {} ({} bytes)", key, contents.len());
            files.insert(&key, contents)?;
        }

        if !files.has_manifest() {
            return Err(DeployError::NotFound { path: manifest });
        }

        info!(
            "Collected {} files ({} bytes) from {}",
            files.len(),
            files.total_bytes(),
            root.display()
        );
        Ok(files)
    }
}

/// Walk `root` and read every regular file into a [`FileSet`]
pub fn collect(root: &Path) -> Result<FileSet> {
    Collector::new(root).collect()
}

fn relative_key(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        DeployError::Config(format!(
            "{} is outside of {}",
            path.display(),
            root.display()
        ))
    })?;

    let segments = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_str().map(str::to_owned).ok_or_else(
                || DeployError::FileSystem {
                    path: path.to_path_buf(),
                    source: io::Error::new(
                        io::ErrorKind::InvalidData,
                        "file name is not valid UTF-8",
                    ),
                },
            )),
            _ => None,
        })
        .collect::<Result<Vec<String>>>()?;
    Ok(segments.join("/"))
}
