//! File change trigger source
//!
//! Watches the parent directory of every declared file, non-recursively, so
//! that editors which save by writing a new file and renaming it over the
//! old one are still seen. Events for other files in those directories are
//! dropped.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::core::session::SessionSender;
use crate::error::RestyleError;

/// Declared watch files resolved against the filesystem
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WatchTargets {
    /// Absolute path under a canonical directory, mapped to the declared path
    pub files: HashMap<PathBuf, PathBuf>,
    /// Directories to watch
    pub dirs: BTreeSet<PathBuf>,
    /// Declared files whose directory does not exist
    pub unresolved: Vec<PathBuf>,
}

impl WatchTargets {
    /// Resolve declared files relative to `project_dir`
    pub fn resolve(project_dir: &Path, declared: &[PathBuf]) -> Self {
        let mut targets = Self::default();

        for file in declared {
            let absolute = project_dir.join(file);
            let resolved = absolute
                .parent()
                .zip(absolute.file_name())
                .and_then(|(dir, name)| dir.canonicalize().ok().map(|dir| (dir, name)));

            match resolved {
                Some((dir, name)) => {
                    targets.files.insert(dir.join(name), file.clone());
                    targets.dirs.insert(dir);
                }
                None => targets.unresolved.push(file.clone()),
            }
        }

        targets
    }

    /// Declared path for an event path, if it is a watched file
    pub fn declared(&self, path: &Path) -> Option<&PathBuf> {
        self.files.get(path)
    }
}

/// Whether an event kind can change file contents
pub fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    )
}

/// Active watch; dropping it stops watching
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    dirs: Vec<PathBuf>,
}

impl FileWatcher {
    /// Start watching and send changes of declared files to `sender`
    pub fn start(
        project_dir: &Path,
        declared: &[PathBuf],
        sender: SessionSender,
    ) -> Result<Self, RestyleError> {
        let targets = WatchTargets::resolve(project_dir, declared);

        for missing in &targets.unresolved {
            tracing::warn!(
                "Not watching {}: its directory does not exist",
                missing.display()
            );
        }
        if targets.dirs.is_empty() {
            return Err(RestyleError::Watch(
                "none of the watch files are in an existing directory".to_string(),
            ));
        }

        let dirs: Vec<PathBuf> = targets.dirs.iter().cloned().collect();
        let handler = move |res: Result<Event, notify::Error>| match res {
            Ok(event) if is_relevant(&event.kind) => {
                for path in &event.paths {
                    if let Some(declared) = targets.declared(path) {
                        sender.file_changed(declared.clone());
                    }
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("File watch error: {e}"),
        };

        let mut watcher = RecommendedWatcher::new(handler, Config::default())
            .map_err(|e| RestyleError::Watch(e.to_string()))?;

        for dir in &dirs {
            watcher
                .watch(dir, RecursiveMode::NonRecursive)
                .map_err(|e| RestyleError::Watch(format!("{}: {e}", dir.display())))?;
            tracing::debug!("Watching {}", dir.display());
        }

        Ok(Self {
            _watcher: watcher,
            dirs,
        })
    }

    /// Watched directories
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}
