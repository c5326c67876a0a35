//! Filing classified bills into the archive.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::ArchiveError;
use crate::placement::Placement;

/// How the archiver treats the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveOptions {
    /// Report intended actions without touching anything.
    pub dry_run: bool,
    /// Replace a bill already present at the destination.
    pub overwrite: bool,
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    /// The document was moved to the destination.
    Moved(PathBuf),
    /// Dry run: the document would be moved to the destination.
    WouldMove(PathBuf),
    /// A file already occupies the destination and overwrite is off.
    SkippedExisting(PathBuf),
}

impl FileAction {
    pub fn destination(&self) -> &Path {
        match self {
            FileAction::Moved(p) | FileAction::WouldMove(p) | FileAction::SkippedExisting(p) => p,
        }
    }
}

/// Moves documents to their placements, creating directories on demand.
#[derive(Debug, Default)]
pub struct Archiver {
    options: ArchiveOptions,
    /// Directories a dry run has already announced.
    planned_dirs: HashSet<PathBuf>,
    /// Destinations a dry run has already claimed.
    planned_files: HashSet<PathBuf>,
}

impl Archiver {
    pub fn new(options: ArchiveOptions) -> Self {
        Self {
            options,
            planned_dirs: HashSet::new(),
            planned_files: HashSet::new(),
        }
    }

    /// File `source` at `placement`.
    pub fn file(
        &mut self,
        source: &Path,
        placement: &Placement,
    ) -> Result<FileAction, ArchiveError> {
        self.ensure_directory(&placement.directory)?;

        let destination = placement.path();
        // A dry run never creates the file, so earlier claims stand in for it.
        let occupied = destination.exists()
            || (self.options.dry_run && self.planned_files.contains(&destination));
        if occupied && !self.options.overwrite {
            warn!(
                "'{}': destination '{}' exists, skipping",
                source.display(),
                destination.display()
            );
            return Ok(FileAction::SkippedExisting(destination));
        }

        if self.options.dry_run {
            info!(
                "WILL MOVE '{}'  ->  '{}'",
                source.display(),
                destination.display()
            );
            self.planned_files.insert(destination.clone());
            return Ok(FileAction::WouldMove(destination));
        }

        info!("moving '{}'  ->  '{}'", source.display(), destination.display());
        move_file(source, &destination)?;
        Ok(FileAction::Moved(destination))
    }

    fn ensure_directory(&mut self, directory: &Path) -> Result<(), ArchiveError> {
        if directory.exists() {
            if !directory.is_dir() {
                return Err(ArchiveError::NotADirectory(directory.to_path_buf()));
            }
            return Ok(());
        }

        if self.options.dry_run {
            if self.planned_dirs.insert(directory.to_path_buf()) {
                info!("WILL MKDIR '{}'", directory.display());
            }
            return Ok(());
        }

        fs::create_dir_all(directory).map_err(|source| ArchiveError::Io {
            path: directory.to_path_buf(),
            source,
        })
    }
}

/// Rename, or copy and remove when source and destination are on
/// different filesystems.
fn move_file(source: &Path, destination: &Path) -> Result<(), ArchiveError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| ArchiveError::Io { path, source }
    };

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(source, destination).map_err(io_err(destination))?;
            fs::remove_file(source).map_err(io_err(source))?;
            Ok(())
        }
        Err(e) => Err(io_err(source)(e)),
    }
}
