use crate::model::RunFile;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// File extension of the run logs written by the simulator
pub const RUN_LOG_EXTENSION: &str = "csv";

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Results directory does not exist or is not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },
    #[error("Failed to list results directory {}", .path.display())]
    Unlistable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Find the run logs directly inside `dir`.
///
/// Only regular files (or links to them) with the given extension are returned. Sub-directories
/// are not searched and hidden files are ignored. The result is sorted by file name so that the
/// report order is stable for a given directory.
///
/// A missing directory is an error rather than an empty result, a typo in the path should not
/// look like a directory without any runs.
pub fn discover_run_files(dir: &Path, extension: &str) -> Result<Vec<RunFile>, DiscoveryError> {
    if !dir.is_dir() {
        return Err(DiscoveryError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut run_files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            // An entry that cannot be inspected, such as a dangling link, is still a run log
            // candidate. Loading it fails and is reported with the rest of the batch.
            Err(e) if e.depth() > 0 => {
                match e.path() {
                    Some(path) if is_candidate(path, extension) => {
                        log::warn!("Cannot inspect {}: {e}", path.display());
                        run_files.push(RunFile::new(path));
                    }
                    _ => log::warn!("Ignoring unreadable entry in {}: {e}", dir.display()),
                }
                continue;
            }
            Err(source) => {
                return Err(DiscoveryError::Unlistable {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if !is_candidate(entry.path(), extension) {
            log::debug!("Ignoring {}", entry.path().display());
            continue;
        }

        log::debug!("Discovered run log {}", entry.path().display());
        run_files.push(RunFile::new(entry.into_path()));
    }

    Ok(run_files)
}

fn is_candidate(path: &Path, extension: &str) -> bool {
    let hidden = path.file_name().map(is_hidden).unwrap_or(true);
    !hidden && path.extension() == Some(OsStr::new(extension))
}

fn is_hidden(file_name: &OsStr) -> bool {
    file_name
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
