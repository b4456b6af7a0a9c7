pub mod report;

use crate::engine::Context;
use crate::filter::PathFilter;
use eyre::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub use report::{FileReport, Outcome};

/// Runs a context over files on disk
pub struct Driver {
    context: Context,
    filter: PathFilter,
}

impl Driver {
    /// Create a new driver
    pub fn new(context: Context, filter: PathFilter) -> Self {
        Self { context, filter }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Transform a single file; read failures become a per-file outcome
    pub fn process_file<P: AsRef<Path>>(&self, file_path: P) -> FileReport {
        let file_path = file_path.as_ref();

        if !self.filter.matches(file_path) {
            debug!(file = %file_path.display(), "filtered out");
            return FileReport::new(file_path, Outcome::Skipped);
        }

        let bytes = match std::fs::read(file_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %file_path.display(), error = %e, "failed to read file");
                return FileReport::new(file_path, Outcome::Unreadable(e.to_string()));
            }
        };

        match String::from_utf8(bytes) {
            Ok(content) => self.process_content(file_path, &content),
            Err(_) => {
                debug!(file = %file_path.display(), "not UTF-8 text");
                FileReport::new(file_path, Outcome::Skipped)
            }
        }
    }

    /// Transform content with a given file path as its identity
    pub fn process_content<P: AsRef<Path>>(&self, file_path: P, content: &str) -> FileReport {
        let file_path = file_path.as_ref();
        let file_id = file_path.to_string_lossy();

        let outcome = match self.context.transform_with_report(content, &file_id) {
            Ok(Some(output)) => Outcome::Transformed(output),
            Ok(None) => Outcome::Unchanged,
            Err(e) => Outcome::Failed(e),
        };

        FileReport::new(file_path, outcome)
    }

    /// Collect candidate files from files and directories
    pub fn collect_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<PathBuf>> {
        let mut file_paths = Vec::new();

        for path in paths {
            let path = path.as_ref();

            if path.is_file() {
                file_paths.push(path.to_path_buf());
            } else if path.is_dir() {
                // Recursively find files in directory
                for entry in WalkDir::new(path)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                {
                    let file_path = entry.path();

                    // Directory walks only pick up matching files
                    if !self.filter.matches(file_path) {
                        continue;
                    }

                    file_paths.push(file_path.to_path_buf());
                }
            } else {
                return Err(eyre::eyre!("Path does not exist: {}", path.display()));
            }
        }

        Ok(file_paths)
    }

    /// Transform files and directories
    pub fn process_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<FileReport>> {
        let file_paths = self.collect_files(paths)?;
        Ok(self.process_files_parallel(&file_paths))
    }

    /// Transform multiple files in parallel; the context is shared read-only
    pub fn process_files_parallel(&self, file_paths: &[PathBuf]) -> Vec<FileReport> {
        file_paths.par_iter().map(|file_path| self.process_file(file_path)).collect()
    }
}
