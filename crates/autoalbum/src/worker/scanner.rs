use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::DiscoveryConfig;
use crate::error::WorkerError;
use crate::worker::record::ImageRecord;

/// Lists candidate scans in the top level of a directory.
pub struct DirectoryScanner {
    input_directory: PathBuf,
    prefix: String,
    extensions: Vec<String>,
}

impl DirectoryScanner {
    /// Scanner with the default `img*.jpg` / `img*.jpeg` filter.
    pub fn new<P: AsRef<Path>>(input_directory: P) -> Self {
        Self::with_filter(input_directory, &DiscoveryConfig::default())
    }

    pub fn with_filter<P: AsRef<Path>>(input_directory: P, discovery: &DiscoveryConfig) -> Self {
        Self {
            input_directory: input_directory.as_ref().to_path_buf(),
            prefix: discovery.prefix.to_lowercase(),
            extensions: discovery
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn input_directory(&self) -> &Path {
        &self.input_directory
    }

    /// Case-insensitive prefix and extension check on a bare file name.
    pub fn matches(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        if !lower.starts_with(&self.prefix) {
            return false;
        }

        match Path::new(&lower).extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.iter().any(|allowed| allowed == ext),
            None => false,
        }
    }

    /// Returns one record per matching file, sorted by file name.
    pub fn scan(&self) -> Result<Vec<ImageRecord>, WorkerError> {
        if !self.input_directory.is_dir() {
            return Err(WorkerError::MissingDirectory(self.input_directory.clone()));
        }

        let mut records = Vec::new();

        for entry in WalkDir::new(&self.input_directory)
            .min_depth(1)
            .max_depth(1) // Only the top level; the archive may live below
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(WorkerError::ScanFailed {
                        path: self.input_directory.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                debug!("Skipping non UTF-8 file name: {}", path.display());
                continue;
            };

            if self.matches(name) {
                debug!("Found image: {}", path.display());
                records.push(ImageRecord::new(path.to_path_buf()));
            }
        }

        info!(
            "Scanned {} images in {}",
            records.len(),
            self.input_directory.display()
        );
        Ok(records)
    }
}
