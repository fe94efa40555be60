//! Lazy source of raw game documents from a directory.

use serde_json::Value as JsonValue;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Single-pass iterator over the `*.json` files of a directory.
///
/// Files are read and decoded one at a time as the iterator advances. Files
/// that cannot be read or are not valid JSON are logged and skipped.
///
/// # Example
/// ```ignore
/// use cs2_game_parser::GameExtractor;
///
/// for game in GameExtractor::open("games_raw")? {
///     println!("{}", game["id"]);
/// }
/// ```
#[derive(Debug)]
pub struct GameExtractor {
    dir: PathBuf,
    entries: fs::ReadDir,
    /// Next file to decode, found while probing the directory
    pending: Option<PathBuf>,
    decoded: usize,
}

impl GameExtractor {
    /// Open `dir` for extraction.
    ///
    /// # Errors
    /// Returns [`PipelineError::NoInput`] when the directory is missing or
    /// holds no `*.json` file.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, PipelineError> {
        let dir = dir.as_ref().to_path_buf();

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PipelineError::NoInput { dir });
            }
            Err(e) => return Err(PipelineError::io(dir, e)),
        };

        let mut extractor = Self {
            dir,
            entries,
            pending: None,
            decoded: 0,
        };

        extractor.pending = extractor.next_json_path();
        if extractor.pending.is_none() {
            return Err(PipelineError::NoInput { dir: extractor.dir });
        }

        Ok(extractor)
    }

    /// Directory being read
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of documents successfully decoded so far
    pub fn documents_read(&self) -> usize {
        self.decoded
    }

    fn next_json_path(&mut self) -> Option<PathBuf> {
        for entry in self.entries.by_ref() {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if is_json_file(&path) {
                        return Some(path);
                    }
                }
                Err(e) => tracing::warn!("Skipping entry in {}: {}", self.dir.display(), e),
            }
        }
        None
    }
}

impl Iterator for GameExtractor {
    type Item = JsonValue;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let path = match self.pending.take() {
                Some(path) => path,
                None => self.next_json_path()?,
            };

            match read_document(&path) {
                Ok(document) => {
                    self.decoded += 1;
                    return Some(document);
                }
                Err(e) => tracing::warn!("Skipping {}: {}", file_name(&path), e),
            }
        }
    }
}

fn is_json_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_document(path: &Path) -> Result<JsonValue, PipelineError> {
    let contents = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| PipelineError::json(path, e))
}
