//! Flat-file review store.
//!
//! The store parses a plain text file where each line has the form
//! `<RestaurantName>.<ReviewText>`; only the FIRST `.` is a delimiter,
//! the review text may contain periods of its own. Restaurant names are
//! normalized into restaurant keys at build time (see [`crate::normalize`]),
//! and each key maps to the reviews in file order.
//!
//! The store is built once and read-only afterwards; it may be shared
//! freely across concurrent readers without synchronization.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::normalize::restaurant_key;

/// Errors from building or querying the review store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("review data file not found: {}", path.display())]
    DataFileNotFound { path: PathBuf },

    #[error("failed to read review data: {0}")]
    Io(#[from] io::Error),

    #[error("no reviews found for restaurant '{name}'")]
    RestaurantNotFound { name: String },
}

/// In-memory mapping from restaurant key to its reviews.
///
/// Invariant: every key present maps to a non-empty, file-ordered
/// sequence of reviews.
#[derive(Debug, Clone, Default)]
pub struct ReviewStore {
    reviews: HashMap<String, Vec<String>>,
    skipped_lines: usize,
}

impl ReviewStore {
    /// Build a store from a review data file.
    ///
    /// A missing file fails with [`StoreError::DataFileNotFound`]; no
    /// partial store is ever returned.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::DataFileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                StoreError::Io(e)
            }
        })?;

        let store = Self::from_reader(BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            restaurants = store.restaurant_count(),
            reviews = store.review_count(),
            skipped = store.skipped_lines,
            "review store loaded"
        );
        Ok(store)
    }

    /// Build a store from any buffered reader.
    ///
    /// Lines without a `.` delimiter cannot be split into a name and a
    /// review body. Blank lines are skipped silently; other malformed
    /// lines are skipped with a warning and counted in
    /// [`skipped_lines`](Self::skipped_lines) rather than failing the
    /// whole load.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, StoreError> {
        let mut store = Self::default();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match line.split_once('.') {
                Some((raw_name, review)) => {
                    store
                        .reviews
                        .entry(restaurant_key(raw_name))
                        .or_default()
                        .push(review.trim().to_string());
                }
                None => {
                    store.skipped_lines += 1;
                    tracing::warn!(
                        line = idx + 1,
                        "skipping malformed review line: no '.' delimiter"
                    );
                }
            }
        }

        Ok(store)
    }

    /// Look up the reviews for a restaurant key.
    ///
    /// The key must already be normalized by the caller (the same
    /// [`restaurant_key`] function used at build time). An unknown key is
    /// an error, never an empty slice, so callers can report "restaurant
    /// not found" distinctly.
    pub fn reviews(&self, key: &str) -> Result<&[String], StoreError> {
        self.reviews
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| StoreError::RestaurantNotFound {
                name: key.to_string(),
            })
    }

    /// Whether a restaurant key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.reviews.contains_key(key)
    }

    /// Iterate over the restaurant keys in the store.
    pub fn restaurants(&self) -> impl Iterator<Item = &str> {
        self.reviews.keys().map(String::as_str)
    }

    /// Number of distinct restaurants.
    pub fn restaurant_count(&self) -> usize {
        self.reviews.len()
    }

    /// Total number of reviews across all restaurants.
    pub fn review_count(&self) -> usize {
        self.reviews.values().map(Vec::len).sum()
    }

    /// Number of non-blank lines skipped as malformed during the build.
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }
}
