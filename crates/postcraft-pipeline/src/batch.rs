//! Overlapping batch splitter for content too long for a single model call.

use serde::Serialize;
use thiserror::Error;

/// Splitter settings. Sizes are in characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub chunk_size: usize,
    pub overlap: usize,
    pub max_batches: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            chunk_size: 8000,
            overlap: 500,
            max_batches: 10,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("invalid batch options: {0}")]
    InvalidOptions(String),
}

/// One slice of the source text. `start_char..end_char` is a half-open char range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    pub index: usize,
    pub content: String,
    pub start_char: usize,
    pub end_char: usize,
    pub has_overlap: bool,
}

impl BatchOptions {
    fn validate(&self) -> Result<(), BatchError> {
        if self.chunk_size == 0 {
            return Err(BatchError::InvalidOptions(
                "chunk_size must be positive".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(BatchError::InvalidOptions(format!(
                "overlap {} must be smaller than chunk_size {}",
                self.overlap, self.chunk_size
            )));
        }
        if self.max_batches == 0 {
            return Err(BatchError::InvalidOptions(
                "max_batches must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `content` is long enough to need splitting.
    #[must_use]
    pub fn needs_split(&self, content: &str) -> bool {
        content.chars().count() > self.chunk_size
    }
}

/// Partition `content` into overlapping batches.
///
/// Content no longer than `chunk_size` is one batch spanning all of it.
/// Otherwise the stride is `chunk_size - overlap`; batch `i` sits at
/// `position = i * stride` and spans `[position - overlap, min(len, position + stride))`,
/// the first batch starting at 0. At most `max_batches` are produced; any text
/// past the last batch is dropped.
///
/// # Errors
///
/// Returns [`BatchError::InvalidOptions`] when `overlap >= chunk_size` or a size is zero.
pub fn split_content_into_batches(
    content: &str,
    options: &BatchOptions,
) -> Result<Vec<Batch>, BatchError> {
    options.validate()?;

    // Byte offset of every char boundary, plus the end of the string.
    let boundaries: Vec<usize> = content
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(content.len()))
        .collect();
    let len = boundaries.len() - 1;

    if len <= options.chunk_size {
        return Ok(vec![Batch {
            index: 0,
            content: content.to_string(),
            start_char: 0,
            end_char: len,
            has_overlap: false,
        }]);
    }

    let stride = options.chunk_size - options.overlap;
    let wanted = len.div_ceil(stride);
    let count = wanted.min(options.max_batches);

    let batches: Vec<Batch> = (0..count)
        .map(|index| {
            let position = index * stride;
            let start_char = if index == 0 {
                0
            } else {
                position - options.overlap
            };
            let end_char = len.min(position + stride);
            Batch {
                index,
                content: content[boundaries[start_char]..boundaries[end_char]].to_string(),
                start_char,
                end_char,
                has_overlap: index > 0,
            }
        })
        .collect();

    if wanted > count {
        let covered = batches.last().map_or(0, |b| b.end_char);
        tracing::warn!(
            total_chars = len,
            covered_chars = covered,
            max_batches = options.max_batches,
            "content exceeds batch cap; trailing text dropped"
        );
    }

    Ok(batches)
}
