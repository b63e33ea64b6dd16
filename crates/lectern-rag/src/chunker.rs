//! Fixed-size character chunking with overlap

use std::iter;

use lectern_core::{validate_chunking, Chunk, PipelineConfig, Result};

/// Splits text into windows of at most `chunk_size` characters
///
/// Consecutive windows share exactly `chunk_overlap` characters; only the
/// last window may be shorter.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Create a chunker, rejecting size 0 and overlap >= size
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_chunking(chunk_size, chunk_overlap)?;
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split text into overlapping chunks
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        // Byte offset of every char boundary, including the end of the text.
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(iter::once(text.len()))
            .collect();
        let char_count = offsets.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            chunks.push(Chunk {
                index: chunks.len(),
                text: text[offsets[start]..offsets[end]].to_string(),
                start,
                end,
            });

            if end >= char_count {
                break;
            }

            start = end - self.chunk_overlap;
        }

        chunks
    }
}

/// Chunk text in one call
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Result<Vec<Chunk>> {
    Ok(TextChunker::new(chunk_size, chunk_overlap)?.chunk(text))
}

/// Rebuild the source text by dropping each chunk's overlap with its predecessor
pub fn reassemble(chunks: &[Chunk]) -> String {
    let mut text = String::new();
    let mut covered: usize = 0;

    for chunk in chunks {
        let skip = covered.saturating_sub(chunk.start);
        text.extend(chunk.text.chars().skip(skip));
        covered = chunk.end;
    }

    text
}
