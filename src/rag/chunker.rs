//! Word-count chunking of extracted document text.

/// Default number of words per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 300;

/// Splits text into fixed-size runs of whitespace-delimited words.
///
/// Chunks are re-joined with single spaces, so the original whitespace and
/// layout of the document are not preserved. A word is never split.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    chunk_size: usize,
}

impl TextChunker {
    /// A chunk size of zero is treated as one word per chunk.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        words
            .chunks(self.chunk_size)
            .map(|window| window.join(" "))
            .collect()
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

/// Convenience wrapper around [`TextChunker::chunk`].
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    TextChunker::new(size).chunk(text)
}
