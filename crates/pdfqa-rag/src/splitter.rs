//! Recursive character text splitter.
//!
//! Text is cut on the coarsest separator present (paragraphs, then lines,
//! then words, then characters) and the pieces are merged back into windows
//! of at most `chunk_size` characters, each window starting with up to
//! `chunk_overlap` characters carried over from the previous one.

use regex::Regex;
use tracing::warn;

use pdfqa_core::{Error, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

fn default_separators() -> Vec<String> {
    ["\n\n", "\n", " ", ""].iter().map(|s| s.to_string()).collect()
}

/// Lengths are measured in characters, not bytes
fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[derive(Debug, Clone)]
pub struct RecursiveCharacterTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for RecursiveCharacterTextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: default_separators(),
        }
    }
}

impl RecursiveCharacterTextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Configuration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap > chunk_size {
            return Err(Error::Configuration(format!(
                "chunk_overlap ({}) is larger than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: default_separators(),
        })
    }

    /// Replace the separator list, coarsest first
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = candidate;
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut good_splits: Vec<String> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                good_splits.push(piece);
                continue;
            }

            if !good_splits.is_empty() {
                final_chunks.extend(self.merge_splits(&good_splits));
                good_splits.clear();
            }

            if remaining.is_empty() {
                final_chunks.extend(join_pieces(&[piece.as_str()]));
            } else {
                final_chunks.extend(self.split_recursive(&piece, remaining));
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits));
        }

        final_chunks
    }

    /// Greedily pack small pieces into windows, keeping an overlapping tail.
    ///
    /// Separators are already attached to the pieces, so pieces are joined
    /// with nothing in between.
    fn merge_splits(&self, splits: &[String]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut start = 0;
        let mut total = 0;

        for piece in splits {
            let len = char_len(piece);

            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total, self.chunk_size
                    );
                }

                if current.len() > start {
                    if let Some(doc) = join_pieces(&current[start..]) {
                        docs.push(doc);
                    }

                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        total -= char_len(current[start]);
                        start += 1;
                    }
                }
            }

            current.push(piece);
            total += len;
        }

        if let Some(doc) = join_pieces(&current[start..]) {
            docs.push(doc);
        }

        docs
    }
}

fn join_pieces(pieces: &[&str]) -> Option<String> {
    let joined = pieces.concat();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split on `separator`, attaching each separator to the start of the piece
/// that follows it. An empty separator splits into characters.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(|c| c.to_string()).collect();
    }

    // Separators are literals; escaping keeps regex metacharacters inert.
    let pattern = match Regex::new(&regex::escape(separator)) {
        Ok(pattern) => pattern,
        Err(_) => return vec![text.to_string()],
    };

    let mut pieces = Vec::new();
    let mut last = 0;
    for m in pattern.find_iter(text) {
        if m.start() > last {
            pieces.push(text[last..m.start()].to_string());
        }
        last = m.start();
    }
    if last < text.len() {
        pieces.push(text[last..].to_string());
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(size: usize, overlap: usize, text: &str) -> Vec<String> {
        RecursiveCharacterTextSplitter::new(size, overlap)
            .unwrap()
            .split_text(text)
    }

    #[test]
    fn merges_words_up_to_chunk_size() {
        assert_eq!(
            split(10, 3, "abc def ghi jkl mno pqr"),
            vec!["abc def", "ghi jkl", "mno pqr"]
        );
    }

    #[test]
    fn prefers_paragraphs_then_lines_then_words() {
        let text = "First paragraph here.\n\nSecond paragraph is a bit longer than twenty.\nThird line";
        assert_eq!(
            split(20, 5, text),
            vec![
                "First paragraph",
                "here.",
                "Second paragraph is",
                "is a bit longer",
                "than twenty.",
                "Third line",
            ]
        );
    }

    #[test]
    fn carries_overlap_between_windows() {
        assert_eq!(
            split(12, 4, "a b c d e f g h i j k l m n o p"),
            vec!["a b c d e f", "e f g h i j", "i j k l m n", "m n o p"]
        );
    }

    #[test]
    fn falls_back_to_characters() {
        assert_eq!(split(5, 0, "abcdefghijklm"), vec!["abcde", "fghij", "klm"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(
            split(6, 2, "héllo wörld ñandú"),
            vec!["héllo", "wörld", "ñandú"]
        );
    }

    #[test]
    fn paragraph_pieces_are_trimmed() {
        assert_eq!(
            split(8, 2, "one two\n\nthree four five"),
            vec!["one two", "three", "four", "five"]
        );
        assert_eq!(split(500, 50, "  short text  "), vec!["short text"]);
    }

    #[test]
    fn blank_input_has_no_chunks() {
        assert!(split(500, 50, "").is_empty());
        assert!(split(500, 50, " \n\n \n ").is_empty());
    }

    #[test]
    fn oversized_pieces_without_separators_are_trimmed() {
        assert_eq!(split(1, 0, "a b"), vec!["a", "b"]);
        assert_eq!(split(1, 0, " \n "), Vec::<String>::new());

        let splitter = RecursiveCharacterTextSplitter::new(3, 0)
            .unwrap()
            .with_separators(["|"]);
        assert_eq!(splitter.split_text("ab| long |"), vec!["ab", "| long", "|"]);
    }

    #[test]
    fn default_windows_stay_within_size() {
        let sentence = "The quick brown fox jumps over the lazy dog. ";
        let text = sentence.repeat(60);
        let chunks = RecursiveCharacterTextSplitter::default().split_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(chunk) <= DEFAULT_CHUNK_SIZE);
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn rejects_overlap_larger_than_size() {
        assert!(RecursiveCharacterTextSplitter::new(10, 11).is_err());
        assert!(RecursiveCharacterTextSplitter::new(0, 0).is_err());
    }

    #[test]
    fn separators_are_literal() {
        let splitter = RecursiveCharacterTextSplitter::new(5, 0)
            .unwrap()
            .with_separators(["|", ""]);
        assert_eq!(splitter.split_text("ab|cd|ef"), vec!["ab|cd", "|ef"]);
    }
}
