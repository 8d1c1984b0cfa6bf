//! # Sentence segmentation and chunk assembly
//!
//! Long inputs are split into sentences on terminal punctuation (`.`, `!`, `?` and their
//! full-width equivalents `。`, `！`, `？`) followed by whitespace. Sentences are then packed
//! greedily into chunks whose length stays within a character budget, so that a single
//! generation call never receives more text than the model was trained on. A sentence is never
//! split: a sentence longer than the budget forms its own, oversized, chunk and relies on the
//! tokenizer truncation downstream.
//!
//! ```
//! use rust_bitranslator::pipelines::segmentation::{assemble, segment};
//!
//! let sentences: Vec<&str> = segment("Hello. How are you?").collect();
//! assert_eq!(sentences, vec!["Hello.", "How are you?"]);
//!
//! let chunks = assemble(sentences, 512);
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].text(), "Hello. How are you?");
//! ```
use lazy_static::lazy_static;
use regex::{Matches, Regex};

/// Default character budget of a chunk
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 512;

lazy_static! {
    static ref SENTENCE_BOUNDARY: Regex = Regex::new(r"[.!?。！？]\s+").unwrap();
}

/// Splits a text into sentences.
///
/// The returned iterator is lazy and yields trimmed sentences in their original order. The
/// terminal punctuation stays attached to its sentence and the whitespace following it is
/// dropped. Text without any boundary yields a single sentence, empty (or blank) text yields
/// nothing.
pub fn segment(text: &str) -> Sentences<'_> {
    Sentences {
        text,
        boundaries: SENTENCE_BOUNDARY.find_iter(text),
        position: 0,
        finished: false,
    }
}

/// # Iterator over the sentences of a text
pub struct Sentences<'a> {
    text: &'a str,
    boundaries: Matches<'static, 'a>,
    position: usize,
    finished: bool,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            if self.finished {
                return None;
            }
            let (end, next_start) = match self.boundaries.next() {
                Some(boundary) => {
                    let punctuation_len = boundary
                        .as_str()
                        .chars()
                        .next()
                        .map_or(0, char::len_utf8);
                    (boundary.start() + punctuation_len, boundary.end())
                }
                None => {
                    self.finished = true;
                    (self.text.len(), self.text.len())
                }
            };
            let sentence = self.text[self.position..end].trim();
            self.position = next_start;
            // zero-length fragments (trailing whitespace after the last boundary) are skipped
            if !sentence.is_empty() {
                return Some(sentence);
            }
        }
    }
}

/// # Group of consecutive sentences translated in a single generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    text: String,
    char_len: usize,
    sentence_count: usize,
}

impl Chunk {
    fn new(sentence: &str) -> Chunk {
        Chunk {
            text: sentence.to_string(),
            char_len: sentence.chars().count(),
            sentence_count: 1,
        }
    }

    fn push(&mut self, sentence: &str, sentence_len: usize) {
        self.text.push(' ');
        self.text.push_str(sentence);
        self.char_len += 1 + sentence_len;
        self.sentence_count += 1;
    }

    /// Sentences of the chunk joined by single spaces
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the chunk in characters
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn sentence_count(&self) -> usize {
        self.sentence_count
    }

    /// A chunk exceeds the budget only when it holds a single sentence longer than the budget.
    pub fn is_oversized(&self, max_chars: usize) -> bool {
        self.char_len > max_chars
    }
}

/// Packs sentences into chunks of at most `max_chars` characters.
///
/// Sentences are appended to the current chunk (separated by a single space) while the chunk
/// stays within the budget, otherwise a new chunk is started. Order is preserved and the
/// output is fully determined by the input.
///
/// # Arguments
///
/// * `sentences` - sentences to pack, typically the output of `segment`
/// * `max_chars` - character budget of a chunk
///
/// # Returns
///
/// * `Vec<Chunk>` - empty if and only if no (non-blank) sentence was provided
pub fn assemble<I, S>(sentences: I, max_chars: usize) -> Vec<Chunk>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut chunks = Vec::new();
    let mut current: Option<Chunk> = None;
    for sentence in sentences {
        let sentence = sentence.as_ref().trim();
        if sentence.is_empty() {
            continue;
        }
        let sentence_len = sentence.chars().count();
        current = Some(match current.take() {
            None => Chunk::new(sentence),
            Some(mut chunk) => {
                if chunk.char_len + 1 + sentence_len <= max_chars {
                    chunk.push(sentence, sentence_len);
                    chunk
                } else {
                    chunks.push(chunk);
                    Chunk::new(sentence)
                }
            }
        });
    }
    if let Some(chunk) = current {
        chunks.push(chunk);
    }
    chunks
}

/// Segments a text and packs its sentences into chunks.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<Chunk> {
    assemble(segment(text), max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(text: &str) -> String {
        text.split_whitespace().collect::<Vec<&str>>().join(" ")
    }

    #[test]
    fn splits_on_ascii_and_full_width_punctuation() {
        let sentences: Vec<&str> =
            segment("Hello world! Is it raining? 今天很好。 明天呢？ 好的！ Done.").collect();
        assert_eq!(
            sentences,
            vec![
                "Hello world!",
                "Is it raining?",
                "今天很好。",
                "明天呢？",
                "好的！",
                "Done."
            ]
        );
    }

    #[test]
    fn punctuation_without_whitespace_is_not_a_boundary() {
        let sentences: Vec<&str> = segment("Version 1.2.3 is out.Really").collect();
        assert_eq!(sentences, vec!["Version 1.2.3 is out.Really"]);
    }

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        assert_eq!(segment("").count(), 0);
        assert_eq!(segment(" \n\t ").count(), 0);
    }

    #[test]
    fn text_without_boundary_is_a_single_sentence() {
        let sentences: Vec<&str> = segment("  no punctuation here  ").collect();
        assert_eq!(sentences, vec!["no punctuation here"]);
    }

    #[test]
    fn trailing_whitespace_after_last_boundary_is_skipped() {
        let sentences: Vec<&str> = segment("One. Two.   \n").collect();
        assert_eq!(sentences, vec!["One.", "Two."]);
    }

    #[test]
    fn consecutive_punctuation_stays_in_order() {
        let sentences: Vec<&str> = segment("Wait! ! What?  ? ok").collect();
        assert_eq!(sentences, vec!["Wait!", "!", "What?", "?", "ok"]);
    }

    #[test]
    fn segmentation_preserves_content() {
        let texts = [
            "Hello.  How are you?\nFine, thanks! 你好。 再见",
            "a. b! c? d",
            "   leading and trailing.   ",
            "多个句子。第二句没有空格。 第三句！",
        ];
        for text in texts.iter() {
            let joined = segment(text).collect::<Vec<&str>>().join(" ");
            assert_eq!(normalize(&joined), normalize(text));
        }
    }

    #[test]
    fn assemble_packs_greedily_within_budget() {
        let chunks = assemble(vec!["aaaa.", "bbbb.", "cccc."], 11);
        let texts: Vec<&str> = chunks.iter().map(Chunk::text).collect();
        assert_eq!(texts, vec!["aaaa. bbbb.", "cccc."]);
        assert_eq!(chunks[0].char_len(), 11);
        assert_eq!(chunks[0].sentence_count(), 2);
    }

    #[test]
    fn oversized_sentence_forms_its_own_chunk() {
        let long_sentence = "x".repeat(20);
        let chunks = assemble(vec!["short.", long_sentence.as_str(), "tail."], 10);
        let texts: Vec<&str> = chunks.iter().map(Chunk::text).collect();
        assert_eq!(texts, vec!["short.", long_sentence.as_str(), "tail."]);
        assert!(chunks[1].is_oversized(10));
        assert!(!chunks[0].is_oversized(10));
    }

    #[test]
    fn budget_is_measured_in_characters() {
        // each sentence is 4 characters and 12 bytes
        let chunks = assemble(vec!["你好吗？", "我很好。"], 9);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].char_len(), 9);
    }

    #[test]
    fn no_chunk_for_empty_input() {
        assert!(chunk_text("", DEFAULT_MAX_CHUNK_CHARS).is_empty());
        assert!(assemble(Vec::<String>::new(), 10).is_empty());
    }
}
