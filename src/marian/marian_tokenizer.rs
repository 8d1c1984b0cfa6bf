use crate::common::error::TranslatorError;
use crate::marian::checkpoints::MarianCheckpoint;
use crate::pipelines::common::TextTokenizer;
use rust_tokenizers::tokenizer::{MarianTokenizer, Tokenizer, TruncationStrategy};
use std::path::Path;

/// # Sentence piece tokenizer of a Marian checkpoint
/// Thin wrapper around `rust_tokenizers`' `MarianTokenizer` exposing the `TextTokenizer`
/// capability. The Opus-MT vocabularies are cased, lower casing is therefore disabled.
pub struct MarianSpmTokenizer {
    tokenizer: MarianTokenizer,
}

impl MarianSpmTokenizer {
    /// Loads the tokenizer from the `vocab.json` and `source.spm` files of a checkpoint directory.
    pub fn from_checkpoint(checkpoint: &MarianCheckpoint) -> Result<Self, TranslatorError> {
        let (vocab_path, spm_path) = checkpoint
            .tokenizer_paths()
            .map_err(|error| TranslatorError::LoadError(error.to_string()))?;
        Self::from_files(&vocab_path, &spm_path)
    }

    pub fn from_files(vocab_path: &Path, spm_path: &Path) -> Result<Self, TranslatorError> {
        let vocab_path = path_to_str(vocab_path)?;
        let spm_path = path_to_str(spm_path)?;
        let tokenizer = MarianTokenizer::from_files(vocab_path, spm_path, false)
            .map_err(|error| TranslatorError::LoadError(error.to_string()))?;
        Ok(MarianSpmTokenizer { tokenizer })
    }
}

fn path_to_str(path: &Path) -> Result<&str, TranslatorError> {
    path.to_str().ok_or_else(|| {
        TranslatorError::LoadError(format!("non UTF-8 path: {}", path.display()))
    })
}

impl TextTokenizer for MarianSpmTokenizer {
    fn encode(&self, text: &str, max_len: usize) -> Result<Vec<i64>, TranslatorError> {
        let tokenized_input =
            self.tokenizer
                .encode(text, None, max_len, &TruncationStrategy::LongestFirst, 0);
        Ok(tokenized_input.token_ids)
    }

    fn decode(&self, token_ids: &[i64], skip_special_tokens: bool) -> String {
        self.tokenizer.decode(token_ids, skip_special_tokens, true)
    }
}
