// Copyright 2024 The rust-bitranslator Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::common::error::TranslatorError;
use crate::pipelines::common::LoadedModel;
use crate::pipelines::segmentation::chunk_text;
use crate::pipelines::translation::translation_config::{InvokerSettings, TranslatorConfig};
use tracing::{debug, warn};

/// Translates a single chunk.
///
/// Blank chunks are returned as an empty string without calling the model. Otherwise the chunk
/// is encoded (truncated to `max_input_tokens`), passed to the model and the first generated
/// sequence is decoded without its special tokens. Whitespace runs in the output are collapsed
/// to single spaces.
///
/// # Arguments
///
/// * `chunk` - text to translate
/// * `model` - loaded (model, tokenizer, device) triple
/// * `settings` - truncation, generation and post-processing settings
///
/// # Returns
///
/// * `String` translated chunk, or a `TranslationError` wrapping the underlying failure
pub fn translate_chunk(
    chunk: &str,
    model: &LoadedModel,
    settings: &InvokerSettings,
) -> Result<String, TranslatorError> {
    if chunk.trim().is_empty() {
        return Ok(String::new());
    }
    let input_ids = model
        .tokenizer
        .encode(chunk, settings.max_input_tokens)
        .map_err(as_translation_error)?;
    let output_ids = model
        .model
        .generate(&input_ids, &settings.generation)
        .map_err(as_translation_error)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            TranslatorError::TranslationError(format!(
                "no sequence generated for an input of {} tokens",
                input_ids.len()
            ))
        })?;
    let decoded = model.tokenizer.decode(&output_ids, true);
    let translation = collapse_whitespace(&decoded);
    Ok(if settings.collapse_repeated_words {
        collapse_repeated_words(&translation)
    } else {
        translation
    })
}

fn as_translation_error(error: TranslatorError) -> TranslatorError {
    match error {
        TranslatorError::TranslationError(_) => error,
        other => TranslatorError::TranslationError(other.to_string()),
    }
}

/// Collapses runs of whitespace to a single space and trims the text.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Removes words identical to the word immediately preceding them.
pub fn collapse_repeated_words(text: &str) -> String {
    let mut words: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        if words.last() != Some(&word) {
            words.push(word);
        }
    }
    words.join(" ")
}

/// Marker inserted in place of a chunk that failed to translate
pub fn error_marker(error: &TranslatorError) -> String {
    match error {
        TranslatorError::TranslationError(cause) => format!("[translation error: {}]", cause),
        other => format!("[translation error: {}]", other),
    }
}

/// # Long text translator
/// Splits the input into sentences, packs them into chunks within the character budget and
/// translates the chunks one after the other. A chunk failing to translate is replaced by an
/// error marker (see `error_marker`), the remaining chunks are still translated.
///
/// ```no_run
/// # use rust_bitranslator::pipelines::common::LoadedModel;
/// use rust_bitranslator::pipelines::translation::BatchTranslator;
/// use rust_bitranslator::TranslatorConfig;
///
/// # fn run(model: &LoadedModel) {
/// let translator = BatchTranslator::from_config(&TranslatorConfig::default());
/// let output = translator.translate("Hello. How are you?", model);
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BatchTranslator {
    pub max_chunk_chars: usize,
    pub invoker: InvokerSettings,
}

impl BatchTranslator {
    pub fn new(max_chunk_chars: usize, invoker: InvokerSettings) -> BatchTranslator {
        BatchTranslator {
            max_chunk_chars,
            invoker,
        }
    }

    pub fn from_config(config: &TranslatorConfig) -> BatchTranslator {
        BatchTranslator::new(config.max_chunk_chars, config.invoker_settings())
    }

    /// Translates a text of arbitrary length.
    pub fn translate(&self, text: &str, model: &LoadedModel) -> String {
        self.translate_with_progress(text, model, |_, _| {})
    }

    /// Translates a text of arbitrary length, calling `progress(completed, total)` after each
    /// chunk.
    pub fn translate_with_progress<F>(
        &self,
        text: &str,
        model: &LoadedModel,
        mut progress: F,
    ) -> String
    where
        F: FnMut(usize, usize),
    {
        let chunks = chunk_text(text, self.max_chunk_chars);
        let total = chunks.len();
        let mut outputs: Vec<String> = Vec::with_capacity(total);
        for (index, chunk) in chunks.iter().enumerate() {
            debug!(
                "translating chunk {}/{} ({} characters, {} sentences)",
                index + 1,
                total,
                chunk.char_len(),
                chunk.sentence_count()
            );
            match translate_chunk(chunk.text(), model, &self.invoker) {
                Ok(translation) => {
                    if !translation.is_empty() {
                        outputs.push(translation);
                    }
                }
                Err(error) => {
                    warn!("chunk {}/{} failed to translate: {}", index + 1, total, error);
                    outputs.push(error_marker(&error));
                }
            }
            progress(index + 1, total);
        }
        outputs.join(" ").trim().to_string()
    }
}
