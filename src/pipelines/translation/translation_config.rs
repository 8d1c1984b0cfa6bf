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

use crate::common::device::{DevicePreference, Precision};
use crate::common::error::TranslatorError;
use crate::marian::CheckpointLayout;
use crate::pipelines::common::{ModelTier, TranslationDirection};
use crate::pipelines::segmentation::DEFAULT_MAX_CHUNK_CHARS;
use crate::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// # Generation parameters passed to the model for every chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Number of beams for beam search (default: 5)
    pub num_beams: i64,
    /// Minimum generated sequence length (default: 1)
    pub min_length: i64,
    /// Maximum generated sequence length (default: 512)
    pub max_length: i64,
    /// Size of the n-grams that may not be repeated in the output, 0 disables the constraint (default: 2)
    pub no_repeat_ngram_size: i64,
    /// Exponential penalty based on the length of the hypotheses generated (default: 1.0)
    pub length_penalty: f64,
    /// Early stopping flag indicating if the beam search should stop as soon as `num_beam` hypotheses have been generated (default: true)
    pub early_stopping: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            num_beams: 5,
            min_length: 1,
            max_length: 512,
            no_repeat_ngram_size: 2,
            length_penalty: 1.0,
            early_stopping: true,
        }
    }
}

/// # Settings of a single chunk translation
#[derive(Debug, Clone, PartialEq)]
pub struct InvokerSettings {
    /// Inputs are truncated to this number of tokens before generation
    pub max_input_tokens: usize,
    /// Removes immediately repeated words from the output
    pub collapse_repeated_words: bool,
    pub generation: GenerationSettings,
}

impl Default for InvokerSettings {
    fn default() -> Self {
        InvokerSettings {
            max_input_tokens: 512,
            collapse_repeated_words: false,
            generation: GenerationSettings::default(),
        }
    }
}

/// # Configuration of the translator
/// Every field has a default value, a configuration file only needs to list the fields it
/// overrides.
///
/// ```json
/// {
///   "model_root": "/opt/translator",
///   "device": "cuda",
///   "precision": "half",
///   "generation": { "num_beams": 3 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Directory the checkpoint paths are resolved against (default: current directory)
    pub model_root: PathBuf,
    /// Checkpoint directories for each tier and direction
    pub checkpoints: CheckpointLayout,
    /// Use the published Opus-MT checkpoint when a fine-tuned checkpoint is missing (default: false)
    pub pretrained_fallback: bool,
    pub device: DevicePreference,
    pub precision: Precision,
    /// Character budget of a chunk (default: 512)
    pub max_chunk_chars: usize,
    /// Token budget of a chunk, longer inputs are truncated (default: 512)
    pub max_input_tokens: usize,
    pub collapse_repeated_words: bool,
    pub generation: GenerationSettings,
    /// Quiet period before an automatic translation is triggered, in milliseconds (default: 800)
    pub debounce_ms: u64,
    /// Inputs shorter than this (in characters) never trigger an automatic translation (default: 5)
    pub min_auto_chars: usize,
    pub auto_translate: bool,
    pub tier: ModelTier,
    pub direction: TranslationDirection,
}

impl Config for TranslatorConfig {}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            model_root: PathBuf::from("."),
            checkpoints: CheckpointLayout::default(),
            pretrained_fallback: false,
            device: DevicePreference::Auto,
            precision: Precision::Full,
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            max_input_tokens: 512,
            collapse_repeated_words: false,
            generation: GenerationSettings::default(),
            debounce_ms: 800,
            min_auto_chars: 5,
            auto_translate: false,
            tier: ModelTier::Small,
            direction: TranslationDirection::SourceToTarget,
        }
    }
}

impl TranslatorConfig {
    /// Default location of the configuration file (`<config dir>/bitranslate/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("bitranslate");
            path.push("config.json");
            path
        })
    }

    /// Loads the configuration from `path` if provided, from the default location if a file
    /// exists there, and falls back to the default configuration otherwise. The result is
    /// validated.
    pub fn load(path: Option<&Path>) -> Result<TranslatorConfig, TranslatorError> {
        let config = match path {
            Some(path) => TranslatorConfig::from_file(path)?,
            None => match TranslatorConfig::default_path() {
                Some(default_path) if default_path.is_file() => {
                    TranslatorConfig::from_file(default_path)?
                }
                _ => TranslatorConfig::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TranslatorError> {
        if self.max_chunk_chars == 0 {
            return Err(TranslatorError::InvalidConfigurationError(
                "max_chunk_chars must be strictly positive".to_string(),
            ));
        }
        if self.max_input_tokens == 0 {
            return Err(TranslatorError::InvalidConfigurationError(
                "max_input_tokens must be strictly positive".to_string(),
            ));
        }
        if self.generation.num_beams < 1 {
            return Err(TranslatorError::InvalidConfigurationError(format!(
                "num_beams must be at least 1, got {}",
                self.generation.num_beams
            )));
        }
        if self.generation.max_length < self.generation.min_length {
            return Err(TranslatorError::InvalidConfigurationError(format!(
                "max_length ({}) is smaller than min_length ({})",
                self.generation.max_length, self.generation.min_length
            )));
        }
        Ok(())
    }

    pub fn invoker_settings(&self) -> InvokerSettings {
        InvokerSettings {
            max_input_tokens: self.max_input_tokens,
            collapse_repeated_words: self.collapse_repeated_words,
            generation: self.generation.clone(),
        }
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
