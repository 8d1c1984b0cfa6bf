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

//! # Common blocks for the translation pipeline
//! Provides the enums selecting a checkpoint (direction and tier) and the capability traits the
//! pipeline consumes from a model backend. Model loading, generation and tokenization are
//! delegated to the backend: the pipeline only needs to encode a chunk, generate from the token
//! ids and decode the first returned sequence.
use crate::common::device::{DeviceKind, Precision};
use crate::common::error::TranslatorError;
use crate::pipelines::translation::GenerationSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// # Translation direction
/// The source language is English, the target language is Chinese.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationDirection {
    /// English to Chinese
    #[serde(alias = "en-zh")]
    SourceToTarget,
    /// Chinese to English
    #[serde(alias = "zh-en")]
    TargetToSource,
}

impl Default for TranslationDirection {
    fn default() -> Self {
        TranslationDirection::SourceToTarget
    }
}

impl TranslationDirection {
    pub fn toggle(&self) -> Self {
        match self {
            TranslationDirection::SourceToTarget => TranslationDirection::TargetToSource,
            TranslationDirection::TargetToSource => TranslationDirection::SourceToTarget,
        }
    }

    /// ISO 639-1 code of the language translated from
    pub fn source_language(&self) -> &'static str {
        match self {
            TranslationDirection::SourceToTarget => "en",
            TranslationDirection::TargetToSource => "zh",
        }
    }

    /// ISO 639-1 code of the language translated to
    pub fn target_language(&self) -> &'static str {
        match self {
            TranslationDirection::SourceToTarget => "zh",
            TranslationDirection::TargetToSource => "en",
        }
    }
}

impl fmt::Display for TranslationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source_language(), self.target_language())
    }
}

impl FromStr for TranslationDirection {
    type Err = TranslatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en-zh" | "en" | "source-to-target" => Ok(TranslationDirection::SourceToTarget),
            "zh-en" | "zh" | "cn" | "target-to-source" => Ok(TranslationDirection::TargetToSource),
            other => Err(TranslatorError::InvalidConfigurationError(format!(
                "unknown translation direction `{}` (expected en-zh or zh-en)",
                other
            ))),
        }
    }
}

/// # Fine-tuned checkpoint selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Model fine-tuned on a small sample of the parallel corpus (fast to train, limited quality)
    Small,
    /// Model fine-tuned on the full parallel corpus
    Full,
}

impl Default for ModelTier {
    fn default() -> Self {
        ModelTier::Small
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelTier::Small => write!(f, "small"),
            ModelTier::Full => write!(f, "full"),
        }
    }
}

impl FromStr for ModelTier {
    type Err = TranslatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" | "1" => Ok(ModelTier::Small),
            "full" | "2" => Ok(ModelTier::Full),
            other => Err(TranslatorError::InvalidConfigurationError(format!(
                "unknown model tier `{}` (expected small or full)",
                other
            ))),
        }
    }
}

/// # Location of the files backing a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checkpoint {
    /// Fine-tuned checkpoint directory on disk
    Local(PathBuf),
    /// Published Opus-MT checkpoint for a direction, fetched by the backend
    Pretrained(TranslationDirection),
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checkpoint::Local(path) => write!(f, "{}", path.display()),
            Checkpoint::Pretrained(direction) => write!(
                f,
                "Helsinki-NLP/opus-mt-{}-{}",
                direction.source_language(),
                direction.target_language()
            ),
        }
    }
}

/// # Placement of a model being loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub device: DeviceKind,
    /// Already normalized against the device: `Half` is only ever requested on an accelerator
    pub precision: Precision,
}

/// # Tokenization capability of a backend
pub trait TextTokenizer {
    /// Encodes a text into token ids, truncating to `max_len` tokens (special tokens included).
    fn encode(&self, text: &str, max_len: usize) -> Result<Vec<i64>, TranslatorError>;

    /// Decodes a sequence of token ids.
    fn decode(&self, token_ids: &[i64], skip_special_tokens: bool) -> String;
}

/// # Generation capability of a sequence-to-sequence backend
pub trait Seq2SeqModel {
    /// Generates output sequences for a single encoded input. Implementations return at least one
    /// sequence on success; only the first one is used by the pipeline.
    fn generate(
        &self,
        input_ids: &[i64],
        settings: &GenerationSettings,
    ) -> Result<Vec<Vec<i64>>, TranslatorError>;
}

/// # Loader of tokenizers and models from checkpoints
pub trait ModelStore {
    /// Availability of an accelerator, used to resolve `DevicePreference::Auto`
    fn cuda_available(&self) -> bool {
        false
    }

    fn load_tokenizer(
        &self,
        checkpoint: &Checkpoint,
    ) -> Result<Box<dyn TextTokenizer>, TranslatorError>;

    /// Loads the model, placing it on the requested device with the requested precision.
    fn load_model(
        &self,
        checkpoint: &Checkpoint,
        options: &LoadOptions,
    ) -> Result<Box<dyn Seq2SeqModel>, TranslatorError>;
}

/// # A loaded (model, tokenizer, device) triple
pub struct LoadedModel {
    pub model: Box<dyn Seq2SeqModel>,
    pub tokenizer: Box<dyn TextTokenizer>,
    pub device: DeviceKind,
    pub precision: Precision,
    pub checkpoint: Checkpoint,
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("device", &self.device)
            .field("precision", &self.precision)
            .field("checkpoint", &self.checkpoint)
            .finish()
    }
}
