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
use crate::pipelines::common::{ModelTier, TranslationDirection};
use crate::resources::{LocalResource, ResourceProvider};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// # Default checkpoint directories, relative to the model root
pub struct MarianCheckpointPaths;

impl MarianCheckpointPaths {
    pub const SMALL_ENGLISH2CHINESE: &'static str = "train_small/en_zh_translator_small";
    pub const SMALL_CHINESE2ENGLISH: &'static str = "train_small/zh_en_translator_small";
    pub const FULL_ENGLISH2CHINESE: &'static str = "train/en_zh_translator";
    pub const FULL_CHINESE2ENGLISH: &'static str = "train/zh_en_translator";
}

/// # File names expected in a checkpoint directory
pub struct MarianCheckpointFiles;

impl MarianCheckpointFiles {
    pub const CONFIG: &'static str = "config.json";
    pub const WEIGHTS: &'static str = "rust_model.ot";
    pub const VOCAB: &'static str = "vocab.json";
    pub const SOURCE_SPM: &'static str = "source.spm";
}

/// # On-disk layout of the fine-tuned checkpoints
/// One directory per (tier, direction) pair. Relative paths are resolved against the model root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointLayout {
    pub small_source_to_target: PathBuf,
    pub small_target_to_source: PathBuf,
    pub full_source_to_target: PathBuf,
    pub full_target_to_source: PathBuf,
}

impl Default for CheckpointLayout {
    fn default() -> Self {
        CheckpointLayout {
            small_source_to_target: PathBuf::from(MarianCheckpointPaths::SMALL_ENGLISH2CHINESE),
            small_target_to_source: PathBuf::from(MarianCheckpointPaths::SMALL_CHINESE2ENGLISH),
            full_source_to_target: PathBuf::from(MarianCheckpointPaths::FULL_ENGLISH2CHINESE),
            full_target_to_source: PathBuf::from(MarianCheckpointPaths::FULL_CHINESE2ENGLISH),
        }
    }
}

impl CheckpointLayout {
    pub fn relative_path(&self, tier: ModelTier, direction: TranslationDirection) -> &Path {
        match (tier, direction) {
            (ModelTier::Small, TranslationDirection::SourceToTarget) => {
                &self.small_source_to_target
            }
            (ModelTier::Small, TranslationDirection::TargetToSource) => {
                &self.small_target_to_source
            }
            (ModelTier::Full, TranslationDirection::SourceToTarget) => &self.full_source_to_target,
            (ModelTier::Full, TranslationDirection::TargetToSource) => &self.full_target_to_source,
        }
    }

    /// Checkpoint directory for a tier and direction. Absolute entries are returned as-is.
    pub fn resolve(
        &self,
        model_root: &Path,
        tier: ModelTier,
        direction: TranslationDirection,
    ) -> PathBuf {
        model_root.join(self.relative_path(tier, direction))
    }
}

/// # Resources of a Marian checkpoint directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarianCheckpoint {
    pub config_resource: LocalResource,
    pub model_resource: LocalResource,
    pub vocab_resource: LocalResource,
    pub spm_resource: LocalResource,
}

impl MarianCheckpoint {
    pub fn new(directory: &Path) -> MarianCheckpoint {
        MarianCheckpoint {
            config_resource: directory.join(MarianCheckpointFiles::CONFIG).into(),
            model_resource: directory.join(MarianCheckpointFiles::WEIGHTS).into(),
            vocab_resource: directory.join(MarianCheckpointFiles::VOCAB).into(),
            spm_resource: directory.join(MarianCheckpointFiles::SOURCE_SPM).into(),
        }
    }

    /// Tokenizer files (vocabulary, sentence piece model)
    pub fn tokenizer_paths(&self) -> Result<(PathBuf, PathBuf), TranslatorError> {
        Ok((
            self.vocab_resource.get_local_path()?,
            self.spm_resource.get_local_path()?,
        ))
    }

    /// Every file of the checkpoint as (weights, config, vocabulary, sentence piece model). A
    /// missing file is reported as a `LoadError`: the checkpoint directory exists but is incomplete.
    pub fn all_paths(&self) -> Result<(PathBuf, PathBuf, PathBuf, PathBuf), TranslatorError> {
        let incomplete = |error: TranslatorError| TranslatorError::LoadError(error.to_string());
        Ok((
            self.model_resource.get_local_path().map_err(incomplete)?,
            self.config_resource.get_local_path().map_err(incomplete)?,
            self.vocab_resource.get_local_path().map_err(incomplete)?,
            self.spm_resource.get_local_path().map_err(incomplete)?,
        ))
    }
}
