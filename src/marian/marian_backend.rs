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

use crate::common::device::Precision;
use crate::common::error::TranslatorError;
use crate::marian::checkpoints::MarianCheckpoint;
use crate::marian::marian_tokenizer::MarianSpmTokenizer;
use crate::pipelines::common::{
    Checkpoint, LoadOptions, ModelStore, Seq2SeqModel, TextTokenizer, TranslationDirection,
};
use crate::pipelines::translation::GenerationSettings;
use rust_bert::marian::{
    MarianConfigResources, MarianGenerator, MarianModelResources, MarianSpmResources,
    MarianVocabResources,
};
use rust_bert::pipelines::common::{ModelResource, ModelType};
use rust_bert::pipelines::generation_utils::{GenerateConfig, GenerateOptions, LanguageGenerator};
use rust_bert::resources::{LocalResource, RemoteResource, ResourceProvider};
use std::path::PathBuf;
use tch::{Device, Kind, Tensor};

/// # Marian model backed by `rust-bert`'s `MarianGenerator`
pub struct MarianTranslationModel {
    generator: MarianGenerator,
    device: Device,
}

impl Seq2SeqModel for MarianTranslationModel {
    fn generate(
        &self,
        input_ids: &[i64],
        settings: &GenerationSettings,
    ) -> Result<Vec<Vec<i64>>, TranslatorError> {
        let generate_options = GenerateOptions {
            min_length: Some(settings.min_length),
            max_length: Some(settings.max_length),
            num_beams: Some(settings.num_beams),
            no_repeat_ngram_size: Some(settings.no_repeat_ngram_size),
            length_penalty: Some(settings.length_penalty),
            early_stopping: Some(settings.early_stopping),
            num_return_sequences: Some(1),
            ..Default::default()
        };
        let input_tensor = Tensor::from_slice(input_ids).unsqueeze(0).to(self.device);
        let outputs = tch::no_grad(|| {
            self.generator
                .generate_from_ids_and_past(input_tensor, None, Some(generate_options))
        })
        .map_err(|error| TranslatorError::TranslationError(error.to_string()))?;
        Ok(outputs.into_iter().map(|output| output.indices).collect())
    }
}

/// # Loader of fine-tuned (or published Opus-MT) Marian checkpoints
#[derive(Debug, Clone, Default)]
pub struct MarianModelStore;

impl MarianModelStore {
    pub fn new() -> MarianModelStore {
        MarianModelStore
    }

    fn pretrained_resources(
        direction: TranslationDirection,
    ) -> (
        RemoteResource,
        RemoteResource,
        RemoteResource,
        RemoteResource,
    ) {
        match direction {
            TranslationDirection::SourceToTarget => (
                RemoteResource::from_pretrained(MarianModelResources::ENGLISH2CHINESE),
                RemoteResource::from_pretrained(MarianConfigResources::ENGLISH2CHINESE),
                RemoteResource::from_pretrained(MarianVocabResources::ENGLISH2CHINESE),
                RemoteResource::from_pretrained(MarianSpmResources::ENGLISH2CHINESE),
            ),
            TranslationDirection::TargetToSource => (
                RemoteResource::from_pretrained(MarianModelResources::CHINESE2ENGLISH),
                RemoteResource::from_pretrained(MarianConfigResources::CHINESE2ENGLISH),
                RemoteResource::from_pretrained(MarianVocabResources::CHINESE2ENGLISH),
                RemoteResource::from_pretrained(MarianSpmResources::CHINESE2ENGLISH),
            ),
        }
    }
}

fn torch_resource(local_path: PathBuf) -> LocalResource {
    LocalResource { local_path }
}

fn local_path(resource: &dyn ResourceProvider) -> Result<PathBuf, TranslatorError> {
    resource
        .get_local_path()
        .map_err(|error| TranslatorError::LoadError(error.to_string()))
}

impl ModelStore for MarianModelStore {
    fn cuda_available(&self) -> bool {
        tch::Cuda::is_available()
    }

    fn load_tokenizer(
        &self,
        checkpoint: &Checkpoint,
    ) -> Result<Box<dyn TextTokenizer>, TranslatorError> {
        let tokenizer = match checkpoint {
            Checkpoint::Local(directory) => {
                MarianSpmTokenizer::from_checkpoint(&MarianCheckpoint::new(directory))?
            }
            Checkpoint::Pretrained(direction) => {
                let (_, _, vocab_resource, spm_resource) = Self::pretrained_resources(*direction);
                MarianSpmTokenizer::from_files(
                    &local_path(&vocab_resource)?,
                    &local_path(&spm_resource)?,
                )?
            }
        };
        Ok(Box::new(tokenizer))
    }

    fn load_model(
        &self,
        checkpoint: &Checkpoint,
        options: &LoadOptions,
    ) -> Result<Box<dyn Seq2SeqModel>, TranslatorError> {
        let device: Device = options.device.into();
        let kind = match options.precision {
            Precision::Half => Some(Kind::Half),
            Precision::Full => None,
        };
        let generate_config = match checkpoint {
            Checkpoint::Local(directory) => {
                let resources = MarianCheckpoint::new(directory);
                let (model_path, config_path, vocab_path, spm_path) = resources.all_paths()?;
                GenerateConfig {
                    model_type: ModelType::Marian,
                    model_resource: ModelResource::Torch(Box::new(torch_resource(model_path))),
                    config_resource: Box::new(torch_resource(config_path)),
                    vocab_resource: Box::new(torch_resource(vocab_path)),
                    merges_resource: Some(Box::new(torch_resource(spm_path))),
                    device,
                    kind,
                    ..Default::default()
                }
            }
            Checkpoint::Pretrained(direction) => {
                let (model_resource, config_resource, vocab_resource, spm_resource) =
                    Self::pretrained_resources(*direction);
                GenerateConfig {
                    model_type: ModelType::Marian,
                    model_resource: ModelResource::Torch(Box::new(model_resource)),
                    config_resource: Box::new(config_resource),
                    vocab_resource: Box::new(vocab_resource),
                    merges_resource: Some(Box::new(spm_resource)),
                    device,
                    kind,
                    ..Default::default()
                }
            }
        };
        let generator = MarianGenerator::new(generate_config)
            .map_err(|error| TranslatorError::LoadError(error.to_string()))?;
        Ok(Box::new(MarianTranslationModel { generator, device }))
    }
}
