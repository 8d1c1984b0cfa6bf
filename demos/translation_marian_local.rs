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

extern crate anyhow;

use rust_bitranslator::marian::MarianModelStore;
use rust_bitranslator::pipelines::cache::ModelCache;
use rust_bitranslator::pipelines::common::{ModelTier, TranslationDirection};
use rust_bitranslator::pipelines::translation::BatchTranslator;
use rust_bitranslator::{DevicePreference, Precision, TranslatorConfig};

fn main() -> anyhow::Result<()> {
    // Falls back to the published Opus-MT models if no fine-tuned checkpoint is found under the
    // current directory
    let config = TranslatorConfig {
        pretrained_fallback: true,
        ..Default::default()
    };
    let mut cache = ModelCache::from_config(Box::new(MarianModelStore::new()), &config);
    let translator = BatchTranslator::from_config(&config);

    let input = "The quick brown fox jumps over the lazy dog. The dog did not wake up! \
                 Was the fox disappointed? Nobody knows.";

    let key = cache.key(
        ModelTier::Small,
        TranslationDirection::SourceToTarget,
        DevicePreference::Auto,
        Precision::Full,
    );
    let translation = translator.translate(input, cache.acquire(key)?);
    println!("{}", translation);

    let key = cache.key(
        ModelTier::Small,
        TranslationDirection::TargetToSource,
        DevicePreference::Auto,
        Precision::Full,
    );
    let back_translation = translator.translate(&translation, cache.acquire(key)?);
    println!("{}", back_translation);
    Ok(())
}
