#![allow(dead_code)]

use rust_bitranslator::marian::CheckpointLayout;
use rust_bitranslator::pipelines::common::{
    Checkpoint, LoadOptions, LoadedModel, ModelStore, ModelTier, Seq2SeqModel, TextTokenizer,
    TranslationDirection,
};
use rust_bitranslator::pipelines::translation::GenerationSettings;
use rust_bitranslator::{DeviceKind, Precision, TranslatorError};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const EOS_TOKEN: i64 = 0;
pub const SLOW_DELAY: Duration = Duration::from_millis(300);

/// Maps every character to its code point, `EOS_TOKEN` is the only special token.
pub struct CharTokenizer;

impl TextTokenizer for CharTokenizer {
    fn encode(&self, text: &str, max_len: usize) -> Result<Vec<i64>, TranslatorError> {
        let mut ids: Vec<i64> = text
            .chars()
            .take(max_len.saturating_sub(1))
            .map(|c| c as i64)
            .collect();
        ids.push(EOS_TOKEN);
        Ok(ids)
    }

    fn decode(&self, token_ids: &[i64], skip_special_tokens: bool) -> String {
        token_ids
            .iter()
            .filter(|id| !(skip_special_tokens && **id == EOS_TOKEN))
            .filter_map(|id| char::from_u32(*id as u32))
            .collect()
    }
}

/// "Translates" by upper-casing the input. Inputs containing `FAIL` fail, `PANIC` panics,
/// `EMPTY` yields no sequence and `SLOW` sleeps for `SLOW_DELAY` first.
#[derive(Clone, Default)]
pub struct UppercaseModel {
    pub inputs: Arc<Mutex<Vec<String>>>,
}

impl Seq2SeqModel for UppercaseModel {
    fn generate(
        &self,
        input_ids: &[i64],
        _settings: &GenerationSettings,
    ) -> Result<Vec<Vec<i64>>, TranslatorError> {
        let input = CharTokenizer.decode(input_ids, true);
        self.inputs.lock().unwrap().push(input.clone());
        if input.contains("SLOW") {
            thread::sleep(SLOW_DELAY);
        }
        if input.contains("PANIC") {
            panic!("model exploded");
        }
        if input.contains("FAIL") {
            return Err(TranslatorError::TranslationError(
                "generation failed".to_string(),
            ));
        }
        if input.contains("EMPTY") {
            return Ok(vec![]);
        }
        let mut output = CharTokenizer.encode(&input.to_uppercase(), usize::MAX)?;
        // leading space, stripped by the invoker
        output.insert(0, ' ' as i64);
        Ok(vec![output])
    }
}

/// Loads `CharTokenizer`/`UppercaseModel` pairs from existing directories. A checkpoint directory
/// containing a `broken` file fails to load.
#[derive(Clone, Default)]
pub struct FakeStore {
    pub cuda: bool,
    pub model_loads: Arc<AtomicUsize>,
    pub load_options: Arc<Mutex<Vec<LoadOptions>>>,
    pub inputs: Arc<Mutex<Vec<String>>>,
}

impl FakeStore {
    pub fn with_cuda() -> FakeStore {
        FakeStore {
            cuda: true,
            ..Default::default()
        }
    }

    pub fn model_loads(&self) -> usize {
        self.model_loads.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl ModelStore for FakeStore {
    fn cuda_available(&self) -> bool {
        self.cuda
    }

    fn load_tokenizer(
        &self,
        checkpoint: &Checkpoint,
    ) -> Result<Box<dyn TextTokenizer>, TranslatorError> {
        if let Checkpoint::Local(directory) = checkpoint {
            if !directory.is_dir() {
                return Err(TranslatorError::LoadError(format!(
                    "{} is not a directory",
                    directory.display()
                )));
            }
        }
        Ok(Box::new(CharTokenizer))
    }

    fn load_model(
        &self,
        checkpoint: &Checkpoint,
        options: &LoadOptions,
    ) -> Result<Box<dyn Seq2SeqModel>, TranslatorError> {
        if let Checkpoint::Local(directory) = checkpoint {
            if directory.join("broken").exists() {
                return Err(TranslatorError::LoadError("corrupted weights".to_string()));
            }
        }
        self.model_loads.fetch_add(1, Ordering::SeqCst);
        self.load_options.lock().unwrap().push(*options);
        Ok(Box::new(UppercaseModel {
            inputs: Arc::clone(&self.inputs),
        }))
    }
}

/// A `LoadedModel` built directly from the fakes, sharing `inputs` with the caller
pub fn uppercase_model(inputs: Arc<Mutex<Vec<String>>>) -> LoadedModel {
    LoadedModel {
        model: Box::new(UppercaseModel { inputs }),
        tokenizer: Box::new(CharTokenizer),
        device: DeviceKind::Cpu,
        precision: Precision::Full,
        checkpoint: Checkpoint::Local("fake".into()),
    }
}

/// Creates the checkpoint directories of the default layout for the given pairs
pub fn create_checkpoints(
    model_root: &Path,
    checkpoints: &[(ModelTier, TranslationDirection)],
) -> anyhow::Result<()> {
    let layout = CheckpointLayout::default();
    for (tier, direction) in checkpoints {
        fs::create_dir_all(layout.resolve(model_root, *tier, *direction))?;
    }
    Ok(())
}

pub fn all_checkpoints() -> Vec<(ModelTier, TranslationDirection)> {
    vec![
        (ModelTier::Small, TranslationDirection::SourceToTarget),
        (ModelTier::Small, TranslationDirection::TargetToSource),
        (ModelTier::Full, TranslationDirection::SourceToTarget),
        (ModelTier::Full, TranslationDirection::TargetToSource),
    ]
}
