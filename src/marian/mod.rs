//! # Marian
//!
//! Access to the fine-tuned Marian ([Marian: Fast Neural Machine Translation in {C++}](http://www.aclweb.org/anthology/P18-4020) Junczys-Dowmunt, Grundkiewicz, Dwojak, Hoang, Heafield, Neckermann, Seide, Germann, Fikri Aji, Bogoychev, Martins, Birch, 2018)
//! checkpoints used by the translator. Two checkpoints exist per translation direction: one
//! fine-tuned on a small sample of the parallel corpus and one fine-tuned on the full corpus.
//!
//! # Checkpoint layout
//!
//! Each checkpoint directory is expected to contain:
//! - `config.json`, a configuration file following the [Transformers library](https://github.com/huggingface/transformers) structure
//! - `rust_model.ot`, the model weights converted from the Python `.bin` weights to the `.ot` format
//! - `vocab.json` and `source.spm`, the vocabulary and sentence piece model of the `MarianTokenizer`
//!
//! The default directories (relative to the model root) are listed in `MarianCheckpointPaths`.
//! When a fine-tuned checkpoint is missing, the published Opus-MT models (shared under the
//! Creative Commons Attribution 4.0 International License by the Language Technology team of the
//! University of Helsinki at <https://github.com/Helsinki-NLP/Opus-MT>) can optionally be used
//! instead.
//!
//! The model itself is loaded through `rust-bert` (`MarianModelStore`, requires the `torch`
//! feature):
//!
//! ```ignore
//! use rust_bitranslator::marian::MarianModelStore;
//! use rust_bitranslator::pipelines::cache::ModelCache;
//! use rust_bitranslator::TranslatorConfig;
//!
//! let config = TranslatorConfig::default();
//! let mut cache = ModelCache::from_config(Box::new(MarianModelStore::new()), &config);
//! ```

mod checkpoints;
#[cfg(feature = "torch")]
mod marian_backend;
mod marian_tokenizer;

pub use checkpoints::{
    CheckpointLayout, MarianCheckpoint, MarianCheckpointFiles, MarianCheckpointPaths,
};
#[cfg(feature = "torch")]
pub use marian_backend::{MarianModelStore, MarianTranslationModel};
pub use marian_tokenizer::MarianSpmTokenizer;
