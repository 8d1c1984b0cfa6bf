//! # Long text translation pipelines
//!
//! End-to-end translation of texts of arbitrary length between English and Chinese, built from the
//! following components:
//!
//! #### 1. Segmentation and batching
//! The input is split into sentences on terminal punctuation (`.`, `!`, `?`, `。`, `！`, `？`)
//! followed by whitespace, and the sentences are greedily packed into chunks that fit a character
//! budget (see `segmentation`).
//!
//! #### 2. Translation
//! Every chunk is translated by an independent generation call; a failing chunk is replaced by an
//! error marker (see `translation`).
//!
//! ```no_run
//! # use rust_bitranslator::pipelines::common::ModelStore;
//! use rust_bitranslator::pipelines::cache::ModelCache;
//! use rust_bitranslator::pipelines::common::{ModelTier, TranslationDirection};
//! use rust_bitranslator::pipelines::translation::BatchTranslator;
//! use rust_bitranslator::{DevicePreference, Precision, TranslatorConfig};
//! # fn main() -> anyhow::Result<()> {
//! # let store: Box<dyn ModelStore + Send> = unimplemented!();
//! let config = TranslatorConfig::default();
//! let mut cache = ModelCache::from_config(store, &config);
//! let key = cache.key(
//!     ModelTier::Small,
//!     TranslationDirection::SourceToTarget,
//!     DevicePreference::Auto,
//!     Precision::Full,
//! );
//! let model = cache.acquire(key)?;
//! let translation = BatchTranslator::from_config(&config).translate(
//!     "This is the first sentence. This is the second one!",
//!     model,
//! );
//! # Ok(())
//! # }
//! ```
//!
//! #### 3. Model cache
//! Loaded models are kept for the lifetime of the process, keyed by tier, direction, device and
//! precision (see `cache`).
//!
//! #### 4. Background processing
//! Translations run on a dedicated worker thread, one job at a time in submission order, with
//! results handed back to the interactive context (see `worker` and `dispatch`). Automatic
//! translation while typing goes through a debounce controller (see `debounce`). `session` wires
//! these together around an explicit application state.

pub mod cache;
pub mod common;
pub mod debounce;
pub mod dispatch;
pub mod segmentation;
pub mod session;
pub mod translation;
pub mod worker;
