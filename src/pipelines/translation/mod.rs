//! # Translation pipeline
//!
//! Pipeline and utilities to translate long texts between English and Chinese with a fine-tuned
//! Marian model. Translating a text involves:
//! - splitting the text into sentences (see `pipelines::segmentation`)
//! - packing the sentences into chunks that fit the character budget of the model
//! - translating the chunks one after the other, in order, each chunk being an independent
//!   generation call. A failing chunk is replaced by an error marker and does not abort the text.
//! - joining the translated chunks with single spaces
//!
//! The model, tokenizer and device are provided as a `LoadedModel`, usually obtained from the
//! `ModelCache`. The settings are derived from a `TranslatorConfig`:
//!
//! ```no_run
//! # use rust_bitranslator::pipelines::common::LoadedModel;
//! use rust_bitranslator::pipelines::translation::BatchTranslator;
//! use rust_bitranslator::{Config, TranslatorConfig};
//!
//! # fn run(model: &LoadedModel) -> anyhow::Result<()> {
//! let config = TranslatorConfig::from_file("path/to/config.json")?;
//! let translator = BatchTranslator::from_config(&config);
//! let translation = translator.translate_with_progress(
//!     "The quick brown fox jumps over the lazy dog. The dog did not wake up.",
//!     model,
//!     |completed, total| println!("{}/{}", completed, total),
//! );
//! println!("{}", translation);
//! # Ok(())
//! # }
//! ```

mod translation_config;
mod translation_pipeline;

pub use translation_config::{GenerationSettings, InvokerSettings, TranslatorConfig};
pub use translation_pipeline::{
    collapse_repeated_words, collapse_whitespace, error_marker, translate_chunk, BatchTranslator,
};
