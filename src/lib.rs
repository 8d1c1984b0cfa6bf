//! # Bilingual long text translator
//!
//! English ⇄ Chinese translation of texts of arbitrary length with fine-tuned Marian models.
//! The crate splits long inputs into sentence-aligned chunks fitting the model input budget,
//! translates them one by one with per-chunk failure isolation, and keeps loaded models in a
//! cache. Translations run on a background worker; automatic translation while typing is
//! debounced.
//!
//! The model backend is abstracted behind the `ModelStore`, `Seq2SeqModel` and `TextTokenizer`
//! traits (see `pipelines::common`). A backend built on `rust-bert` and `tch` is available with
//! the `torch` feature, which requires a libtorch installation (or the `download-libtorch`
//! feature).
//!
//! ```no_run
//! # #[cfg(feature = "torch")]
//! # fn main() -> anyhow::Result<()> {
//! use rust_bitranslator::marian::MarianModelStore;
//! use rust_bitranslator::pipelines::session::TranslatorSession;
//! use rust_bitranslator::TranslatorConfig;
//! use std::time::Duration;
//!
//! let config = TranslatorConfig::load(None)?;
//! let session = TranslatorSession::new(Box::new(MarianModelStore::new()), &config, None);
//! session.translate("Hello world. How are you today?", |result| match result {
//!     Ok(translation) => println!("{}", translation),
//!     Err(error) => eprintln!("{}", error),
//! })?;
//! session.pump_blocking(Duration::from_secs(120));
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "torch"))]
//! # fn main() {}
//! ```
//!
//! # Model checkpoints
//!
//! Four checkpoints are expected under the configured model root, one per tier and direction
//! (see `marian::MarianCheckpointPaths`). Each contains the `config.json`, `rust_model.ot`,
//! `vocab.json` and `source.spm` files of a Marian model.

pub mod common;
pub mod marian;
pub mod pipelines;

pub use common::error::TranslatorError;
pub use common::resources;
pub use common::{Config, DeviceKind, DevicePreference, Precision};
pub use pipelines::translation::TranslatorConfig;
