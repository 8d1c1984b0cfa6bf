//! # Resource definitions for model weights, vocabularies and configuration files
//!
//! Fine-tuned checkpoints are stored on disk as a directory holding:
//! - model weights (`rust_model.ot`)
//! - the model configuration (`config.json`)
//! - the tokenizer vocabulary (`vocab.json`)
//! - the source sentence piece model (`source.spm`)
//!
//! Each file is referenced as a resource; `get_local_path` returns its location, failing with a
//! `ModelNotFoundError` when the file is missing so that incomplete checkpoints are reported
//! before any deserialization is attempted.

mod local;

use crate::common::error::TranslatorError;
pub use local::LocalResource;
use std::path::PathBuf;

/// # Resource Trait that can provide the location of the model, configuration or vocabulary resources
pub trait ResourceProvider {
    /// Provides the local path for a resource.
    ///
    /// # Returns
    ///
    /// * `PathBuf` pointing to the resource file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rust_bitranslator::resources::{LocalResource, ResourceProvider};
    /// use std::path::PathBuf;
    /// let config_resource = LocalResource {
    ///     local_path: PathBuf::from("path/to/config.json"),
    /// };
    /// let config_path = config_resource.get_local_path();
    /// ```
    fn get_local_path(&self) -> Result<PathBuf, TranslatorError>;
}
