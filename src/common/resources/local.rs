use crate::common::error::TranslatorError;
use crate::resources::ResourceProvider;
use std::path::{Path, PathBuf};

/// # Local resource
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LocalResource {
    /// Local path for the resource
    pub local_path: PathBuf,
}

impl ResourceProvider for LocalResource {
    /// Gets the path for a local resource.
    ///
    /// # Returns
    ///
    /// * `PathBuf` pointing to the resource file, or a `ModelNotFoundError` if nothing exists at
    ///   this location
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
    fn get_local_path(&self) -> Result<PathBuf, TranslatorError> {
        if self.local_path.exists() {
            Ok(self.local_path.clone())
        } else {
            Err(TranslatorError::ModelNotFoundError(format!(
                "{} does not exist",
                self.local_path.display()
            )))
        }
    }
}

impl From<PathBuf> for LocalResource {
    fn from(local_path: PathBuf) -> Self {
        LocalResource { local_path }
    }
}

impl From<&Path> for LocalResource {
    fn from(local_path: &Path) -> Self {
        LocalResource {
            local_path: local_path.to_path_buf(),
        }
    }
}
