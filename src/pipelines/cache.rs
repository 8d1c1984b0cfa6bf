//! # Model cache
//!
//! Loading a Marian checkpoint takes seconds: the cache keeps every (model, tokenizer, device)
//! triple it loads for the lifetime of the process, keyed by tier, direction, device and
//! precision. The key domain is closed (2 tiers × 2 directions × 3 device/precision
//! combinations), entries are therefore never evicted.
//!
//! Cache population can be observed through a listener receiving `CacheEvent`s, used to report
//! the loading status to the user.
use crate::common::device::{DeviceKind, DevicePreference, Precision};
use crate::common::error::TranslatorError;
use crate::marian::CheckpointLayout;
use crate::pipelines::common::{
    Checkpoint, LoadOptions, LoadedModel, ModelStore, ModelTier, TranslationDirection,
};
use crate::pipelines::translation::TranslatorConfig;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// # Identifier of a loaded model instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub tier: ModelTier,
    pub direction: TranslationDirection,
    pub device: DeviceKind,
    pub precision: Precision,
}

impl CacheKey {
    /// Creates a key, normalizing the precision against the device: half precision is only
    /// applied on an accelerator, a CPU key always uses full precision.
    pub fn new(
        tier: ModelTier,
        direction: TranslationDirection,
        device: DeviceKind,
        precision: Precision,
    ) -> CacheKey {
        CacheKey {
            tier,
            direction,
            device,
            precision: precision.effective_on(device),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} model ({}, {})",
            self.tier, self.direction, self.device, self.precision
        )
    }
}

/// # Cache population events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Loading(CacheKey),
    Loaded(CacheKey),
    Failed(CacheKey, String),
}

type CacheListener = Box<dyn Fn(&CacheEvent) + Send>;

/// # Cache of loaded models
pub struct ModelCache {
    store: Box<dyn ModelStore + Send>,
    model_root: PathBuf,
    layout: CheckpointLayout,
    pretrained_fallback: bool,
    entries: HashMap<CacheKey, LoadedModel>,
    listener: Option<CacheListener>,
}

impl ModelCache {
    pub fn new(
        store: Box<dyn ModelStore + Send>,
        model_root: impl Into<PathBuf>,
        layout: CheckpointLayout,
    ) -> ModelCache {
        ModelCache {
            store,
            model_root: model_root.into(),
            layout,
            pretrained_fallback: false,
            entries: HashMap::new(),
            listener: None,
        }
    }

    pub fn from_config(store: Box<dyn ModelStore + Send>, config: &TranslatorConfig) -> ModelCache {
        ModelCache::new(store, config.model_root.clone(), config.checkpoints.clone())
            .with_pretrained_fallback(config.pretrained_fallback)
    }

    /// Loads the published Opus-MT checkpoint when a fine-tuned checkpoint is missing.
    pub fn with_pretrained_fallback(mut self, pretrained_fallback: bool) -> ModelCache {
        self.pretrained_fallback = pretrained_fallback;
        self
    }

    pub fn with_listener<F>(mut self, listener: F) -> ModelCache
    where
        F: Fn(&CacheEvent) + Send + 'static,
    {
        self.set_listener(listener);
        self
    }

    /// Replaces the listener notified of cache population events.
    pub fn set_listener<F>(&mut self, listener: F)
    where
        F: Fn(&CacheEvent) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn model_root(&self) -> &Path {
        &self.model_root
    }

    pub fn resolve_device(&self, preference: DevicePreference) -> DeviceKind {
        preference.resolve(self.store.cuda_available())
    }

    /// Builds the key for a request, resolving the device preference against the store.
    pub fn key(
        &self,
        tier: ModelTier,
        direction: TranslationDirection,
        device: DevicePreference,
        precision: Precision,
    ) -> CacheKey {
        CacheKey::new(tier, direction, self.resolve_device(device), precision)
    }

    pub fn checkpoint_path(&self, tier: ModelTier, direction: TranslationDirection) -> PathBuf {
        self.layout.resolve(&self.model_root, tier, direction)
    }

    pub fn is_cached(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the model for a key, loading it on first request.
    ///
    /// # Arguments
    ///
    /// * `key` - `CacheKey` of the model
    ///
    /// # Returns
    ///
    /// * `&LoadedModel` - the cached triple. Fails with a `ModelNotFoundError` if the checkpoint
    ///   directory does not exist (and no fallback is allowed) or with a `LoadError` if the
    ///   tokenizer or model cannot be loaded. Nothing is cached on failure.
    pub fn acquire(&mut self, key: CacheKey) -> Result<&LoadedModel, TranslatorError> {
        if self.entries.contains_key(&key) {
            debug!("cache hit for {}", key);
            return Ok(&self.entries[&key]);
        }
        self.emit(CacheEvent::Loading(key));
        let loaded = match self.load(&key) {
            Ok(loaded) => loaded,
            Err(error) => {
                warn!("failed to load {}: {}", key, error);
                self.emit(CacheEvent::Failed(key, error.to_string()));
                return Err(error);
            }
        };
        info!("loaded {} from {}", key, loaded.checkpoint);
        self.emit(CacheEvent::Loaded(key));
        Ok(self.entries.entry(key).or_insert(loaded))
    }

    fn resolve_checkpoint(
        &self,
        tier: ModelTier,
        direction: TranslationDirection,
    ) -> Result<Checkpoint, TranslatorError> {
        let path = self.checkpoint_path(tier, direction);
        if path.is_dir() {
            Ok(Checkpoint::Local(path))
        } else if self.pretrained_fallback {
            info!(
                "no {} checkpoint at {}, falling back to the pretrained model",
                tier,
                path.display()
            );
            Ok(Checkpoint::Pretrained(direction))
        } else {
            Err(TranslatorError::ModelNotFoundError(format!(
                "no {} {} checkpoint at {}",
                tier,
                direction,
                path.display()
            )))
        }
    }

    fn load(&self, key: &CacheKey) -> Result<LoadedModel, TranslatorError> {
        let checkpoint = self.resolve_checkpoint(key.tier, key.direction)?;
        let options = LoadOptions {
            device: key.device,
            precision: key.precision,
        };
        let tokenizer = self
            .store
            .load_tokenizer(&checkpoint)
            .map_err(as_load_error)?;
        let model = self
            .store
            .load_model(&checkpoint, &options)
            .map_err(as_load_error)?;
        Ok(LoadedModel {
            model,
            tokenizer,
            device: key.device,
            precision: key.precision,
            checkpoint,
        })
    }

    fn emit(&self, event: CacheEvent) {
        if let Some(listener) = &self.listener {
            listener(&event);
        }
    }
}

fn as_load_error(error: TranslatorError) -> TranslatorError {
    match error {
        TranslatorError::ModelNotFoundError(_) | TranslatorError::LoadError(_) => error,
        other => TranslatorError::LoadError(other.to_string()),
    }
}
