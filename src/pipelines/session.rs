//! # Translator session
//!
//! Explicit application state and the wiring of the background worker, the debounce controller
//! and the dispatcher. The session is owned by the interactive context: results and status
//! updates are only delivered while the owner pumps the session (`pump` or `pump_blocking`).
//!
//! ```no_run
//! # use rust_bitranslator::pipelines::common::ModelStore;
//! use rust_bitranslator::pipelines::session::TranslatorSession;
//! use rust_bitranslator::TranslatorConfig;
//! use std::time::Duration;
//!
//! # fn run(store: Box<dyn ModelStore + Send>) -> anyhow::Result<()> {
//! let mut session = TranslatorSession::new(store, &TranslatorConfig::default(), None);
//! session.translate("Good morning. The weather is nice today.", |result| {
//!     if let Ok(translation) = result {
//!         println!("{}", translation);
//!     }
//! })?;
//! session.pump_blocking(Duration::from_secs(60));
//! session.toggle_direction();
//! # Ok(())
//! # }
//! ```
use crate::common::device::{DevicePreference, Precision};
use crate::common::error::TranslatorError;
use crate::pipelines::cache::ModelCache;
use crate::pipelines::common::{ModelStore, ModelTier, TranslationDirection};
use crate::pipelines::debounce::Debouncer;
use crate::pipelines::dispatch::{dispatcher, Dispatcher};
use crate::pipelines::translation::{BatchTranslator, TranslatorConfig};
use crate::pipelines::worker::{
    StatusListener, TranslationJob, TranslationWorker, TranslatorStatus, WorkerState,
};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// # User-selected translation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppState {
    pub direction: TranslationDirection,
    pub tier: ModelTier,
    pub auto_translate: bool,
    pub device: DevicePreference,
    pub precision: Precision,
}

impl AppState {
    pub fn from_config(config: &TranslatorConfig) -> AppState {
        AppState {
            direction: config.direction,
            tier: config.tier,
            auto_translate: config.auto_translate,
            device: config.device,
            precision: config.precision,
        }
    }

    /// Creates a job for `text` with the current settings
    pub fn job(&self, text: impl Into<String>) -> TranslationJob {
        TranslationJob::new(text, self.direction, self.tier)
            .with_device(self.device)
            .with_precision(self.precision)
    }
}

/// # Translator session
pub struct TranslatorSession {
    state: AppState,
    worker: TranslationWorker,
    worker_thread: JoinHandle<()>,
    debouncer: Debouncer,
    dispatcher: Dispatcher,
    status: Arc<Mutex<Option<TranslatorStatus>>>,
}

impl TranslatorSession {
    /// Starts a session backed by `store`.
    ///
    /// # Arguments
    ///
    /// * `store` - backend loading tokenizers and models, moved to the worker thread
    /// * `config` - `TranslatorConfig` providing the initial state, the checkpoint layout and the
    ///   batching, generation and debounce settings
    /// * `on_status` - optional callback receiving every status update on the interactive context
    pub fn new(
        store: Box<dyn ModelStore + Send>,
        config: &TranslatorConfig,
        on_status: Option<StatusListener>,
    ) -> TranslatorSession {
        let cache_config = config.clone();
        TranslatorSession::with_cache(
            move || ModelCache::from_config(store, &cache_config),
            BatchTranslator::from_config(config),
            AppState::from_config(config),
            Debouncer::new(config.debounce_interval(), config.min_auto_chars),
            on_status,
        )
    }

    pub fn with_cache<F>(
        cache_factory: F,
        translator: BatchTranslator,
        state: AppState,
        debouncer: Debouncer,
        on_status: Option<StatusListener>,
    ) -> TranslatorSession
    where
        F: FnOnce() -> ModelCache + Send + 'static,
    {
        let (handle, dispatcher) = dispatcher();
        let status = Arc::new(Mutex::new(None));
        let last_status = Arc::clone(&status);
        let listener: StatusListener = Arc::new(move |update: TranslatorStatus| {
            if let Ok(mut last) = last_status.lock() {
                *last = Some(update.clone());
            }
            if let Some(on_status) = &on_status {
                on_status(update);
            }
        });
        let (worker_thread, worker) =
            TranslationWorker::spawn(cache_factory, translator, handle, Some(listener));
        TranslatorSession {
            state,
            worker,
            worker_thread,
            debouncer,
            dispatcher,
            status,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Last status received from the worker, `None` before the first update
    pub fn status(&self) -> Option<TranslatorStatus> {
        self.status.lock().ok().and_then(|status| status.clone())
    }

    pub fn worker_state(&self) -> WorkerState {
        self.worker.state()
    }

    /// Submits `text` for translation with the current settings.
    pub fn translate<F>(&self, text: &str, on_result: F) -> Result<Uuid, TranslatorError>
    where
        F: FnOnce(Result<String, TranslatorError>) + Send + 'static,
    {
        self.worker.submit(self.state.job(text), on_result)
    }

    /// Notifies the session that the input changed. When auto-translate is enabled, the text is
    /// submitted once the input has been quiet for the debounce interval; the settings are
    /// captured at notification time.
    ///
    /// Returns `true` if a translation was scheduled.
    pub fn input_changed<F>(&self, text: &str, on_result: F) -> bool
    where
        F: FnOnce(Result<String, TranslatorError>) + Send + 'static,
    {
        if !self.state.auto_translate {
            return false;
        }
        let job = self.state.job(text);
        let worker = self.worker.clone();
        self.debouncer.notify(text, move || {
            if let Err(error) = worker.submit(job, on_result) {
                warn!("could not submit the debounced translation: {}", error);
            }
        })
    }

    /// Submits a completed input, e.g. a line typed in a terminal. With auto-translate enabled,
    /// inputs passing the debounce guard are debounced and shorter ones are translated right away,
    /// so a complete input is never dropped.
    ///
    /// Returns `true` if the translation was debounced.
    pub fn submit_input<F>(&self, text: &str, on_result: F) -> Result<bool, TranslatorError>
    where
        F: FnOnce(Result<String, TranslatorError>) + Send + 'static,
    {
        if self.state.auto_translate && text.trim().chars().count() >= self.debouncer.min_chars() {
            return Ok(self.input_changed(text, on_result));
        }
        self.translate(text, on_result)?;
        Ok(false)
    }

    pub fn toggle_direction(&mut self) -> TranslationDirection {
        self.state.direction = self.state.direction.toggle();
        info!("direction set to {}", self.state.direction);
        self.state.direction
    }

    pub fn set_direction(&mut self, direction: TranslationDirection) {
        self.state.direction = direction;
    }

    pub fn set_tier(&mut self, tier: ModelTier) {
        self.state.tier = tier;
        info!("tier set to {}", tier);
    }

    /// Enables or disables auto-translate. Disabling it drops a pending debounced translation.
    pub fn set_auto_translate(&mut self, auto_translate: bool) {
        self.state.auto_translate = auto_translate;
        if !auto_translate {
            self.debouncer.cancel();
        }
    }

    pub fn set_device(&mut self, device: DevicePreference) {
        self.state.device = device;
    }

    pub fn set_precision(&mut self, precision: Precision) {
        self.state.precision = precision;
    }

    /// Loads the model for the current settings in the background.
    pub fn preload(&self) -> Result<(), TranslatorError> {
        self.worker.preload(
            self.state.tier,
            self.state.direction,
            self.state.device,
            self.state.precision,
        )
    }

    /// Runs the callbacks delivered so far, returns how many ran.
    pub fn pump(&self) -> usize {
        self.dispatcher.run_pending()
    }

    /// Waits up to `timeout` for a callback and runs every delivered callback.
    pub fn pump_blocking(&self, timeout: Duration) -> usize {
        self.dispatcher.wait_and_run(timeout)
    }

    /// Stops the session: pending debounced translations are dropped, queued jobs are completed
    /// and their callbacks run before returning.
    pub fn close(self) -> Result<(), TranslatorError> {
        let TranslatorSession {
            worker,
            worker_thread,
            debouncer,
            dispatcher,
            ..
        } = self;
        drop(debouncer);
        drop(worker);
        worker_thread
            .join()
            .map_err(|_| TranslatorError::WorkerError("the worker thread panicked".to_string()))?;
        dispatcher.run_pending();
        Ok(())
    }
}
