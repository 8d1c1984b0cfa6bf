//! # Background translation worker
//!
//! Translation runs on a single dedicated thread owning the `ModelCache`. Requests are queued
//! and executed one at a time in submission order; an in-flight job is never preempted nor
//! cancelled. When a job completes, its completion callback is posted to the interactive context
//! through an `InteractiveHandle` rather than being called from the worker thread.
//!
//! Failures (including panics) are caught at the worker boundary and delivered to the job's
//! callback as an error: the worker keeps serving subsequent requests.
//!
//! ```no_run
//! # use rust_bitranslator::pipelines::common::ModelStore;
//! use rust_bitranslator::pipelines::cache::ModelCache;
//! use rust_bitranslator::pipelines::dispatch::dispatcher;
//! use rust_bitranslator::pipelines::translation::BatchTranslator;
//! use rust_bitranslator::pipelines::worker::{TranslationJob, TranslationWorker};
//! use rust_bitranslator::TranslatorConfig;
//! use std::time::Duration;
//!
//! # fn run(store: Box<dyn ModelStore + Send>) -> anyhow::Result<()> {
//! let config = TranslatorConfig::default();
//! let (handle, dispatcher) = dispatcher();
//! let translator = BatchTranslator::from_config(&config);
//! let (_thread, worker) = TranslationWorker::spawn(
//!     move || ModelCache::from_config(store, &config),
//!     translator,
//!     handle,
//!     None,
//! );
//!
//! let job = TranslationJob::new("Hello. How are you?", Default::default(), Default::default());
//! worker.submit(job, |result| match result {
//!     Ok(translation) => println!("{}", translation),
//!     Err(error) => eprintln!("{}", error),
//! })?;
//! dispatcher.wait_and_run(Duration::from_secs(60));
//! # Ok(())
//! # }
//! ```
use crate::common::device::{DevicePreference, Precision};
use crate::common::error::TranslatorError;
use crate::pipelines::cache::{CacheEvent, CacheKey, ModelCache};
use crate::pipelines::common::{ModelTier, TranslationDirection};
use crate::pipelines::dispatch::InteractiveHandle;
use crate::pipelines::translation::BatchTranslator;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};
use uuid::Uuid;

/// # Translation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationJob {
    pub id: Uuid,
    pub text: String,
    pub direction: TranslationDirection,
    pub tier: ModelTier,
    pub device: DevicePreference,
    pub precision: Precision,
}

impl TranslationJob {
    pub fn new(
        text: impl Into<String>,
        direction: TranslationDirection,
        tier: ModelTier,
    ) -> TranslationJob {
        TranslationJob {
            id: Uuid::new_v4(),
            text: text.into(),
            direction,
            tier,
            device: DevicePreference::Auto,
            precision: Precision::Full,
        }
    }

    pub fn with_device(mut self, device: DevicePreference) -> TranslationJob {
        self.device = device;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> TranslationJob {
        self.precision = precision;
        self
    }
}

/// # Status reported to the interactive context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslatorStatus {
    /// A model is being loaded
    Loading(CacheKey),
    /// A model is loaded and the last request completed
    Ready(CacheKey),
    /// A job is being translated, `completed` out of `total` chunks are done
    Translating {
        job: Uuid,
        completed: usize,
        total: usize,
    },
    /// The last request failed
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Busy,
}

pub type Completion = Box<dyn FnOnce(Result<String, TranslatorError>) + Send>;
pub type StatusListener = Arc<dyn Fn(TranslatorStatus) + Send + Sync>;

enum WorkerRequest {
    Translate(TranslationJob, Completion),
    Preload(PreloadRequest),
}

struct PreloadRequest {
    tier: ModelTier,
    direction: TranslationDirection,
    device: DevicePreference,
    precision: Precision,
}

/// Posts status updates to the interactive context
#[derive(Clone)]
struct StatusReporter {
    interactive: InteractiveHandle,
    listener: Option<StatusListener>,
}

impl StatusReporter {
    fn report(&self, status: TranslatorStatus) {
        if let Some(listener) = &self.listener {
            let listener = Arc::clone(listener);
            self.interactive.post(move || listener(status));
        }
    }
}

/// # Handle to the background worker
/// Cloning the handle does not spawn a new worker. The worker thread stops once every handle
/// has been dropped and the queue is drained.
#[derive(Clone)]
pub struct TranslationWorker {
    sender: mpsc::Sender<WorkerRequest>,
    busy: Arc<AtomicBool>,
    queued: Arc<AtomicUsize>,
}

impl TranslationWorker {
    /// Spawns the worker thread.
    ///
    /// # Arguments
    ///
    /// * `cache_factory` - builds the `ModelCache` on the worker thread. The worker installs its
    ///   own listener on the cache to report loading statuses.
    /// * `translator` - `BatchTranslator` used for every job
    /// * `interactive` - handle used to post completions and statuses to the interactive context
    /// * `status_listener` - optional callback receiving `TranslatorStatus` updates, called on the
    ///   interactive context
    pub fn spawn<F>(
        cache_factory: F,
        translator: BatchTranslator,
        interactive: InteractiveHandle,
        status_listener: Option<StatusListener>,
    ) -> (JoinHandle<()>, TranslationWorker)
    where
        F: FnOnce() -> ModelCache + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let busy = Arc::new(AtomicBool::new(false));
        let queued = Arc::new(AtomicUsize::new(0));
        let reporter = StatusReporter {
            interactive,
            listener: status_listener,
        };
        let runner_busy = Arc::clone(&busy);
        let runner_queued = Arc::clone(&queued);
        let handle = thread::spawn(move || {
            let cache = cache_factory();
            Self::runner(cache, translator, receiver, reporter, runner_busy, runner_queued)
        });
        (
            handle,
            TranslationWorker {
                sender,
                busy,
                queued,
            },
        )
    }

    /// Queues a translation job. `completion` is called on the interactive context with the
    /// translation or the error that interrupted the job.
    pub fn submit<F>(&self, job: TranslationJob, completion: F) -> Result<Uuid, TranslatorError>
    where
        F: FnOnce(Result<String, TranslatorError>) + Send + 'static,
    {
        let id = job.id;
        self.enqueue(WorkerRequest::Translate(job, Box::new(completion)))?;
        debug!("queued job {}", id);
        Ok(id)
    }

    /// Queues the loading of a model, reported through the status listener only.
    pub fn preload(
        &self,
        tier: ModelTier,
        direction: TranslationDirection,
        device: DevicePreference,
        precision: Precision,
    ) -> Result<(), TranslatorError> {
        self.enqueue(WorkerRequest::Preload(PreloadRequest {
            tier,
            direction,
            device,
            precision,
        }))
    }

    pub fn state(&self) -> WorkerState {
        if self.busy.load(Ordering::SeqCst) {
            WorkerState::Busy
        } else {
            WorkerState::Idle
        }
    }

    /// Number of requests submitted and not yet completed (including the in-flight one)
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    fn enqueue(&self, request: WorkerRequest) -> Result<(), TranslatorError> {
        self.queued.fetch_add(1, Ordering::SeqCst);
        self.sender.send(request).map_err(|_| {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            TranslatorError::WorkerError("the translation worker has stopped".to_string())
        })
    }

    fn runner(
        mut cache: ModelCache,
        translator: BatchTranslator,
        receiver: mpsc::Receiver<WorkerRequest>,
        reporter: StatusReporter,
        busy: Arc<AtomicBool>,
        queued: Arc<AtomicUsize>,
    ) {
        let cache_reporter = reporter.clone();
        cache.set_listener(move |event| {
            if let CacheEvent::Loading(key) = event {
                cache_reporter.report(TranslatorStatus::Loading(*key));
            }
        });
        info!("translation worker started");

        while let Ok(request) = receiver.recv() {
            busy.store(true, Ordering::SeqCst);
            match request {
                WorkerRequest::Translate(job, completion) => {
                    let job_id = job.id;
                    let result =
                        guarded(|| Self::translate(&mut cache, &translator, &job, &reporter));
                    let result = match result {
                        Ok((key, translation)) => {
                            info!("job {} completed", job_id);
                            reporter.report(TranslatorStatus::Ready(key));
                            Ok(translation)
                        }
                        Err(error) => {
                            error!("job {} failed: {}", job_id, error);
                            reporter.report(TranslatorStatus::Error(error.to_string()));
                            Err(error)
                        }
                    };
                    reporter.interactive.post(move || completion(result));
                }
                WorkerRequest::Preload(request) => {
                    let key = cache.key(
                        request.tier,
                        request.direction,
                        request.device,
                        request.precision,
                    );
                    match guarded(|| cache.acquire(key).map(|_| ())) {
                        Ok(()) => reporter.report(TranslatorStatus::Ready(key)),
                        Err(error) => {
                            error!("preloading {} failed: {}", key, error);
                            reporter.report(TranslatorStatus::Error(error.to_string()))
                        }
                    }
                }
            }
            queued.fetch_sub(1, Ordering::SeqCst);
            busy.store(false, Ordering::SeqCst);
        }
        info!("translation worker stopped");
    }

    fn translate(
        cache: &mut ModelCache,
        translator: &BatchTranslator,
        job: &TranslationJob,
        reporter: &StatusReporter,
    ) -> Result<(CacheKey, String), TranslatorError> {
        let key = cache.key(job.tier, job.direction, job.device, job.precision);
        let model = cache.acquire(key)?;
        let translation = translator.translate_with_progress(&job.text, model, |completed, total| {
            reporter.report(TranslatorStatus::Translating {
                job: job.id,
                completed,
                total,
            })
        });
        Ok((key, translation))
    }
}

/// Runs `f`, converting a panic into a `WorkerError`.
fn guarded<T, F>(f: F) -> Result<T, TranslatorError>
where
    F: FnOnce() -> Result<T, TranslatorError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(TranslatorError::WorkerError(format!(
            "translation panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown cause".to_string()
    }
}
