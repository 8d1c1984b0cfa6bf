mod common;

use common::{all_checkpoints, create_checkpoints, FakeStore};
use rust_bitranslator::pipelines::common::{ModelTier, TranslationDirection};
use rust_bitranslator::pipelines::session::{AppState, TranslatorSession};
use rust_bitranslator::pipelines::worker::TranslatorStatus;
use rust_bitranslator::{TranslatorConfig, TranslatorError};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

type Outputs = Arc<Mutex<Vec<Result<String, TranslatorError>>>>;

fn collect(outputs: &Outputs) -> impl FnOnce(Result<String, TranslatorError>) + Send + 'static {
    let outputs = Arc::clone(outputs);
    move |result| outputs.lock().unwrap().push(result)
}

fn pump_until(session: &TranslatorSession, outputs: &Outputs, count: usize) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while outputs.lock().unwrap().len() < count && Instant::now() < deadline {
        session.pump_blocking(Duration::from_millis(50));
    }
}

fn test_config(model_root: &Path) -> TranslatorConfig {
    TranslatorConfig {
        model_root: model_root.to_path_buf(),
        debounce_ms: 100,
        ..Default::default()
    }
}

#[test]
fn test_session_translates_with_current_state() -> anyhow::Result<()> {
    //    Given
    let model_root = tempfile::tempdir()?;
    create_checkpoints(model_root.path(), &all_checkpoints())?;
    let store = FakeStore::default();
    let mut session = TranslatorSession::new(
        Box::new(store.clone()),
        &test_config(model_root.path()),
        None,
    );
    let outputs: Outputs = Arc::new(Mutex::new(vec![]));
    assert_eq!(*session.state(), AppState::default());

    //    When
    session.translate("Hello. How are you?", collect(&outputs))?;
    pump_until(&session, &outputs, 1);
    assert_eq!(
        session.toggle_direction(),
        TranslationDirection::TargetToSource
    );
    session.set_tier(ModelTier::Full);
    session.translate("你好。 再见。", collect(&outputs))?;
    pump_until(&session, &outputs, 2);
    session.pump();

    //    Then
    let outputs = outputs.lock().unwrap();
    assert_eq!(outputs[0].as_deref().ok(), Some("HELLO. HOW ARE YOU?"));
    assert_eq!(outputs[1].as_deref().ok(), Some("你好。 再见。"));
    assert_eq!(store.model_loads(), 2);
    assert!(matches!(session.status(), Some(TranslatorStatus::Ready(key))
        if key.tier == ModelTier::Full && key.direction == TranslationDirection::TargetToSource));
    Ok(())
}

#[test]
fn test_input_changes_are_debounced() -> anyhow::Result<()> {
    let model_root = tempfile::tempdir()?;
    create_checkpoints(model_root.path(), &all_checkpoints())?;
    let store = FakeStore::default();
    let mut session = TranslatorSession::new(
        Box::new(store.clone()),
        &test_config(model_root.path()),
        None,
    );
    let outputs: Outputs = Arc::new(Mutex::new(vec![]));

    //    When: auto-translate is off
    assert!(!session.input_changed("Good morning", collect(&outputs)));

    //    When: auto-translate is on
    session.set_auto_translate(true);
    assert!(session.input_changed("Good morn", collect(&outputs)));
    assert!(session.input_changed("Good morning", collect(&outputs)));
    assert!(session.input_changed("Good morning.", collect(&outputs)));
    assert!(!session.input_changed("Go", collect(&outputs)));
    pump_until(&session, &outputs, 1);
    thread::sleep(Duration::from_millis(300));
    session.pump();

    //    Then
    let outputs = outputs.lock().unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].as_deref().ok(), Some("GOOD MORNING."));
    assert_eq!(store.inputs(), vec!["Good morning."]);
    Ok(())
}

#[test]
fn test_disabling_auto_translate_cancels_pending_trigger() -> anyhow::Result<()> {
    let model_root = tempfile::tempdir()?;
    create_checkpoints(model_root.path(), &all_checkpoints())?;
    let store = FakeStore::default();
    let mut session = TranslatorSession::new(
        Box::new(store.clone()),
        &test_config(model_root.path()),
        None,
    );
    let outputs: Outputs = Arc::new(Mutex::new(vec![]));

    session.set_auto_translate(true);
    assert!(session.input_changed("Pending translation", collect(&outputs)));
    session.set_auto_translate(false);
    thread::sleep(Duration::from_millis(400));
    session.pump();

    assert!(outputs.lock().unwrap().is_empty());
    assert!(store.inputs().is_empty());
    Ok(())
}

#[test]
fn test_close_completes_queued_jobs() -> anyhow::Result<()> {
    let model_root = tempfile::tempdir()?;
    create_checkpoints(model_root.path(), &all_checkpoints())?;
    let statuses = Arc::new(Mutex::new(vec![]));
    let recorded = Arc::clone(&statuses);
    let session = TranslatorSession::new(
        Box::new(FakeStore::default()),
        &test_config(model_root.path()),
        Some(Arc::new(move |status: TranslatorStatus| {
            recorded.lock().unwrap().push(status)
        })),
    );
    let outputs: Outputs = Arc::new(Mutex::new(vec![]));

    session.preload()?;
    session.translate("SLOW first.", collect(&outputs))?;
    session.translate("Second.", collect(&outputs))?;
    session.close()?;

    assert_eq!(outputs.lock().unwrap().len(), 2);
    assert!(matches!(
        statuses.lock().unwrap().first(),
        Some(TranslatorStatus::Loading(_))
    ));
    Ok(())
}

#[test]
fn test_short_submitted_input_is_translated_in_auto_mode() -> anyhow::Result<()> {
    //    Given: auto-translate is on, the inputs are complete lines
    let model_root = tempfile::tempdir()?;
    create_checkpoints(model_root.path(), &all_checkpoints())?;
    let store = FakeStore::default();
    let mut session = TranslatorSession::new(
        Box::new(store.clone()),
        &test_config(model_root.path()),
        None,
    );
    session.set_auto_translate(true);
    let outputs: Outputs = Arc::new(Mutex::new(vec![]));

    //    When
    let short_debounced = session.submit_input("你好", collect(&outputs))?;
    pump_until(&session, &outputs, 1);
    let long_debounced = session.submit_input("Good morning.", collect(&outputs))?;
    pump_until(&session, &outputs, 2);

    //    Then
    assert!(!short_debounced);
    assert!(long_debounced);
    let outputs = outputs.lock().unwrap();
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].as_deref().ok(), Some("你好"));
    assert_eq!(outputs[1].as_deref().ok(), Some("GOOD MORNING."));
    assert_eq!(store.inputs(), vec!["你好", "Good morning."]);
    Ok(())
}
