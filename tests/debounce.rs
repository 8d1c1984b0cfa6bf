use rust_bitranslator::pipelines::debounce::Debouncer;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

type Fired = Arc<Mutex<Vec<(String, Instant)>>>;

fn record(fired: &Fired, input: &str) -> impl FnOnce() + Send + 'static {
    let fired = Arc::clone(fired);
    let input = input.to_string();
    move || fired.lock().unwrap().push((input, Instant::now()))
}

#[test]
fn test_rapid_notifications_fire_once() -> anyhow::Result<()> {
    //    Given
    let debouncer = Debouncer::new(Duration::from_millis(800), 5);
    let fired: Fired = Arc::new(Mutex::new(vec![]));

    //    When
    let mut last_call = Instant::now();
    for input in ["Hello w", "Hello wo", "Hello wor"] {
        last_call = Instant::now();
        assert!(debouncer.notify(input, record(&fired, input)));
        thread::sleep(Duration::from_millis(200));
    }
    thread::sleep(Duration::from_millis(1400));

    //    Then
    let fired = fired.lock().unwrap();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].0, "Hello wor");
    assert!(fired[0].1.duration_since(last_call) >= Duration::from_millis(800));
    Ok(())
}

#[test]
fn test_short_input_keeps_pending_trigger() -> anyhow::Result<()> {
    let debouncer = Debouncer::new(Duration::from_millis(100), 5);
    let fired: Fired = Arc::new(Mutex::new(vec![]));

    assert!(debouncer.notify("Hello world", record(&fired, "Hello world")));
    assert!(!debouncer.notify("  Hi  ", record(&fired, "Hi")));
    assert!(!debouncer.notify("", record(&fired, "")));
    thread::sleep(Duration::from_millis(500));

    let fired = fired.lock().unwrap();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].0, "Hello world");
    Ok(())
}

#[test]
fn test_min_chars_counts_characters() -> anyhow::Result<()> {
    let debouncer = Debouncer::new(Duration::from_millis(50), 5);
    let fired: Fired = Arc::new(Mutex::new(vec![]));

    // 4 characters, 12 bytes
    assert!(!debouncer.notify("你好世界", record(&fired, "你好世界")));
    assert!(debouncer.notify("你好，世界", record(&fired, "你好，世界")));
    thread::sleep(Duration::from_millis(300));

    assert_eq!(fired.lock().unwrap().len(), 1);
    Ok(())
}

#[test]
fn test_separate_bursts_fire_separately() -> anyhow::Result<()> {
    let debouncer = Debouncer::new(Duration::from_millis(100), 1);
    let fired: Fired = Arc::new(Mutex::new(vec![]));

    debouncer.notify("first", record(&fired, "first"));
    thread::sleep(Duration::from_millis(400));
    debouncer.notify("second", record(&fired, "second"));
    thread::sleep(Duration::from_millis(400));

    let fired: Vec<String> = fired.lock().unwrap().iter().map(|(input, _)| input.clone()).collect();
    assert_eq!(fired, vec!["first", "second"]);
    Ok(())
}

#[test]
fn test_cancelled_trigger_never_fires() -> anyhow::Result<()> {
    let debouncer = Debouncer::new(Duration::from_millis(100), 1);
    let fired: Fired = Arc::new(Mutex::new(vec![]));

    debouncer.notify("pending", record(&fired, "pending"));
    debouncer.cancel();
    thread::sleep(Duration::from_millis(400));

    assert!(fired.lock().unwrap().is_empty());
    Ok(())
}

#[test]
fn test_dropping_the_controller_drops_the_trigger() -> anyhow::Result<()> {
    let debouncer = Debouncer::new(Duration::from_millis(100), 1);
    let fired: Fired = Arc::new(Mutex::new(vec![]));

    debouncer.notify("pending", record(&fired, "pending"));
    drop(debouncer);
    thread::sleep(Duration::from_millis(400));

    assert!(fired.lock().unwrap().is_empty());
    Ok(())
}
