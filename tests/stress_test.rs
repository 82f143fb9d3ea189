//! Concurrency tests for the settings store
//!
//! Many readers race a writer that keeps reloading. Every snapshot a reader
//! observes must be one of the documents that was installed, never a mix.

mod common;

use common::TestFixture;
use flowconf::flow::keys;
use serde_json::json;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex, mpsc};
use std::thread;
use std::time::Duration;

const READERS: usize = 8;
const RELOADS: usize = 200;

#[test]
fn test_readers_never_see_partial_reload() {
    let fixture = TestFixture::new();

    // Two documents whose fields always change together
    let variant = |i: usize| {
        let tag = if i % 2 == 0 { "even" } else { "odd" };
        json!({
            "userDir": format!("/data/{tag}"),
            "flowFile": format!("{tag}.json"),
            "editorTheme": {
                "theme": tag,
                "multiplayer": {"enabled": i % 2 == 0}
            }
        })
    };
    let even = fixture.validated(&[variant(0)]);
    let odd = fixture.validated(&[variant(1)]);

    fixture.store.initialize(even.clone()).unwrap();

    let store = fixture.store.clone();
    let barrier = Arc::new(Barrier::new(READERS + 1));
    let checked = Arc::new(AtomicUsize::new(0));

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let store = store.clone();
            let barrier = barrier.clone();
            let checked = checked.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..RELOADS {
                    let snapshot = store.snapshot().unwrap();
                    let theme = snapshot.get(keys::THEME).unwrap().as_str().unwrap();
                    assert_eq!(
                        snapshot.get(keys::USER_DIR),
                        Some(&json!(format!("/data/{theme}")))
                    );
                    assert_eq!(
                        snapshot.get(keys::FLOW_FILE),
                        Some(&json!(format!("{theme}.json")))
                    );
                    assert_eq!(
                        snapshot.get(keys::MULTIPLAYER_ENABLED),
                        Some(&json!(theme == "even"))
                    );
                    checked.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    barrier.wait();
    for i in 0..RELOADS {
        let next = if i % 2 == 0 { odd.clone() } else { even.clone() };
        store.reload(next).unwrap();
    }

    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(checked.load(Ordering::Relaxed), READERS * RELOADS);
    assert_eq!(store.generation(), 1 + RELOADS as u64);
}

#[test]
fn test_concurrent_initialize_only_one_wins() {
    let fixture = TestFixture::new();
    let settings = fixture.validated(&[json!({"userDir": "/data"})]);
    let barrier = Arc::new(Barrier::new(READERS));
    let wins = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..READERS)
        .map(|_| {
            let store = fixture.store.clone();
            let settings = settings.clone();
            let barrier = barrier.clone();
            let wins = wins.clone();
            thread::spawn(move || {
                barrier.wait();
                if store.initialize(settings).is_ok() {
                    wins.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(wins.load(Ordering::Relaxed), 1);
    assert_eq!(fixture.store.generation(), 1);
}

#[test]
fn test_listeners_fire_once_per_reload() {
    let fixture = TestFixture::new();
    let base = |enabled: bool| json!({"userDir": "/data", "editorTheme": {"multiplayer": {"enabled": enabled}}});
    fixture
        .store
        .initialize(fixture.validated(&[base(false)]))
        .unwrap();

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    fixture
        .store
        .events()
        .watch(keys::MULTIPLAYER_ENABLED, move |_, _, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

    let flips = 50;
    for i in 0..flips {
        let next = fixture.validated(&[base(i % 2 == 0)]);
        fixture.store.reload(next).unwrap();
    }
    // Reloading identical content notifies nobody
    let same = fixture.validated(&[base(flips % 2 == 0)]);
    let same_again = same.clone();
    fixture.store.reload(same).unwrap();
    fixture.store.reload(same_again).unwrap();

    assert_eq!(fired.load(Ordering::Relaxed), flips + 1);
}

#[test]
fn test_generation_never_lags_snapshot() {
    let fixture = TestFixture::new();
    let installs: Vec<_> = (0..RELOADS)
        .map(|i| fixture.validated(&[json!({"userDir": format!("/data/{i}")})]))
        .collect();
    fixture
        .store
        .initialize(fixture.validated(&[json!({"userDir": "/data/init"})]))
        .unwrap();

    let store = fixture.store.clone();
    let barrier = Arc::new(Barrier::new(READERS + 1));

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let store = store.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..RELOADS {
                    let snapshot = store.snapshot().unwrap();
                    let generation = store.generation();
                    let user_dir = snapshot.get(keys::USER_DIR).unwrap().as_str().unwrap();
                    // Reload i installs generation i + 2
                    if let Ok(i) = user_dir.trim_start_matches("/data/").parse::<u64>() {
                        assert!(
                            generation >= i + 2,
                            "snapshot {i} visible at generation {generation}"
                        );
                    }
                }
            })
        })
        .collect();

    barrier.wait();
    for settings in installs {
        store.reload(settings).unwrap();
    }
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn test_overlapping_reloads_notify_in_swap_order() {
    let fixture = TestFixture::new();
    fixture
        .store
        .initialize(fixture.validated(&[json!({"userDir": "/x"})]))
        .unwrap();

    let last_seen: Arc<Mutex<Option<Value>>> = Arc::default();
    let (started, slow_listener_running) = mpsc::channel();
    let seen = last_seen.clone();
    fixture
        .store
        .events()
        .watch(keys::USER_DIR, move |_, _, new| {
            if new == &json!("/a") {
                started.send(()).unwrap();
                thread::sleep(Duration::from_millis(300));
            }
            *seen.lock().unwrap() = Some(new.clone());
        });

    let first = fixture.validated(&[json!({"userDir": "/a"})]);
    let second = fixture.validated(&[json!({"userDir": "/b"})]);

    let store = fixture.store.clone();
    let slow = thread::spawn(move || store.reload(first).unwrap());

    // Start the second reload while the first one is still notifying
    slow_listener_running.recv().unwrap();
    fixture.store.reload(second).unwrap();
    slow.join().unwrap();

    let current = fixture.store.get(keys::USER_DIR).unwrap();
    assert_eq!(current, Some(json!("/b")));
    assert_eq!(*last_seen.lock().unwrap(), current);
}
