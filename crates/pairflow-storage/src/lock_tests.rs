// SPDX-License-Identifier: MIT

use super::*;
use std::sync::{Arc, Barrier};
use std::time::Duration;

#[test]
fn acquires_and_releases_lock_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lock_path = dir.path().join("b_01.lock");

    let result = with_file_lock(&lock_path, Duration::from_secs(1), Duration::from_millis(5), || {
        assert!(lock_path.exists());
        Ok(42)
    });

    assert_eq!(result.expect("lock succeeds"), 42);
    assert!(!lock_path.exists(), "lock file must be removed after release");
}

#[test]
fn lock_file_removed_after_task_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lock_path = dir.path().join("b_01.lock");

    let result: Result<(), PairflowError> =
        with_file_lock(&lock_path, Duration::from_secs(1), Duration::from_millis(5), || {
            Err(PairflowError::StateConflict)
        });

    assert!(result.is_err());
    assert!(!lock_path.exists());
}

#[test]
fn lock_file_removed_after_panic() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lock_path = dir.path().join("b_01.lock");

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _: Result<(), PairflowError> =
            with_file_lock(&lock_path, Duration::from_secs(1), Duration::from_millis(5), || {
                panic!("boom");
            });
    }));

    assert!(outcome.is_err());
    assert!(!lock_path.exists(), "lock file must be removed even after a panic");
}

#[test]
fn second_acquirer_blocks_until_first_releases() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lock_path = dir.path().join("b_01.lock");
    let lock_path_thread = lock_path.clone();

    let barrier = Arc::new(Barrier::new(2));
    let barrier_thread = barrier.clone();

    let handle = std::thread::spawn(move || {
        with_file_lock(
            &lock_path_thread,
            Duration::from_secs(2),
            Duration::from_millis(5),
            move || {
                barrier_thread.wait();
                std::thread::sleep(Duration::from_millis(100));
                Ok(())
            },
        )
    });

    barrier.wait();
    // The first holder should already own the lock file by now.
    std::thread::sleep(Duration::from_millis(10));

    let started = std::time::Instant::now();
    let result: Result<(), PairflowError> =
        with_file_lock(&lock_path, Duration::from_secs(2), Duration::from_millis(5), || Ok(()));
    assert!(result.is_ok());
    assert!(started.elapsed() >= Duration::from_millis(50));

    handle.join().expect("first holder's thread").expect("first holder's task");
}

#[test]
fn lock_timeout_when_held_past_deadline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lock_path = dir.path().join("b_01.lock");

    // Simulate a held lock by creating the file directly, without releasing it.
    std::fs::File::create(&lock_path).expect("create lock file");

    let result: Result<(), PairflowError> = with_file_lock(
        &lock_path,
        Duration::from_millis(40),
        Duration::from_millis(5),
        || Ok(()),
    );

    match result {
        Err(PairflowError::LockTimeout { .. }) => {}
        other => panic!("expected LockTimeout, got {other:?}"),
    }
}
