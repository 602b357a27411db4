use super::*;
use crate::fiber::Fiber;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Job that reports the thread it ran on
fn reporting_job() -> (Job, mpsc::Receiver<thread::ThreadId>) {
    let (tx, rx) = mpsc::channel();
    let job: Job = Box::new(move || {
        let _ = tx.send(thread::current().id());
    });
    (job, rx)
}

#[test]
fn test_inline_spawner_runs_before_returning() {
    let (job, rx) = reporting_job();

    InlineSpawner.spawn(job);

    assert_eq!(rx.try_recv().unwrap(), thread::current().id());
}

#[test]
fn test_thread_spawner_runs_on_another_thread() {
    let (job, rx) = reporting_job();

    ThreadSpawner.spawn(job);

    assert_ne!(rx.recv_timeout(TIMEOUT).unwrap(), thread::current().id());
}

#[test]
fn test_tokio_spawner_runs_on_blocking_pool() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let spawner = TokioSpawner::new(runtime.handle().clone());
    let (job, rx) = reporting_job();

    spawner.spawn(job);

    assert_ne!(rx.recv_timeout(TIMEOUT).unwrap(), thread::current().id());
}

#[test]
fn test_tokio_spawner_after_shutdown_does_not_hang_readers() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let spawner = TokioSpawner::new(runtime.handle().clone());
    drop(runtime);

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let read = panic::catch_unwind(AssertUnwindSafe(|| {
            Fiber::<i32>::memoizing(|| 1, &spawner).get_result()
        }));
        let _ = tx.send(read.is_err());
    });

    assert!(rx.recv_timeout(TIMEOUT).unwrap());
}

#[test]
fn test_tokio_spawner_try_current() {
    assert!(TokioSpawner::try_current().is_none());

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let inside = runtime.block_on(async { TokioSpawner::try_current().is_some() });

    assert!(inside);
}

#[test]
fn test_host_builds_each_kind() {
    for kind in [SpawnerKind::Thread, SpawnerKind::Tokio, SpawnerKind::Inline] {
        let config = RuntimeConfig {
            spawner: kind,
            worker_threads: Some(2),
        };
        let host = SpawnerHost::from_config(&config).unwrap();
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);

        host.spawner().spawn(Box::new(move || {
            let _ = tx.lock().unwrap().send(());
        }));

        assert!(rx.recv_timeout(TIMEOUT).is_ok(), "{} spawner never ran", kind);
    }
}

#[test]
fn test_spawner_kind_names() {
    assert_eq!(SpawnerKind::default(), SpawnerKind::Thread);
    assert_eq!(SpawnerKind::Tokio.to_string(), "tokio");
    assert_eq!(
        serde_json::to_string(&SpawnerKind::Inline).unwrap(),
        "\"inline\""
    );
}
