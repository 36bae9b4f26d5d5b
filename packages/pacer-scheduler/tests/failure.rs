use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::future;
use pacer_scheduler::{DeferredState, Scheduler, SchedulerConfig, SchedulerError, TaskError};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_zero_capacity_is_rejected() {
    let pool = LocalPool::new();
    let err = Scheduler::new(pool.spawner(), 0).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfiguration(_)));

    let err = Scheduler::with_config(pool.spawner(), SchedulerConfig::new(0).with_name("zero"))
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfiguration(_)));
}

#[test]
fn test_failure_is_isolated() {
    let mut pool = LocalPool::new();
    let scheduler = Scheduler::new(pool.spawner(), 1).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));

    let failing = scheduler.submit(|| future::ready(Err::<u32, _>("broken".to_string())));
    let succeeding = {
        let log = log.clone();
        scheduler.submit(move || {
            log.borrow_mut().push("second started");
            future::ready(Ok::<_, String>(2))
        })
    };

    {
        let log = log.clone();
        failing.on_rejected(move |e| {
            assert_eq!(e, &TaskError::Execution("broken".to_string()));
            log.borrow_mut().push("first rejected");
        });
    }

    assert_eq!(scheduler.running(), 1);
    assert_eq!(scheduler.queued(), 1);

    pool.run_until_stalled();

    assert_eq!(*log.borrow(), vec!["second started", "first rejected"]);
    assert_eq!(failing.state(), DeferredState::Rejected);
    assert_eq!(succeeding.value(), Some(2));
    assert_eq!(scheduler.running(), 0);
    assert!(scheduler.is_idle());

    let stats = scheduler.stats();
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.failed, 1);
}

#[test]
fn test_submit_never_fails_synchronously() {
    let mut pool = LocalPool::new();
    let scheduler = Scheduler::new(pool.spawner(), 2).unwrap();

    let deferreds: Vec<_> = (0..4)
        .map(|n| scheduler.submit(move || future::ready(if n % 2 == 0 { Ok(n) } else { Err(n) })))
        .collect();
    pool.run_until_stalled();

    let outcomes: Vec<_> = deferreds.iter().map(|d| d.outcome().unwrap()).collect();
    assert_eq!(
        outcomes,
        vec![
            Ok(0),
            Err(TaskError::Execution(1)),
            Ok(2),
            Err(TaskError::Execution(3)),
        ]
    );
}

#[test]
fn test_factory_panic_releases_slot() {
    let mut pool = LocalPool::new();
    let scheduler = Scheduler::new(pool.spawner(), 1).unwrap();

    let (tx, rx) = oneshot::channel::<()>();
    let blocker = scheduler.submit(move || async move {
        rx.await.map_err(|_| "canceled")?;
        Ok::<_, &'static str>("unblocked")
    });
    let panicking = scheduler.submit(|| -> future::Ready<Result<(), &'static str>> {
        panic!("factory exploded")
    });
    let after = scheduler.submit(|| future::ready(Ok::<_, &'static str>("after")));

    pool.run_until_stalled();
    assert_eq!(scheduler.queued(), 2);

    tx.send(()).unwrap();
    pool.run_until_stalled();

    assert_eq!(blocker.value(), Some("unblocked"));
    assert_eq!(
        panicking.error(),
        Some(TaskError::Panicked("factory exploded".to_string()))
    );
    assert_eq!(after.value(), Some("after"));
    assert!(scheduler.is_idle());
}

#[test]
fn test_future_panic_is_reported() {
    let mut pool = LocalPool::new();
    let scheduler = Scheduler::new(pool.spawner(), 1).unwrap();

    let panicking = scheduler.submit(|| async {
        if true {
            panic!("poll exploded");
        }
        Ok::<u8, ()>(0)
    });
    let next = scheduler.submit(|| future::ready(Ok::<u8, ()>(1)));

    pool.run_until_stalled();

    assert!(panicking.error().unwrap().is_panic());
    assert_eq!(next.value(), Some(1));
    assert_eq!(scheduler.running(), 0);
}

#[test]
fn test_dropped_executor_abandons_tasks() {
    let mut pool = LocalPool::new();
    let scheduler = Scheduler::new(pool.spawner(), 1).unwrap();

    let (_tx, rx) = oneshot::channel::<()>();
    let running = scheduler.submit(move || async move {
        let _ = rx.await;
        Ok::<(), ()>(())
    });
    let queued = scheduler.submit(|| future::pending::<Result<(), ()>>());

    pool.run_until_stalled();
    assert_eq!(scheduler.running(), 1);
    assert_eq!(scheduler.queued(), 1);

    drop(pool);

    assert_eq!(running.error(), Some(TaskError::Abandoned));
    assert_eq!(queued.error(), Some(TaskError::Abandoned));
    assert!(scheduler.is_idle());
    assert_eq!(scheduler.stats().failed, 2);
}
