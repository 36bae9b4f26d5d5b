use anyhow::Result;
use pacer_scheduler::{Scheduler, SchedulerConfig};
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub peak_running: usize,
}

/// Submits `tasks` simulated tasks that each finish after `delay_ms`, waits
/// for all of them and tallies the outcomes.
pub async fn run(
    config: SchedulerConfig,
    tasks: usize,
    delay_ms: u64,
    fail: Option<usize>,
) -> Result<Report> {
    let local = Rc::new(LocalSet::new());
    let scheduler = Scheduler::with_config(local.clone(), config)?;
    let delay = Duration::from_millis(delay_ms);

    let handles: Vec<_> = (1..=tasks)
        .map(|n| {
            scheduler.submit(move || async move {
                tokio::time::sleep(delay).await;
                if fail == Some(n) {
                    Err(format!("Task {n} failed"))
                } else {
                    Ok(format!("Task {n}"))
                }
            })
        })
        .collect();

    tracing::info!(
        running = scheduler.running(),
        queued = scheduler.queued(),
        "submitted {} tasks",
        tasks
    );

    let mut report = Report {
        submitted: tasks,
        ..Report::default()
    };

    local
        .run_until(async {
            for (i, handle) in handles.iter().enumerate() {
                match handle.wait().await {
                    Ok(result) => {
                        tracing::info!(task = i + 1, %result, "task finished");
                        report.succeeded += 1;
                    }
                    Err(error) => {
                        tracing::warn!(task = i + 1, %error, "task failed");
                        report.failed += 1;
                    }
                }
            }
        })
        .await;

    report.peak_running = scheduler.stats().peak_running;
    Ok(report)
}
