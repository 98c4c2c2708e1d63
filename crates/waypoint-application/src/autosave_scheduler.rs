//! Background task that turns mutation notifications into debounced saves.

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use waypoint_core::autosave::AutosaveMachine;

/// Performs one autosave. Failures are handled by the callee.
pub type SaveFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Handle to the scheduler task. Dropping it stops the task once any save
/// in progress has finished.
#[derive(Debug)]
pub struct AutosaveScheduler {
    events: mpsc::UnboundedSender<()>,
}

impl AutosaveScheduler {
    /// Spawns the scheduler on the current tokio runtime.
    pub fn spawn(debounce: Duration, save: SaveFn) -> Self {
        let (events, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(AutosaveMachine::new(debounce), rx, save));
        Self { events }
    }

    /// Reports a committed mutation.
    pub fn notify(&self) {
        if self.events.send(()).is_err() {
            tracing::warn!(target: "autosave", "Scheduler stopped, mutation not scheduled");
        }
    }
}

async fn run(mut machine: AutosaveMachine, mut rx: mpsc::UnboundedReceiver<()>, save: SaveFn) {
    tracing::debug!(
        target: "autosave",
        "Scheduler started ({}ms debounce)",
        machine.debounce().as_millis()
    );

    loop {
        let Some(deadline) = machine.deadline() else {
            match rx.recv().await {
                Some(()) => machine.on_mutation(Instant::now()),
                None => break,
            }
            continue;
        };

        tokio::select! {
            event = rx.recv() => match event {
                Some(()) => machine.on_mutation(Instant::now()),
                None => break,
            },
            _ = sleep_until(deadline) => {
                if !machine.on_timer(Instant::now()) {
                    continue;
                }
                tracing::debug!(target: "autosave", "Quiet period elapsed, saving");

                let closed = save_while_collecting(&mut machine, &mut rx, &save).await;
                machine.on_save_complete(Instant::now());
                if closed {
                    break;
                }
            }
        }
    }

    tracing::debug!(target: "autosave", "Scheduler stopped");
}

/// Runs one save, feeding mutations that arrive meanwhile into the machine.
/// Returns `true` when the channel closed during the save.
async fn save_while_collecting(
    machine: &mut AutosaveMachine,
    rx: &mut mpsc::UnboundedReceiver<()>,
    save: &SaveFn,
) -> bool {
    let mut pending = save();
    let mut closed = false;

    loop {
        tokio::select! {
            _ = &mut pending => return closed,
            event = rx.recv(), if !closed => match event {
                Some(()) => machine.on_mutation(Instant::now()),
                None => closed = true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn counting_save(count: Arc<AtomicUsize>, delay: Duration) -> SaveFn {
        Arc::new(move || {
            let count = Arc::clone(&count);
            async move {
                sleep(delay).await;
                count.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_mutations_saves_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let scheduler =
            AutosaveScheduler::spawn(Duration::from_secs(2), counting_save(count.clone(), Duration::ZERO));

        for _ in 0..5 {
            scheduler.notify();
            sleep(Duration::from_millis(500)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutation_during_save_triggers_one_follow_up() {
        let count = Arc::new(AtomicUsize::new(0));
        let scheduler = AutosaveScheduler::spawn(
            Duration::from_millis(100),
            counting_save(count.clone(), Duration::from_secs(1)),
        );

        scheduler.notify();
        sleep(Duration::from_millis(300)).await;
        scheduler.notify();
        scheduler.notify();

        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_mutation_no_save() {
        let count = Arc::new(AtomicUsize::new(0));
        let _scheduler =
            AutosaveScheduler::spawn(Duration::from_millis(10), counting_save(count.clone(), Duration::ZERO));

        sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
