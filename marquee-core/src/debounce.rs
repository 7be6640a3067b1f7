//! Search input debouncing.
//!
//! Raw values (one per keystroke) go in through `Debouncer::push`; stabilized
//! values come out of the receiver returned by `spawn`. A value is only
//! emitted once the quiet interval has passed without a newer value, so a
//! burst of typing collapses into a single emission of its final value.

use std::time::Duration;

use tokio::sync::mpsc;

/// Capacity of the stabilized output channel.
const OUTPUT_CAPACITY: usize = 16;

/// Input side of a debounce task.
///
/// Dropping every clone of the handle closes the input; a value still
/// waiting out its quiet interval is emitted before the output closes.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
}

impl<T> Debouncer<T>
where
    T: PartialEq + Clone + Send + 'static,
{
    /// Spawns a debounce task with no prior stabilized value.
    pub fn spawn(quiet: Duration) -> (Self, mpsc::Receiver<T>) {
        Self::spawn_inner(quiet, None)
    }

    /// Spawns a debounce task that treats `initial` as already emitted.
    ///
    /// Settling back on `initial` produces no emission.
    pub fn with_initial(quiet: Duration, initial: T) -> (Self, mpsc::Receiver<T>) {
        Self::spawn_inner(quiet, Some(initial))
    }

    fn spawn_inner(quiet: Duration, initial: Option<T>) -> (Self, mpsc::Receiver<T>) {
        let (input, raw_rx) = mpsc::unbounded_channel();
        let (output, stable_rx) = mpsc::channel(OUTPUT_CAPACITY);
        tokio::spawn(run_debounce(quiet, initial, raw_rx, output));
        (Self { input }, stable_rx)
    }

    /// Feeds a raw value, cancelling any pending emission.
    ///
    /// Returns `false` once the debounce task has stopped.
    pub fn push(&self, raw: T) -> bool {
        self.input.send(raw).is_ok()
    }
}

async fn run_debounce<T: PartialEq + Clone>(
    quiet: Duration,
    mut last_emitted: Option<T>,
    mut raw_rx: mpsc::UnboundedReceiver<T>,
    output: mpsc::Sender<T>,
) {
    let mut pending: Option<T> = None;
    let mut input_open = true;

    loop {
        let Some(value) = pending.take() else {
            if !input_open {
                return;
            }
            match raw_rx.recv().await {
                Some(raw) => pending = Some(raw),
                None => return,
            }
            continue;
        };

        if input_open {
            tokio::select! {
                next = raw_rx.recv() => match next {
                    // Superseded: the timer restarts for the newer value
                    Some(raw) => pending = Some(raw),
                    None => {
                        input_open = false;
                        pending = Some(value);
                    }
                },
                () = tokio::time::sleep(quiet) => {
                    if !emit(&output, &mut last_emitted, value).await {
                        return;
                    }
                }
            }
        } else {
            tokio::time::sleep(quiet).await;
            emit(&output, &mut last_emitted, value).await;
            return;
        }
    }
}

/// Sends `value` unless it repeats the last emission. Returns `false` when
/// the receiver is gone.
async fn emit<T: PartialEq + Clone>(
    output: &mpsc::Sender<T>,
    last_emitted: &mut Option<T>,
    value: T,
) -> bool {
    if last_emitted.as_ref() == Some(&value) {
        tracing::trace!("Debounced value unchanged, skipping emission");
        return true;
    }
    *last_emitted = Some(value.clone());
    output.send(value).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn test_burst_emits_last_value_once() {
        let (debouncer, mut stable) = Debouncer::spawn(QUIET);

        for raw in ["b", "ba", "bat", "batm", "batma", "batman"] {
            assert!(debouncer.push(raw.to_string()));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(stable.recv().await.as_deref(), Some("batman"));

        drop(debouncer);
        assert_eq!(stable.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_emission_while_values_keep_arriving() {
        let (debouncer, mut stable) = Debouncer::spawn(QUIET);

        for i in 0..20 {
            debouncer.push(i);
            tokio::time::sleep(Duration::from_millis(499)).await;
            assert!(stable.try_recv().is_err(), "emitted during burst at {i}");
        }

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(stable.recv().await, Some(19));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_quiet_windows_emit_separately() {
        let (debouncer, mut stable) = Debouncer::spawn(QUIET);

        debouncer.push("alien".to_string());
        tokio::time::sleep(Duration::from_millis(600)).await;
        debouncer.push("aliens".to_string());

        assert_eq!(stable.recv().await.as_deref(), Some("alien"));
        assert_eq!(stable.recv().await.as_deref(), Some("aliens"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_then_retype_collapses() {
        let (debouncer, mut stable) = Debouncer::with_initial(QUIET, String::new());

        debouncer.push("dune".to_string());
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(stable.recv().await.as_deref(), Some("dune"));

        // Clear and retype the same term inside one quiet window
        debouncer.push(String::new());
        debouncer.push("d".to_string());
        debouncer.push("dune".to_string());
        drop(debouncer);

        // Settled on the value already emitted, so nothing new comes out
        assert_eq!(stable.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_then_retype_other_term_emits_it_once() {
        let (debouncer, mut stable) = Debouncer::with_initial(QUIET, String::new());

        debouncer.push("dune".to_string());
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(stable.recv().await.as_deref(), Some("dune"));

        for raw in ["", "a", "al", "alien"] {
            debouncer.push(raw.to_string());
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(stable.try_recv().is_err(), "cleared box emitted mid-window");

        tokio::time::sleep(QUIET).await;
        assert_eq!(stable.recv().await.as_deref(), Some("alien"));

        drop(debouncer);
        assert_eq!(stable.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_value_is_not_reemitted() {
        let (debouncer, mut stable) = Debouncer::with_initial(QUIET, String::new());

        debouncer.push("x".to_string());
        debouncer.push(String::new());
        drop(debouncer);

        assert_eq!(stable.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_value_flushes_after_input_closes() {
        let start = tokio::time::Instant::now();
        let (debouncer, mut stable) = Debouncer::spawn(QUIET);

        debouncer.push(7_u32);
        drop(debouncer);

        assert_eq!(stable.recv().await, Some(7));
        assert!(start.elapsed() >= QUIET);
        assert_eq!(stable.recv().await, None);
    }
}
