//! Pending-connection registry
//!
//! The registry owns the authoritative answer to "has this call already been
//! resolved?". Each armed entry pairs a call leg with a one-shot timer task;
//! the atomic map removal is the single transition out of the armed state, so
//! cancel-on-answer and fire-on-timeout can race freely and exactly one of
//! them takes effect.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use super::error::EscalationError;

/// Terminal outcome of a pending connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The agent answered before the deadline; the timer was released.
    Canceled,
    /// The deadline elapsed first; the expiry callback ran.
    Fired,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Canceled => "canceled",
            Resolution::Fired => "fired",
        }
    }
}

/// One outstanding escalation.
///
/// The timer abort handle is exclusively owned by the entry: whichever caller
/// removes the entry from the map is the only one that may touch it.
pub struct PendingConnection {
    /// Call leg the transfer will be issued against if the timer wins.
    pub leg_id: String,
    deadline: Duration,
    armed_at: Instant,
    timer: AbortHandle,
}

impl PendingConnection {
    /// Time this entry spent armed.
    pub fn elapsed(&self) -> Duration {
        self.armed_at.elapsed()
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

/// Concurrency-safe map from key to outstanding escalation.
///
/// At most one entry exists per key. Entries leave the map exactly once,
/// tagged with a [`Resolution`]; the removal and the resolution decision are
/// a single atomic operation on the underlying shard, which is what makes
/// the cancel/fire race safe.
#[derive(Clone, Default)]
pub struct PendingConnectionRegistry {
    connections: Arc<DashMap<String, PendingConnection>>,
}

impl PendingConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm an escalation for `key`: store a pending connection and schedule
    /// `on_expire` to run with the leg id once `deadline` elapses, unless the
    /// entry is canceled first.
    ///
    /// Fails with [`EscalationError::AlreadyArmed`] if an entry for `key`
    /// exists; the existing entry and its timer are not altered.
    pub fn arm<F, Fut>(
        &self,
        key: &str,
        leg_id: &str,
        deadline: Duration,
        on_expire: F,
    ) -> Result<(), EscalationError>
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        match self.connections.entry(key.to_string()) {
            Entry::Occupied(_) => Err(EscalationError::AlreadyArmed {
                key: key.to_string(),
            }),
            Entry::Vacant(slot) => {
                let registry = self.clone();
                let task_key = key.to_string();
                // The task resolves the race through the same atomic removal
                // as try_cancel; it cannot observe the entry before the
                // insert below because the shard lock is still held here.
                let timer = tokio::spawn(async move {
                    tokio::time::sleep(deadline).await;
                    match registry.resolve(&task_key, Resolution::Fired) {
                        Some(connection) => on_expire(connection.leg_id).await,
                        None => {
                            debug!(key = %task_key, "Deadline elapsed after cancellation, nothing to do");
                        }
                    }
                });

                slot.insert(PendingConnection {
                    leg_id: leg_id.to_string(),
                    deadline,
                    armed_at: Instant::now(),
                    timer: timer.abort_handle(),
                });

                info!(
                    key = %key,
                    leg_id = %leg_id,
                    deadline_ms = deadline.as_millis() as u64,
                    "Escalation armed"
                );
                Ok(())
            }
        }
    }

    /// Cancel the escalation for `key` if it is still armed.
    ///
    /// Returns `true` only for the caller that performed the transition.
    /// Safe to call repeatedly and concurrently with timer expiry: once the
    /// entry has left the armed state this is a no-op returning `false`.
    pub fn try_cancel(&self, key: &str) -> bool {
        self.resolve(key, Resolution::Canceled).is_some()
    }

    /// Atomically take the entry for `key` out of the armed state.
    ///
    /// This is the linearization point of the cancel/fire race: the map
    /// removal succeeds for exactly one caller per entry.
    fn resolve(&self, key: &str, resolution: Resolution) -> Option<PendingConnection> {
        let (_, connection) = self.connections.remove(key)?;
        if resolution == Resolution::Canceled {
            connection.timer.abort();
        }
        info!(
            key = %key,
            leg_id = %connection.leg_id,
            outcome = resolution.as_str(),
            elapsed_ms = connection.elapsed().as_millis() as u64,
            "Pending connection resolved"
        );
        Some(connection)
    }

    /// Whether an escalation is currently armed for `key`.
    pub fn is_armed(&self, key: &str) -> bool {
        self.connections.contains_key(key)
    }

    /// Number of armed escalations.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_deadline_suppresses_expiry() {
        let registry = PendingConnectionRegistry::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        registry
            .arm("agentA", "leg-1", Duration::from_secs(8), move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(registry.try_cancel("agentA"));
        assert!(registry.is_empty());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_then_immediate_cancel() {
        let registry = PendingConnectionRegistry::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        registry
            .arm("agentA", "leg-1", Duration::from_secs(8), move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert!(registry.try_cancel("agentA"));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_fires_exactly_once_with_original_leg() {
        let registry = PendingConnectionRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        registry
            .arm("agentA", "leg-1234", Duration::from_secs(8), move |leg| async move {
                sink.lock().unwrap().push(leg);
            })
            .unwrap();

        tokio::time::sleep(Duration::from_millis(7900)).await;
        assert!(seen.lock().unwrap().is_empty());
        assert!(registry.is_armed("agentA"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(seen.lock().unwrap().as_slice(), ["leg-1234".to_string()]);
        assert!(registry.is_empty());

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_expiry_returns_false() {
        let registry = PendingConnectionRegistry::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        registry
            .arm("agentA", "leg-1", Duration::from_secs(8), move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!registry.try_cancel("agentA"));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_cancel_second_returns_false() {
        let registry = PendingConnectionRegistry::new();

        registry
            .arm("agentA", "leg-1", Duration::from_secs(8), |_| async {})
            .unwrap();

        assert!(registry.try_cancel("agentA"));
        assert!(!registry.try_cancel("agentA"));
        assert!(!registry.try_cancel("never-armed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_while_armed_rejected_and_first_timer_intact() {
        let registry = PendingConnectionRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let counter = first.clone();
        registry
            .arm("agentA", "leg-1", Duration::from_secs(8), move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        let counter = second.clone();
        let result = registry.arm("agentA", "leg-2", Duration::from_secs(3), move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(matches!(result, Err(EscalationError::AlreadyArmed { .. })));
        assert_eq!(registry.len(), 1);

        // The rejected arm scheduled nothing; the original timer still fires.
        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_rejection_leaves_first_cancelable() {
        let registry = PendingConnectionRegistry::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        registry
            .arm("agentA", "leg-1", Duration::from_secs(8), move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert!(registry.arm("agentA", "leg-2", Duration::from_secs(8), |_| async {}).is_err());

        assert!(registry.try_cancel("agentA"));
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_keys_do_not_interfere() {
        let registry = PendingConnectionRegistry::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        registry
            .arm("agentA", "leg-1", Duration::from_secs(8), move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        let counter = fired.clone();
        registry
            .arm("agentB", "leg-2", Duration::from_secs(8), move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(registry.len(), 2);

        assert!(registry.try_cancel("agentA"));
        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_cancel_and_expiry_resolve_exactly_once() {
        let registry = PendingConnectionRegistry::new();

        for i in 0..100 {
            let key = format!("race-{i}");
            let fired = Arc::new(AtomicUsize::new(0));

            let counter = fired.clone();
            registry
                .arm(&key, "leg", Duration::from_millis(1), move |_| async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();

            // Land the cancel attempt as close to the deadline as possible.
            tokio::time::sleep(Duration::from_millis(1)).await;
            let canceled = registry.try_cancel(&key);

            if canceled {
                // The timer lost the race; its callback must never run.
                tokio::time::sleep(Duration::from_millis(5)).await;
                assert_eq!(fired.load(Ordering::SeqCst), 0, "both outcomes took effect for {key}");
            } else {
                // The timer won; wait for its callback to land exactly once.
                let mut waited_ms = 0;
                while fired.load(Ordering::SeqCst) == 0 && waited_ms < 1000 {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    waited_ms += 1;
                }
                assert_eq!(fired.load(Ordering::SeqCst), 1, "no outcome took effect for {key}");
            }
            assert!(!registry.is_armed(&key));
        }
    }
}
