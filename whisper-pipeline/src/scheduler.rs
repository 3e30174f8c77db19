//! Work offering with three priority tiers.
//!
//! Jobs are CPU-bound closures; the dispatcher drains user-initiated
//! work before normal work before maintenance, and runs each job to
//! completion before taking the next, so steps inside one job stay
//! sequential. No ordering exists between jobs of the same tier beyond
//! submission order, and none at all across tiers.

use tokio::sync::{mpsc, oneshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Priority {
    UserInitiated,
    Normal,
    Maintenance,
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Three-tier job scheduler. Dropping it stops the dispatcher once the
/// queues drain.
pub struct Scheduler {
    user: mpsc::UnboundedSender<Job>,
    normal: mpsc::UnboundedSender<Job>,
    maintenance: mpsc::UnboundedSender<Job>,
}

impl Scheduler {
    /// Spawn the dispatcher on the current tokio runtime.
    pub fn new() -> Self {
        let (user, mut user_rx) = mpsc::unbounded_channel::<Job>();
        let (normal, mut normal_rx) = mpsc::unbounded_channel::<Job>();
        let (maintenance, mut maintenance_rx) = mpsc::unbounded_channel::<Job>();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    Some(job) = user_rx.recv() => job(),
                    Some(job) = normal_rx.recv() => job(),
                    Some(job) = maintenance_rx.recv() => job(),
                    else => break,
                }
            }
        });

        Self {
            user,
            normal,
            maintenance,
        }
    }

    /// Submit a job; the receiver resolves with its result. A dropped
    /// scheduler resolves pending receivers with `RecvError`.
    pub fn submit<T, F>(&self, priority: Priority, f: F) -> oneshot::Receiver<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            // The caller may have gone away; that cancels the job's
            // result, not the scheduler.
            let _ = tx.send(f());
        });
        let queue = match priority {
            Priority::UserInitiated => &self.user,
            Priority::Normal => &self.normal,
            Priority::Maintenance => &self.maintenance,
        };
        let _ = queue.send(job);
        rx
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
