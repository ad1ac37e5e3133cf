//! Single-thread marshaling queue
//!
//! Work submitted from any thread or task is run on the one thread that owns the
//! state `T` (the interpreter), one item at a time, in submission order.
//!
//! ```text
//! caller ── submit(work) ──► [ FIFO channel ] ──► QueuePump::run / pump_pending
//!   ▲                                                   │ (owning thread)
//!   └──────────── Pending<R> ◄── oneshot ◄── work(&mut T)
//! ```
//!
//! Every [`Pending`] resolves: with the work's result, or with a [`DispatchError`] if the
//! work was refused or dropped before it finished.

use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, trace};

use crate::error::DispatchError;

type Job<T> = Box<dyn FnOnce(&mut T) + Send>;

enum JobSender<T> {
    Bounded {
        tx: mpsc::Sender<Job<T>>,
        capacity: usize,
    },
    Unbounded(mpsc::UnboundedSender<Job<T>>),
}

enum JobReceiver<T> {
    Bounded(mpsc::Receiver<Job<T>>),
    Unbounded(mpsc::UnboundedReceiver<Job<T>>),
}

/// Create a queue and the pump that drains it on the owning thread.
///
/// `capacity` bounds the number of waiting items; `None` never refuses for lack of room.
pub fn channel<T>(capacity: Option<usize>) -> (MarshalQueue<T>, QueuePump<T>) {
    match capacity {
        Some(capacity) => {
            let capacity = capacity.max(1);
            let (tx, rx) = mpsc::channel(capacity);
            (
                MarshalQueue {
                    sender: JobSender::Bounded { tx, capacity },
                },
                QueuePump {
                    receiver: JobReceiver::Bounded(rx),
                },
            )
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                MarshalQueue {
                    sender: JobSender::Unbounded(tx),
                },
                QueuePump {
                    receiver: JobReceiver::Unbounded(rx),
                },
            )
        }
    }
}

/// Submitting side of the queue. Cheap to clone; usable from any thread.
pub struct MarshalQueue<T> {
    sender: JobSender<T>,
}

impl<T> MarshalQueue<T> {
    /// Queue `work` for the owning thread without waiting for it
    ///
    /// # Errors
    ///
    /// Fails immediately when the pump is gone or a bounded queue is full
    pub fn submit<R, F>(&self, work: F) -> Result<Pending<R>, DispatchError>
    where
        F: FnOnce(&mut T) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job<T> = Box::new(move |state: &mut T| {
            // the submitter may have stopped waiting
            let _ = tx.send(work(state));
        });

        match &self.sender {
            JobSender::Bounded { tx, capacity } => tx.try_send(job).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => DispatchError::QueueFull {
                    capacity: *capacity,
                },
                mpsc::error::TrySendError::Closed(_) => DispatchError::HostUnavailable,
            })?,
            JobSender::Unbounded(tx) => tx.send(job).map_err(|_| DispatchError::HostUnavailable)?,
        }

        trace!("Work item queued for owning thread");
        Ok(Pending { rx })
    }

    /// Whether the pump has gone away
    pub fn is_closed(&self) -> bool {
        match &self.sender {
            JobSender::Bounded { tx, .. } => tx.is_closed(),
            JobSender::Unbounded(tx) => tx.is_closed(),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        match &self.sender {
            JobSender::Bounded { capacity, .. } => Some(*capacity),
            JobSender::Unbounded(_) => None,
        }
    }
}

impl<T> Clone for MarshalQueue<T> {
    fn clone(&self) -> Self {
        let sender = match &self.sender {
            JobSender::Bounded { tx, capacity } => JobSender::Bounded {
                tx: tx.clone(),
                capacity: *capacity,
            },
            JobSender::Unbounded(tx) => JobSender::Unbounded(tx.clone()),
        };
        Self { sender }
    }
}

impl<T> fmt::Debug for MarshalQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarshalQueue")
            .field("capacity", &self.capacity())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Consuming side of the queue, driven by the owning thread
pub struct QueuePump<T> {
    receiver: JobReceiver<T>,
}

impl<T> QueuePump<T> {
    /// Run queued work until every [`MarshalQueue`] handle is dropped.
    ///
    /// Blocks the calling thread, which becomes the owning thread. Must not be called
    /// from within an async runtime. Returns the number of items run.
    pub fn run(mut self, state: &mut T) -> usize {
        let mut served = 0;
        while let Some(job) = self.recv_blocking() {
            run_job(job, state);
            served += 1;
        }
        debug!(served, "Marshaling queue closed");
        served
    }

    /// Run only the work queued right now, for hosts that drive the bridge from their own
    /// loop. Returns the number of items run.
    pub fn pump_pending(&mut self, state: &mut T) -> usize {
        let mut served = 0;
        while let Some(job) = self.try_recv() {
            run_job(job, state);
            served += 1;
        }
        served
    }

    fn recv_blocking(&mut self) -> Option<Job<T>> {
        match &mut self.receiver {
            JobReceiver::Bounded(rx) => rx.blocking_recv(),
            JobReceiver::Unbounded(rx) => rx.blocking_recv(),
        }
    }

    fn try_recv(&mut self) -> Option<Job<T>> {
        match &mut self.receiver {
            JobReceiver::Bounded(rx) => rx.try_recv().ok(),
            JobReceiver::Unbounded(rx) => rx.try_recv().ok(),
        }
    }
}

impl<T> fmt::Debug for QueuePump<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuePump").finish_non_exhaustive()
    }
}

fn run_job<T>(job: Job<T>, state: &mut T) {
    // a panicking item drops its result sender, which resolves its Pending as Abandoned
    if catch_unwind(AssertUnwindSafe(|| job(state))).is_err() {
        error!("Work item panicked on the owning thread");
    }
}

/// Eventual result of submitted work
#[must_use = "futures do nothing unless awaited"]
#[derive(Debug)]
pub struct Pending<R> {
    rx: oneshot::Receiver<R>,
}

impl<R> Future for Pending<R> {
    type Output = Result<R, DispatchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| DispatchError::Abandoned))
    }
}
