//! A stand-in owning thread for running the bridge outside a real host application.

use std::fmt::Display;
use std::io;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

use crate::queue::QueuePump;

/// A named OS thread that owns the interpreter state and drains a [`QueuePump`].
///
/// The state is built on the thread itself, so it never has to be `Send`. The thread
/// exits once every queue handle feeding the pump is dropped.
#[derive(Debug)]
pub struct HostThread {
    name: String,
    handle: JoinHandle<usize>,
}

impl HostThread {
    /// Spawn the owning thread. If `factory` fails the pump is dropped unread, so every
    /// submission fails with a dispatch error instead of waiting forever.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS thread cannot be spawned
    pub fn spawn<T, E, F>(name: impl Into<String>, pump: QueuePump<T>, factory: F) -> io::Result<Self>
    where
        T: 'static,
        E: Display,
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        let name = name.into();
        let thread_name = name.clone();
        let handle = thread::Builder::new().name(name.clone()).spawn(move || {
            let mut state = match factory() {
                Ok(state) => state,
                Err(e) => {
                    error!(thread = %thread_name, "Failed initializing owning thread state: {e}");
                    return 0;
                }
            };
            info!(thread = %thread_name, "Owning thread ready");
            pump.run(&mut state)
        })?;

        Ok(Self { name, handle })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the thread to finish, returning how many work items it ran.
    ///
    /// Only returns once all queue handles (and so every bridge using them) are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the owning thread panicked outside a work item
    pub fn join(self) -> thread::Result<usize> {
        self.handle.join()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchError;
    use crate::queue::channel;

    #[tokio::test]
    async fn test_state_built_on_owning_thread() {
        let (queue, pump) = channel::<Option<String>>(None);
        let host = HostThread::spawn("rca-test-host", pump, || {
            Ok::<_, String>(thread::current().name().map(str::to_string))
        })
        .unwrap();
        assert_eq!(host.name(), "rca-test-host");

        let built_on = queue.submit(|state| state.clone()).unwrap().await.unwrap();
        assert_eq!(built_on.as_deref(), Some("rca-test-host"));

        drop(queue);
        assert_eq!(host.join().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_factory_fails_submissions() {
        let (queue, pump) = channel::<()>(None);
        let host = HostThread::spawn("rca-broken-host", pump, || Err::<(), _>("no interpreter"))
            .unwrap();
        assert_eq!(host.join().unwrap(), 0);

        assert_eq!(
            queue.submit(|_| ()).unwrap_err(),
            DispatchError::HostUnavailable
        );
    }
}
