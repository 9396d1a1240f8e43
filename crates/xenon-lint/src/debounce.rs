//! Keyed, cancellable debouncing on a dedicated thread.

use std::collections::HashMap;
use std::hash::Hash;
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

const DEBOUNCE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::debounce");

type Pending<K, V> = HashMap<K, (Instant, V)>;

enum Command<K, V> {
    Schedule(K, V),
    Cancel(K),
}

/// Fires a callback once a key has been quiet for a fixed period.
///
/// Scheduling a key that is already pending replaces its value and restarts
/// its quiet period, so a burst of events yields one call carrying the last
/// value. The callback runs on the debouncer's own thread. Dropping the
/// debouncer discards pending keys without firing them.
pub struct Debouncer<K, V> {
    commands: Option<Sender<Command<K, V>>>,
    worker: Option<JoinHandle<()>>,
}

impl<K, V> Debouncer<K, V>
where
    K: Eq + Hash + Send + 'static,
    V: Send + 'static,
{
    /// Starts the debouncer thread.
    ///
    /// # Errors
    ///
    /// Returns an error when the thread cannot be spawned.
    pub fn spawn<F>(quiet: Duration, on_fire: F) -> io::Result<Self>
    where
        F: FnMut(K, V) + Send + 'static,
    {
        let (commands, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name(String::from("xenon-lint-debounce"))
            .spawn(move || debounce_loop(&receiver, quiet, on_fire))?;
        Ok(Self {
            commands: Some(commands),
            worker: Some(worker),
        })
    }

    /// Schedules `value` under `key`, replacing any pending value.
    pub fn schedule(&self, key: K, value: V) {
        self.send(Command::Schedule(key, value));
    }

    /// Drops the pending value for `key`, if any.
    pub fn cancel(&self, key: K) {
        self.send(Command::Cancel(key));
    }

    fn send(&self, command: Command<K, V>) {
        let delivered = self
            .commands
            .as_ref()
            .is_some_and(|commands| commands.send(command).is_ok());
        if !delivered {
            debug!(target: DEBOUNCE_TARGET, "debouncer stopped, event dropped");
        }
    }
}

impl<K, V> Drop for Debouncer<K, V> {
    fn drop(&mut self) {
        drop(self.commands.take());
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            debug!(target: DEBOUNCE_TARGET, "debouncer thread panicked");
        }
    }
}

fn debounce_loop<K, V, F>(receiver: &mpsc::Receiver<Command<K, V>>, quiet: Duration, mut on_fire: F)
where
    K: Eq + Hash,
    F: FnMut(K, V),
{
    let mut pending: Pending<K, V> = HashMap::new();
    loop {
        let next_deadline = pending.values().map(|(deadline, _)| *deadline).min();
        let received = match next_deadline {
            Some(deadline) => {
                receiver.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(Command::Schedule(key, value)) => {
                pending.insert(key, (Instant::now() + quiet, value));
            }
            Ok(Command::Cancel(key)) => {
                pending.remove(&key);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                debug!(
                    target: DEBOUNCE_TARGET,
                    discarded = pending.len(),
                    "debouncer shutting down"
                );
                return;
            }
        }

        let now = Instant::now();
        let (due, waiting): (Pending<K, V>, Pending<K, V>) = pending
            .drain()
            .partition(|(_, (deadline, _))| *deadline <= now);
        pending = waiting;
        for (key, (_, value)) in due {
            on_fire(key, value);
        }
    }
}
