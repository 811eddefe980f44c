//! Deferred-work executor.
//!
//! Mutators enqueue follow-up work (leader elections) here instead of
//! running it inline, so a mutator can return while its election is still
//! pending. `SimTaskExecutor` runs everything on one worker thread in
//! submission order, which keeps simulations deterministic; `drain` gives
//! tests a barrier.

use crossbeam_channel::{unbounded, Sender};
use std::thread::JoinHandle;
use tracing::warn;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Work submission interface consumed by the provider.
pub trait TaskExecutor: Send + Sync {
    fn submit(&self, task: Task);
}

enum Message {
    Run(Task),
    Barrier(Sender<()>),
}

/// Single worker thread fed by an unbounded channel.
pub struct SimTaskExecutor {
    tx: Option<Sender<Message>>,
    worker: Option<JoinHandle<()>>,
}

impl SimTaskExecutor {
    pub fn new() -> Self {
        let (tx, rx) = unbounded::<Message>();
        let worker = std::thread::Builder::new()
            .name("sim-executor".to_string())
            .spawn(move || {
                for message in rx {
                    match message {
                        Message::Run(task) => task(),
                        Message::Barrier(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
            })
            .expect("failed to spawn executor worker");
        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Block until every task submitted before this call has finished.
    pub fn drain(&self) {
        let (ack_tx, ack_rx) = unbounded();
        if let Some(tx) = &self.tx {
            if tx.send(Message::Barrier(ack_tx)).is_ok() {
                let _ = ack_rx.recv();
            }
        }
    }
}

impl Default for SimTaskExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskExecutor for SimTaskExecutor {
    fn submit(&self, task: Task) {
        if let Some(tx) = &self.tx {
            if tx.send(Message::Run(task)).is_err() {
                warn!("executor worker is gone; dropping task");
            }
        }
    }
}

impl Drop for SimTaskExecutor {
    fn drop(&mut self) {
        // Closing the channel lets the worker loop terminate.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
