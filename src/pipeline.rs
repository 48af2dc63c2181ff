//! A chain of concurrently running stages connected by bounded queues.
//!
//! The producer, every stage and the consumer each run on their own thread
//! (the consumer on the caller's). Values flow strictly in order; the only
//! buffering is the bounded queue between neighbours, so a slow consumer
//! applies backpressure all the way up to the producer.
//!
//! Shutdown is by drain: when a stage returns, its output queue closes, the
//! next stage sees end of input, and so on. A failing stage therefore stops
//! forwarding but everything upstream keeps running until its sends fail.

use std::sync::Arc;
use std::thread;

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default capacity of each queue between stages.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// One step of a pipeline.
///
/// `process` is called once, on a dedicated thread, with the upstream queue.
/// It returns when its input is exhausted, or early with an error. Returning
/// closes the stage's output.
pub trait Stage<T>: Send + Sync {
    fn name(&self) -> &str;

    fn process(&self, input: Inlet<T>, output: &Outlet<T>) -> Result<()>;
}

/// Receiving end of a queue.
#[derive(Debug)]
pub struct Inlet<T>(Receiver<T>);

impl<T> Inlet<T> {
    /// Next value, or `None` once upstream has finished.
    pub fn recv(&self) -> Option<T> {
        self.0.recv().ok()
    }
}

impl<T> Iterator for Inlet<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.recv()
    }
}

/// Sending end of a queue.
#[derive(Debug)]
pub struct Outlet<T>(Sender<T>);

impl<T> Outlet<T> {
    /// Send a value downstream, blocking while the queue is full.
    ///
    /// Fails with [`Error::Cancelled`] once downstream has stopped reading.
    pub fn send(&self, value: T) -> Result<()> {
        self.0.send(value).map_err(|_| Error::Cancelled)
    }
}

/// A borrowed list of stages plus the queue capacity to run them with.
pub struct Pipeline<'a, T> {
    stages: &'a [Arc<dyn Stage<T>>],
    capacity: usize,
}

impl<'a, T: Send> Pipeline<'a, T> {
    pub fn new(stages: &'a [Arc<dyn Stage<T>>]) -> Self {
        Self {
            stages,
            capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Run `producer` into the stages and drain the result into `consumer`.
    ///
    /// Returns the producer's value when every participant succeeded.
    /// Otherwise returns the first real failure: a stage error wrapped in
    /// [`Error::FilterStage`], or the producer's or consumer's own error.
    /// [`Error::Cancelled`] is never treated as a failure by itself; it is
    /// only returned when nothing else went wrong but the producer did not
    /// finish.
    pub fn run<O, P, C>(&self, producer: P, mut consumer: C) -> Result<O>
    where
        O: Send,
        P: FnOnce(&Outlet<T>) -> Result<O> + Send,
        C: FnMut(T) -> Result<()>,
    {
        let (error_tx, error_rx) = channel::unbounded::<Error>();

        let output = thread::scope(|scope| {
            let (tx, mut rx) = channel::bounded(self.capacity);
            let producer_errors = error_tx.clone();
            let producer_handle = scope.spawn(move || {
                let outlet = Outlet(tx);
                match producer(&outlet) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        if !e.is_cancelled() {
                            let _ = producer_errors.send(e);
                        }
                        None
                    }
                }
            });

            let mut stage_handles = Vec::with_capacity(self.stages.len());
            for stage in self.stages {
                let (tx, next_rx) = channel::bounded(self.capacity);
                let input = Inlet(std::mem::replace(&mut rx, next_rx));
                let name = stage.name().to_owned();
                let stage = Arc::clone(stage);
                let stage_errors = error_tx.clone();
                let handle = scope.spawn(move || {
                    let outlet = Outlet(tx);
                    if let Err(e) = stage.process(input, &outlet)
                        && !e.is_cancelled()
                    {
                        warn!(stage = stage.name(), error = %e, "filter stage failed");
                        let _ = stage_errors.send(Error::FilterStage {
                            stage: stage.name().to_owned(),
                            source: Box::new(e),
                        });
                    }
                });
                stage_handles.push((name, handle));
            }

            for value in rx.iter() {
                if let Err(e) = consumer(value) {
                    if !e.is_cancelled() {
                        let _ = error_tx.send(e);
                    }
                    debug!("consumer stopped, draining pipeline");
                    break;
                }
            }
            // Hang up so upstream sends fail instead of blocking forever.
            drop(rx);

            for (name, handle) in stage_handles {
                if handle.join().is_err() {
                    let _ = error_tx.send(Error::FilterStage {
                        stage: name,
                        source: Box::new(Error::Filter("stage panicked".to_owned())),
                    });
                }
            }
            producer_handle.join().unwrap_or_else(|_| {
                let _ = error_tx.send(Error::Filter("producer panicked".to_owned()));
                None
            })
        });

        // Failures are reported in the order they happened.
        if let Ok(first) = error_rx.try_recv() {
            return Err(first);
        }
        output.ok_or(Error::Cancelled)
    }
}
