//! Scoped fan-out of jobs to a few named worker threads

use crate::error::{Error, GifResult};
use crossbeam_channel::Sender;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering::SeqCst};
use std::thread;

/// Hands jobs from the producer to the workers
pub struct Dispatcher<'pool, M> {
    sender: Sender<M>,
    failed: &'pool AtomicBool,
}

impl<M> Dispatcher<'_, M> {
    /// Blocks while all workers are busy. Fails once any worker has failed.
    pub fn dispatch(&self, job: M) -> GifResult<()> {
        if self.failed.load(SeqCst) {
            return Err(Error::Aborted);
        }
        self.sender.send(job)?;
        Ok(())
    }
}

/// Runs `producer` on the calling thread, and `worker` on `num_threads` scoped threads for
/// every job the producer dispatches.
///
/// Returns after all workers have finished. The first worker error (or panic) stops the
/// remaining jobs and is returned instead of the producer's result.
pub fn run<M, P, W, R>(num_threads: u8, name: &str, producer: P, worker: W) -> GifResult<R>
where
    M: Send,
    P: FnOnce(&Dispatcher<'_, M>) -> GifResult<R>,
    W: Fn(M) -> GifResult<()> + Sync,
{
    let failed = AtomicBool::new(false);
    let (sender, receiver) = crossbeam_channel::bounded::<M>(num_threads.into());

    thread::scope(|scope| {
        let worker = &worker;
        let failed = &failed;
        let handles = (0..num_threads.max(1)).map(|n| {
            let jobs = receiver.clone();
            thread::Builder::new().name(format!("{name}{n}")).spawn_scoped(scope, move || {
                catch_unwind(AssertUnwindSafe(|| {
                    for job in jobs {
                        if failed.load(SeqCst) {
                            break;
                        }
                        if let Err(e) = worker(job) {
                            failed.store(true, SeqCst);
                            return Err(e);
                        }
                    }
                    Ok(())
                })).unwrap_or_else(|_| {
                    failed.store(true, SeqCst);
                    Err(Error::ThreadSend)
                })
            })
        }).collect::<Result<Vec<_>, _>>();
        drop(receiver);

        let dispatcher = Dispatcher { sender, failed };
        let handles = handles.map_err(|_| {
            failed.store(true, SeqCst);
            Error::ThreadSend
        })?;

        let res = producer(&dispatcher);
        // workers stop once the channel is closed
        drop(dispatcher);
        if res.is_err() {
            failed.store(true, SeqCst);
        }
        for handle in handles {
            handle.join().map_err(|_| Error::ThreadSend)??;
        }
        res
    })
}
