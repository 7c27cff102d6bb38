//! Cancellable, reschedulable delayed work on a dedicated worker thread.
//!
//! At most one run is pending or in flight at any time: scheduling replaces
//! the pending deadline, and a run re-arms itself by returning the next
//! delay from its body. [`PeriodicTask::cancel_sync`] blocks until an
//! in-flight run has returned, so callers get a clean slate.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct TaskState {
    deadline: Option<Instant>,
    running: bool,
    /// Bumped by every cancel; a run started under an older epoch may not re-arm.
    epoch: u64,
    runs: u64,
    shutdown: bool,
}

struct Shared {
    state: Mutex<TaskState>,
    cvar: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TaskState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, TaskState>) -> MutexGuard<'a, TaskState> {
        self.cvar.wait(guard).unwrap_or_else(|e| e.into_inner())
    }

    fn wait_timeout<'a>(
        &self,
        guard: MutexGuard<'a, TaskState>,
        timeout: Duration,
    ) -> MutexGuard<'a, TaskState> {
        match self.cvar.wait_timeout(guard, timeout) {
            Ok((g, _)) => g,
            Err(e) => e.into_inner().0,
        }
    }
}

pub struct PeriodicTask {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Start the worker thread. The task is idle until [`schedule`] is called.
    ///
    /// `body` returns `Some(delay)` to run again after `delay`, or `None`
    /// to stay idle. The body must not call back into this task.
    ///
    /// [`schedule`]: PeriodicTask::schedule
    pub fn spawn<F>(name: &str, body: F) -> std::io::Result<Self>
    where
        F: FnMut() -> Option<Duration> + Send + 'static,
    {
        let shared = Arc::new(Shared {
            state: Mutex::new(TaskState::default()),
            cvar: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(&worker_shared, body))?;
        Ok(PeriodicTask {
            shared,
            worker: Some(worker),
        })
    }

    /// Arm the task to run once after `delay`, replacing any pending deadline.
    pub fn schedule(&self, delay: Duration) {
        let mut st = self.shared.lock();
        if st.shutdown {
            return;
        }
        st.deadline = Some(Instant::now() + delay);
        self.shared.cvar.notify_all();
    }

    /// Disarm the task and wait for an in-flight run to finish.
    ///
    /// A self re-arm requested by that run is discarded.
    pub fn cancel_sync(&self) {
        let mut st = self.shared.lock();
        st.deadline = None;
        st.epoch = st.epoch.wrapping_add(1);
        while st.running {
            st = self.shared.wait(st);
        }
    }

    /// Whether a run is scheduled and has not started yet.
    pub fn is_pending(&self) -> bool {
        self.shared.lock().deadline.is_some()
    }

    /// Number of completed runs.
    pub fn run_count(&self) -> u64 {
        self.shared.lock().runs
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel_sync();
        {
            let mut st = self.shared.lock();
            st.shutdown = true;
            self.shared.cvar.notify_all();
        }
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::warn!("[task] worker thread panicked");
        }
    }
}

fn worker_loop<F>(shared: &Shared, mut body: F)
where
    F: FnMut() -> Option<Duration>,
{
    let mut st = shared.lock();
    loop {
        if st.shutdown {
            return;
        }
        let Some(at) = st.deadline else {
            st = shared.wait(st);
            continue;
        };
        let now = Instant::now();
        if now < at {
            st = shared.wait_timeout(st, at - now);
            continue;
        }

        st.deadline = None;
        st.running = true;
        let epoch = st.epoch;
        drop(st);

        let next = match catch_unwind(AssertUnwindSafe(&mut body)) {
            Ok(next) => next,
            Err(_) => {
                log::error!("[task] run panicked; task disarmed");
                None
            }
        };

        st = shared.lock();
        st.running = false;
        st.runs += 1;
        if let Some(delay) = next
            && st.epoch == epoch
            && st.deadline.is_none()
        {
            st.deadline = Some(Instant::now() + delay);
        }
        shared.cvar.notify_all();
    }
}
