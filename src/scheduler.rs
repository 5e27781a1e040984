//! Admission control for outbound API calls.
//!
//! The remote service allows 100 requests per minute and 500 per hour per
//! API key, with both counters resetting on wall-clock boundaries (the 0th
//! second of every minute, the 0th minute of every hour). The [`Scheduler`]
//! accepts submissions at any rate, parks them in a FIFO queue, and releases
//! them only while its local estimate of both budgets is positive. Every
//! completed call reports the authoritative remaining counts from the
//! response headers, which overwrite the local estimate; local bookkeeping
//! only ever drifts until the next response corrects it.

use crate::error::Error;
use crate::http::Transport;
use crate::request::RequestDescriptor;
use chrono::{DateTime, Timelike, Utc};
use log::debug;
use serde_json::Value;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const REQUEST_LIMIT_PER_MINUTE: u32 = 100;
pub const REQUEST_LIMIT_PER_HOUR: u32 = 500;

/// One of the two fixed rate windows the remote service enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Minute,
    Hour,
}

impl Window {
    /// Value the window's counter resets to at each boundary.
    pub fn ceiling(self) -> u32 {
        match self {
            Window::Minute => REQUEST_LIMIT_PER_MINUTE,
            Window::Hour => REQUEST_LIMIT_PER_HOUR,
        }
    }
}

/// Completion handle returned by [`Scheduler::submit`]. Resolves exactly once
/// with the outcome of the underlying call, or with
/// [`Error::SchedulerClosed`] if the scheduler is dropped while the request
/// is still queued.
pub struct RequestHandle {
    rx: oneshot::Receiver<Result<Value, Error>>,
}

impl Future for RequestHandle {
    type Output = Result<Value, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|res| match res {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::SchedulerClosed),
        })
    }
}

struct PendingRequest {
    descriptor: RequestDescriptor,
    tx: oneshot::Sender<Result<Value, Error>>,
}

struct State {
    remaining_minute: u32,
    remaining_hour: u32,
    queue: VecDeque<PendingRequest>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    state: Mutex<State>,
    timers: Mutex<Vec<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Ok(timers) = self.timers.lock() {
            for t in timers.iter() {
                t.abort();
            }
        }
    }
}

/// FIFO admission queue plus the two window counters. Cheap to clone; all
/// clones share one queue and one pair of counters.
///
/// Must be created inside a Tokio runtime: construction spawns the two
/// periodic reset tasks, which run until the last clone is dropped or
/// [`shutdown`](Scheduler::shutdown) is called.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let inner = Arc::new(Inner {
            transport,
            state: Mutex::new(State {
                remaining_minute: REQUEST_LIMIT_PER_MINUTE,
                remaining_hour: REQUEST_LIMIT_PER_HOUR,
                queue: VecDeque::new(),
            }),
            timers: Mutex::new(Vec::new()),
        });
        let timers = vec![
            spawn_reset_loop(&inner, Window::Minute),
            spawn_reset_loop(&inner, Window::Hour),
        ];
        *inner.timers.lock().expect("timer list poisoned") = timers;
        Self { inner }
    }

    /// Queue a request for execution. Never rejects: when either window is
    /// exhausted the request simply waits its turn. An asynchronous dequeue
    /// attempt is scheduled so that an idle scheduler with spare capacity
    /// drains immediately rather than at the next boundary.
    pub fn submit(&self, descriptor: RequestDescriptor) -> RequestHandle {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state();
            state.queue.push_back(PendingRequest { descriptor, tx });
            debug!("queued request, depth now {}", state.queue.len());
        }
        let scheduler = self.clone();
        tokio::spawn(async move {
            scheduler.try_dequeue_one();
        });
        RequestHandle { rx }
    }

    /// Overwrite a window counter with the remaining count the remote
    /// service reported. The server is the source of truth: other clients
    /// may share the key, so local accounting drifts and is corrected here
    /// after every completed call.
    pub fn report_remaining(&self, window: Window, value: u32) {
        let mut state = self.state();
        match window {
            Window::Minute => state.remaining_minute = value,
            Window::Hour => state.remaining_hour = value,
        }
    }

    /// Release the head of the queue if both windows have capacity. A no-op
    /// when the queue is empty or either counter is zero; at most one
    /// request leaves the queue per call. Completion of the released call
    /// triggers the next attempt, so one call is enough to start a drain.
    pub fn try_dequeue_one(&self) {
        let pending = {
            let mut state = self.state();
            if state.remaining_minute == 0 || state.remaining_hour == 0 {
                return;
            }
            let Some(pending) = state.queue.pop_front() else {
                return;
            };
            state.remaining_minute -= 1;
            state.remaining_hour -= 1;
            debug!(
                "dequeued request, remaining {}/min {}/hour, depth {}",
                state.remaining_minute,
                state.remaining_hour,
                state.queue.len()
            );
            pending
        };
        let scheduler = self.clone();
        tokio::spawn(async move {
            scheduler.run_pending(pending).await;
        });
    }

    /// Current local estimate for one window.
    pub fn remaining(&self, window: Window) -> u32 {
        let state = self.state();
        match window {
            Window::Minute => state.remaining_minute,
            Window::Hour => state.remaining_hour,
        }
    }

    /// Number of requests waiting for capacity.
    pub fn queue_depth(&self) -> usize {
        self.state().queue.len()
    }

    /// Stop the periodic reset tasks. Queued requests stay queued and their
    /// handles resolve with [`Error::SchedulerClosed`] once the last clone
    /// of this scheduler is dropped.
    pub fn shutdown(&self) {
        let timers = std::mem::take(&mut *self.inner.timers.lock().expect("timer list poisoned"));
        for t in &timers {
            t.abort();
        }
    }

    pub(crate) fn reset_window(&self, window: Window) {
        {
            let mut state = self.state();
            match window {
                Window::Minute => state.remaining_minute = REQUEST_LIMIT_PER_MINUTE,
                Window::Hour => state.remaining_hour = REQUEST_LIMIT_PER_HOUR,
            }
        }
        debug!("{:?} window reset to {}", window, window.ceiling());
        self.try_dequeue_one();
    }

    async fn run_pending(&self, pending: PendingRequest) {
        let response = self.inner.transport.execute(&pending.descriptor).await;
        if let Some(v) = response.rate.remaining_minute {
            self.report_remaining(Window::Minute, v);
        }
        if let Some(v) = response.rate.remaining_hour {
            self.report_remaining(Window::Hour, v);
        }
        // Receiver may have been dropped; that only means nobody is waiting.
        let _ = pending.tx.send(response.into_result());
        // The response may have restored capacity, and a queued request may
        // be waiting on exactly that.
        self.try_dequeue_one();
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().expect("scheduler state poisoned")
    }
}

fn spawn_reset_loop(inner: &Arc<Inner>, window: Window) -> JoinHandle<()> {
    let weak: Weak<Inner> = Arc::downgrade(inner);
    tokio::spawn(async move {
        loop {
            let wait = until_next_boundary(Utc::now(), window);
            tokio::time::sleep(wait).await;
            let Some(inner) = weak.upgrade() else { break };
            Scheduler { inner }.reset_window(window);
        }
    })
}

/// Time until the next wall-clock boundary of the given window. Anchored to
/// the clock, not to process start, so resets land on the same instants the
/// server resets its own counters.
fn until_next_boundary(now: DateTime<Utc>, window: Window) -> Duration {
    let next = match window {
        Window::Minute => (now + chrono::Duration::minutes(1))
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0)),
        Window::Hour => (now + chrono::Duration::hours(1))
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0)),
    };
    next.and_then(|next| (next - now).to_std().ok())
        .unwrap_or(Duration::from_secs(1))
}
