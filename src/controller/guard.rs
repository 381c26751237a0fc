//! Request Lifecycle Guard
//!
//! One guard per controller instance. Every fetch takes a ticket; issuing a
//! new ticket supersedes the previous one and aborts its task. A result may
//! only be applied while its ticket is still current.

use parking_lot::Mutex;
use tokio::task::AbortHandle;

/// Generation number captured when a fetch is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Default)]
struct GuardInner {
    generation: u64,
    /// True between `begin` and `finish` of the current ticket
    outstanding: bool,
    task: Option<AbortHandle>,
}

impl GuardInner {
    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[derive(Default)]
pub struct RequestGuard {
    inner: Mutex<GuardInner>,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    // == Begin ==
    /// Supersedes any outstanding request and issues a fresh ticket.
    pub fn begin(&self) -> Ticket {
        let mut inner = self.inner.lock();
        inner.abort_task();
        inner.generation += 1;
        inner.outstanding = true;
        Ticket(inner.generation)
    }

    // == Attach ==
    /// Associates the task running `ticket` so a later supersede can abort it.
    ///
    /// A task attached after its ticket was superseded is aborted at once.
    pub fn attach(&self, ticket: Ticket, task: AbortHandle) {
        let mut inner = self.inner.lock();
        if inner.generation == ticket.0 && inner.outstanding {
            inner.task = Some(task);
        } else {
            task.abort();
        }
    }

    // == Is Current ==
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.inner.lock().generation == ticket.0
    }

    // == Finish ==
    /// Marks `ticket` as settled. No-op for superseded tickets.
    pub fn finish(&self, ticket: Ticket) {
        let mut inner = self.inner.lock();
        if inner.generation == ticket.0 {
            inner.outstanding = false;
            inner.task = None;
        }
    }

    // == Cancel ==
    /// Invalidates the current ticket and aborts its task.
    ///
    /// Returns true if a request was outstanding.
    pub fn cancel(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.abort_task();
        inner.generation += 1;
        std::mem::replace(&mut inner.outstanding, false)
    }

    /// Cancels `ticket` only if it is still the outstanding request.
    ///
    /// Returns true if it was.
    pub fn cancel_ticket(&self, ticket: Ticket) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != ticket.0 || !inner.outstanding {
            return false;
        }
        inner.abort_task();
        inner.generation += 1;
        inner.outstanding = false;
        true
    }

    pub fn is_outstanding(&self) -> bool {
        self.inner.lock().outstanding
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.inner.get_mut().abort_task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_ticket_supersedes_old() {
        let guard = RequestGuard::new();
        let a = guard.begin();
        let b = guard.begin();

        assert!(!guard.is_current(a));
        assert!(guard.is_current(b));
    }

    #[test]
    fn test_late_result_is_rejected_after_cancel() {
        let guard = RequestGuard::new();
        let ticket = guard.begin();

        assert!(guard.cancel());
        assert!(!guard.is_current(ticket));
        assert!(!guard.cancel(), "nothing outstanding after cancel");
    }

    #[test]
    fn test_finish_clears_outstanding() {
        let guard = RequestGuard::new();
        let ticket = guard.begin();
        assert!(guard.is_outstanding());

        guard.finish(ticket);
        assert!(!guard.is_outstanding());
        assert!(guard.is_current(ticket));
    }

    #[test]
    fn test_finish_of_superseded_ticket_is_ignored() {
        let guard = RequestGuard::new();
        let old = guard.begin();
        let _new = guard.begin();

        guard.finish(old);
        assert!(guard.is_outstanding());
    }

    #[test]
    fn test_cancel_ticket_ignores_superseded_ticket() {
        let guard = RequestGuard::new();
        let old = guard.begin();
        let current = guard.begin();

        assert!(!guard.cancel_ticket(old));
        assert!(guard.is_current(current));

        assert!(guard.cancel_ticket(current));
        assert!(!guard.is_outstanding());
        assert!(!guard.cancel_ticket(current));
    }

    #[tokio::test(start_paused = true)]
    async fn test_begin_aborts_attached_task() {
        let guard = RequestGuard::new();
        let ticket = guard.begin();
        let task = tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
        guard.attach(ticket, task.abort_handle());

        guard.begin();

        let joined = task.await;
        assert!(joined.unwrap_err().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_after_supersede_aborts() {
        let guard = RequestGuard::new();
        let stale = guard.begin();
        guard.begin();

        let task = tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
        guard.attach(stale, task.abort_handle());

        assert!(task.await.unwrap_err().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_task() {
        let guard = RequestGuard::new();
        let ticket = guard.begin();
        let task = tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
        guard.attach(ticket, task.abort_handle());

        drop(guard);

        assert!(task.await.unwrap_err().is_cancelled());
    }
}
