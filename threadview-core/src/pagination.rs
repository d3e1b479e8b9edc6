//! Single-flight pagination trigger.
//!
//! The trigger sits between the stream and an external [`PageSource`]. At most
//! one page request is outstanding at any time: calls made while a request is
//! pending are rejected outright, never queued.
//!
//! Requests are asynchronous. [`PageSource::request_page`] only starts the
//! fetch; the host later reports the result through
//! [`PaginationTrigger::complete`] with the request's sequence number, which
//! clears the in-flight flag whether the fetch succeeded or failed.
//!
//! Failures are logged, counted, and otherwise swallowed. The next end-of-window
//! or traversal trigger is what retries.

use std::fmt;

use tracing::{info, info_span, warn};

use crate::error::{PageError, TriggerError};

/// One page request handed to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Monotonic request number; echoed back on completion.
    pub seq: u64,
    pub page_size: usize,
}

/// The external "load more" collaborator.
pub trait PageSource {
    /// Whether more pages may exist upstream.
    fn has_more(&self) -> bool;

    /// Whether the source itself reports a fetch in progress.
    fn is_loading(&self) -> bool;

    /// Starts fetching the next page. Must not block on the fetch.
    ///
    /// # Errors
    ///
    /// Returns `TriggerError` when the request could not be started at all.
    fn request_page(&mut self, request: PageRequest) -> Result<(), TriggerError>;
}

/// Why [`PaginationTrigger::try_load_more`] did or did not issue a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadDecision {
    Requested { seq: u64 },
    /// The source reports no more data.
    Exhausted,
    /// A request is already outstanding.
    InFlight,
    /// The source refused to start the request.
    Rejected,
}

impl LoadDecision {
    pub fn is_requested(&self) -> bool {
        matches!(self, LoadDecision::Requested { .. })
    }
}

/// Lifecycle notifications for an observer (status line, metrics, tests).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Begin { seq: u64, page_size: usize },
    Success { seq: u64 },
    Error { seq: u64, message: String },
}

/// Summary of a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOutcome {
    pub seq: u64,
    pub failed: bool,
    /// Failures recorded over the trigger's lifetime, including this one.
    pub failures: u32,
}

type Observer = Box<dyn FnMut(&LoadEvent) + Send>;

pub struct PaginationTrigger {
    page_size: usize,
    in_flight: Option<u64>,
    next_seq: u64,
    failures: u32,
    last_failure: Option<String>,
    observer: Option<Observer>,
}

impl fmt::Debug for PaginationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginationTrigger")
            .field("page_size", &self.page_size)
            .field("in_flight", &self.in_flight)
            .field("next_seq", &self.next_seq)
            .field("failures", &self.failures)
            .field("last_failure", &self.last_failure)
            .finish_non_exhaustive()
    }
}

impl PaginationTrigger {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            in_flight: None,
            next_seq: 1,
            failures: 0,
            last_failure: None,
            observer: None,
        }
    }

    /// Registers a callback for [`LoadEvent`]s.
    #[must_use]
    pub fn with_observer(mut self, observer: impl FnMut(&LoadEvent) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Sequence number of the outstanding request, if any.
    pub fn in_flight_seq(&self) -> Option<u64> {
        self.in_flight
    }

    pub fn failure_count(&self) -> u32 {
        self.failures
    }

    /// Message of the most recent failure, cleared by the next successful page.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Requests the next page unless the source is exhausted or a request is
    /// already outstanding.
    pub fn try_load_more<S>(&mut self, source: &mut S) -> LoadDecision
    where
        S: PageSource + ?Sized,
    {
        if !source.has_more() {
            return LoadDecision::Exhausted;
        }
        if self.in_flight.is_some() || source.is_loading() {
            return LoadDecision::InFlight;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let span = info_span!("load_more", seq, page_size = self.page_size);
        let _enter = span.enter();

        self.in_flight = Some(seq);
        self.emit(LoadEvent::Begin { seq, page_size: self.page_size });

        let request = PageRequest { seq, page_size: self.page_size };
        match source.request_page(request) {
            Ok(()) => {
                info!("requested next page");
                LoadDecision::Requested { seq }
            }
            Err(err) => {
                self.in_flight = None;
                self.record_failure(seq, err.to_string());
                LoadDecision::Rejected
            }
        }
    }

    /// Reports the result of request `seq` and clears the in-flight flag.
    ///
    /// Completions for any other sequence number are ignored and return `None`.
    pub fn complete(&mut self, seq: u64, result: Result<(), PageError>) -> Option<PageOutcome> {
        if self.in_flight != Some(seq) {
            warn!(seq, in_flight = ?self.in_flight, "ignoring completion for unknown request");
            return None;
        }
        self.in_flight = None;

        let span = info_span!("load_more", seq, page_size = self.page_size);
        let _enter = span.enter();
        let failed = match result {
            Ok(()) => {
                info!("page loaded");
                self.last_failure = None;
                self.emit(LoadEvent::Success { seq });
                false
            }
            Err(err) => {
                self.record_failure(seq, err.to_string());
                true
            }
        };
        Some(PageOutcome { seq, failed, failures: self.failures })
    }

    fn record_failure(&mut self, seq: u64, message: String) {
        warn!(seq, error = %message, "page fetch failed");
        self.failures = self.failures.saturating_add(1);
        self.last_failure = Some(message.clone());
        self.emit(LoadEvent::Error { seq, message });
    }

    fn emit(&mut self, event: LoadEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
    }
}
