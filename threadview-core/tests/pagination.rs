//! Single-flight pagination trigger against a recording page source.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use threadview_core::error::{PageError, TriggerError};
use threadview_core::pagination::{
    LoadDecision, LoadEvent, PageOutcome, PageRequest, PageSource, PaginationTrigger,
};

#[derive(Debug, Default)]
struct FakeSource {
    has_more: bool,
    loading: bool,
    refuse: bool,
    requests: Vec<PageRequest>,
}

impl FakeSource {
    fn with_more() -> Self {
        Self { has_more: true, ..Self::default() }
    }
}

impl PageSource for FakeSource {
    fn has_more(&self) -> bool {
        self.has_more
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn request_page(&mut self, request: PageRequest) -> Result<(), TriggerError> {
        if self.refuse {
            return Err(TriggerError::LoaderClosed);
        }
        self.requests.push(request);
        Ok(())
    }
}

#[test]
fn second_call_while_pending_is_rejected() {
    let mut source = FakeSource::with_more();
    let mut trigger = PaginationTrigger::new(10);

    assert_eq!(trigger.try_load_more(&mut source), LoadDecision::Requested { seq: 1 });
    assert_eq!(trigger.try_load_more(&mut source), LoadDecision::InFlight);
    assert_eq!(source.requests, vec![PageRequest { seq: 1, page_size: 10 }]);
}

#[test]
fn exhausted_source_is_never_asked() {
    let mut source = FakeSource::default();
    let mut trigger = PaginationTrigger::new(10);
    assert_eq!(trigger.try_load_more(&mut source), LoadDecision::Exhausted);
    assert!(source.requests.is_empty());
    assert!(!trigger.is_in_flight());
}

#[test]
fn source_reporting_loading_blocks_request() {
    let mut source = FakeSource { loading: true, ..FakeSource::with_more() };
    let mut trigger = PaginationTrigger::new(10);
    assert_eq!(trigger.try_load_more(&mut source), LoadDecision::InFlight);
    assert!(source.requests.is_empty());
}

#[test]
fn failure_clears_flag_and_allows_retry() {
    let mut source = FakeSource::with_more();
    let mut trigger = PaginationTrigger::new(10);

    trigger.try_load_more(&mut source);
    let outcome = trigger.complete(1, Err(PageError::Fetch("timeout".to_owned())));
    assert_eq!(outcome, Some(PageOutcome { seq: 1, failed: true, failures: 1 }));
    assert!(!trigger.is_in_flight());
    assert_eq!(trigger.last_failure(), Some("page fetch failed: timeout"));

    assert_eq!(trigger.try_load_more(&mut source), LoadDecision::Requested { seq: 2 });
}

#[test]
fn completion_for_unknown_request_is_ignored() {
    let mut source = FakeSource::with_more();
    let mut trigger = PaginationTrigger::new(10);
    trigger.try_load_more(&mut source);

    assert_eq!(trigger.complete(7, Ok(())), None);
    assert_eq!(trigger.in_flight_seq(), Some(1), "stale completion must not clear the flag");

    assert_eq!(trigger.complete(1, Ok(())), Some(PageOutcome { seq: 1, failed: false, failures: 0 }));
    assert_eq!(trigger.complete(1, Ok(())), None, "double completion is ignored");
}

#[test]
fn refused_request_is_not_left_in_flight() {
    let mut source = FakeSource { refuse: true, ..FakeSource::with_more() };
    let mut trigger = PaginationTrigger::new(10);
    assert_eq!(trigger.try_load_more(&mut source), LoadDecision::Rejected);
    assert!(!trigger.is_in_flight());
    assert_eq!(trigger.failure_count(), 1);
}

#[test]
fn observer_sees_each_lifecycle_step() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut trigger =
        PaginationTrigger::new(5).with_observer(move |e| sink.lock().unwrap().push(e.clone()));
    let mut source = FakeSource::with_more();

    trigger.try_load_more(&mut source);
    trigger.complete(1, Ok(()));
    trigger.try_load_more(&mut source);
    trigger.complete(2, Err(PageError::Disconnected));

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            LoadEvent::Begin { seq: 1, page_size: 5 },
            LoadEvent::Success { seq: 1 },
            LoadEvent::Begin { seq: 2, page_size: 5 },
            LoadEvent::Error { seq: 2, message: "page loader disconnected".to_owned() },
        ]
    );
}

#[test]
fn success_clears_last_failure_but_keeps_count() {
    let mut source = FakeSource::with_more();
    let mut trigger = PaginationTrigger::new(10);
    trigger.try_load_more(&mut source);
    trigger.complete(1, Err(PageError::Disconnected));
    trigger.try_load_more(&mut source);
    trigger.complete(2, Ok(()));
    assert_eq!(trigger.last_failure(), None);
    assert_eq!(trigger.failure_count(), 1);
}
