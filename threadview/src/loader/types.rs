//! Owned payloads carried from loader tasks back to the event loop.
//!
//! Everything here is `Send` and free of borrowed lifetimes so it can travel
//! inside an `AppEvent` and be applied to `AppState` without copying.

use threadview_core::db::Page;
use threadview_core::error::PageError;

/// Result of one page request, tagged with the trigger's sequence number.
#[derive(Debug)]
pub struct PagePayload {
    pub seq: u64,
    pub result: Result<Page, PageError>,
}

/// Result of one arrival poll.
#[derive(Debug)]
pub struct ArrivalPayload {
    pub result: Result<Page, PageError>,
}
