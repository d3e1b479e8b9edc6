//! Store-backed page source and arrival poller.
//!
//! Neither type blocks the event loop. Each fetch runs on its own tokio task
//! against the shared `tokio_rusqlite::Connection` and reports back through
//! the event channel: `AppEvent::PageLoaded` for pages, `AppEvent::Arrivals`
//! for new comments posted after the view was mounted.

use tokio::sync::mpsc::UnboundedSender;
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use threadview_core::db::{self, Page, PageCursor, PageQuery};
use threadview_core::error::{PageError, TriggerError};
use threadview_core::pagination::{PageRequest, PageSource};
use threadview_core::types::SortOrder;

use crate::event::AppEvent;
use crate::loader::types::{ArrivalPayload, PagePayload};

/// Most arrivals delivered by a single poll.
const ARRIVAL_BATCH: usize = 50;

/// Pages top-level comments out of the store for the pagination trigger.
///
/// Tracks the keyset cursor and whether the last page reported more data.
/// Pages are bounded by `snapshot` so that comments posted after mount only
/// ever show up as arrivals.
pub struct StorePageSource {
    conn: Connection,
    tx: UnboundedSender<AppEvent>,
    order: SortOrder,
    snapshot: i64,
    cursor: Option<PageCursor>,
    has_more: bool,
    loading: bool,
}

impl StorePageSource {
    pub fn new(conn: Connection, tx: UnboundedSender<AppEvent>, order: SortOrder, snapshot: i64) -> Self {
        Self { conn, tx, order, snapshot, cursor: None, has_more: true, loading: false }
    }

    /// Records a finished request; `page` is `None` when it failed.
    ///
    /// A failed page keeps the cursor where it was, so the retry fetches the
    /// same page again. Only call this for the request the trigger accepted.
    pub fn finish(&mut self, page: Option<&Page>) {
        self.loading = false;
        if let Some(page) = page {
            self.has_more = page.has_more;
            if page.next_cursor.is_some() {
                self.cursor = page.next_cursor.clone();
            }
        }
    }

    /// Where the next page starts; `None` before the first page.
    pub fn cursor(&self) -> Option<&PageCursor> {
        self.cursor.as_ref()
    }
}

impl PageSource for StorePageSource {
    fn has_more(&self) -> bool {
        self.has_more
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn request_page(&mut self, request: PageRequest) -> Result<(), TriggerError> {
        if self.tx.is_closed() {
            return Err(TriggerError::LoaderClosed);
        }
        self.loading = true;

        let conn = self.conn.clone();
        let tx = self.tx.clone();
        let query = PageQuery {
            order: self.order,
            after: self.cursor.clone(),
            limit: request.page_size,
            snapshot: self.snapshot,
        };
        tokio::spawn(async move {
            let result = db::fetch_page(&conn, query).await.map_err(PageError::from);
            let payload = PagePayload { seq: request.seq, result };
            if tx.send(AppEvent::PageLoaded(Box::new(payload))).is_err() {
                debug!(seq = request.seq, "event loop gone, dropping page");
            }
        });
        Ok(())
    }
}

/// Polls the store for top-level comments created after the mount snapshot.
pub struct ArrivalPoller {
    conn: Connection,
    tx: UnboundedSender<AppEvent>,
    snapshot: i64,
    cursor: Option<PageCursor>,
    pending: bool,
}

impl ArrivalPoller {
    pub fn new(conn: Connection, tx: UnboundedSender<AppEvent>, snapshot: i64) -> Self {
        Self { conn, tx, snapshot, cursor: None, pending: false }
    }

    /// Starts a poll unless one is already running.
    pub fn poll(&mut self) {
        if self.pending {
            return;
        }
        self.pending = true;

        let conn = self.conn.clone();
        let tx = self.tx.clone();
        let snapshot = self.snapshot;
        let after = self.cursor.clone();
        tokio::spawn(async move {
            let result = db::fetch_arrivals(&conn, snapshot, after, ARRIVAL_BATCH)
                .await
                .map_err(PageError::from);
            if tx.send(AppEvent::Arrivals(Box::new(ArrivalPayload { result }))).is_err() {
                debug!("event loop gone, dropping arrivals");
            }
        });
    }

    /// Records a finished poll and advances past what it delivered.
    pub fn finish(&mut self, result: &Result<Page, PageError>) {
        self.pending = false;
        match result {
            Ok(page) => self.cursor = page.next_cursor.clone(),
            Err(err) => warn!(%err, "arrival poll failed"),
        }
    }
}
