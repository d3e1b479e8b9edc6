//! SQLite comment store backing the stream's page source.
//!
//! Top-level comments are paged with a keyset cursor on `(created_at, id)`;
//! each page carries its top-level nodes with their replies attached inline.
//! Pages are bounded by a snapshot timestamp taken when the view mounts, so
//! comments posted afterwards never leak into paging and arrive only through
//! [`fetch_arrivals`].

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio_rusqlite::Connection;

use crate::types::{ChildRef, CommentBody, CommentNode, SortOrder};

/// Opens (or creates) the SQLite database at `path`, configures WAL mode,
/// and applies schema migrations via the `schema_version` table.
///
/// Sets `busy_timeout` via the `Connection` method (not a PRAGMA string) so
/// the setting takes effect regardless of pragma caching.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the file cannot be opened, WAL configuration
/// fails, or schema DDL fails.
pub async fn open_db(path: &str) -> Result<Connection, tokio_rusqlite::Error> {
    let conn = Connection::open(path).await?;

    conn.call(|db| -> rusqlite::Result<()> {
        db.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )?;
        db.busy_timeout(Duration::from_secs(5))?;
        Ok(())
    })
    .await?;

    conn.call(|db| -> rusqlite::Result<()> {
        db.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    })
    .await?;

    conn.call(|db| -> rusqlite::Result<()> {
        crate::schema::migrate(db)?;
        Ok(())
    })
    .await?;

    Ok(conn)
}

/// Returns the current Unix timestamp in seconds.
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// A comment to be written by [`insert_comment`].
#[derive(Debug, Clone)]
pub struct NewComment {
    pub author: String,
    pub body: String,
    /// Top-level ancestor for a reply; `None` posts a top-level comment.
    pub root_id: Option<String>,
    pub seen: Option<bool>,
    /// Explicit timestamp; `None` uses the current time.
    pub created_at: Option<i64>,
}

/// Keyset position after the last top-level comment of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub created_at: i64,
    pub id: String,
}

/// Parameters for [`fetch_page`].
#[derive(Debug, Clone)]
pub struct PageQuery {
    pub order: SortOrder,
    /// Continue after this position; `None` starts from the beginning.
    pub after: Option<PageCursor>,
    pub limit: usize,
    /// Only comments created at or before this timestamp are paged.
    pub snapshot: i64,
}

/// One page of top-level comments.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Top-level nodes in page order, replies attached.
    pub nodes: Vec<CommentNode>,
    /// Content for every node and reply in the page.
    pub bodies: Vec<CommentBody>,
    /// Cursor to pass as `after` for the next page.
    pub next_cursor: Option<PageCursor>,
    pub has_more: bool,
}

/// Inserts a comment and returns it as stored.
///
/// Uses `BEGIN IMMEDIATE` so concurrent writers serialize cleanly.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the insert fails, including when
/// `root_id` does not name an existing comment.
pub async fn insert_comment(
    conn: &Connection,
    comment: NewComment,
) -> Result<CommentBody, tokio_rusqlite::Error> {
    conn.call(move |db| -> rusqlite::Result<CommentBody> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = comment.created_at.unwrap_or_else(now_secs);
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO comments (id, root_id, author, body, created_at, seen)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                &id,
                &comment.root_id,
                &comment.author,
                &comment.body,
                created_at,
                comment.seen
            ],
        )?;
        tx.commit()?;
        Ok(CommentBody {
            id,
            root_id: comment.root_id,
            author: comment.author,
            body: comment.body,
            created_at,
        })
    })
    .await
}

/// Loads one page of top-level comments with their replies.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if either query fails.
pub async fn fetch_page(conn: &Connection, query: PageQuery) -> Result<Page, tokio_rusqlite::Error> {
    conn.call(move |db| -> rusqlite::Result<Page> {
        let sql = match query.order {
            SortOrder::NewestFirst => {
                "SELECT id, root_id, author, body, created_at, seen FROM comments
                 WHERE root_id IS NULL AND created_at <= ?1
                   AND (?2 IS NULL OR (created_at, id) < (?2, ?3))
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?4"
            }
            SortOrder::OldestFirst => {
                "SELECT id, root_id, author, body, created_at, seen FROM comments
                 WHERE root_id IS NULL AND created_at <= ?1
                   AND (?2 IS NULL OR (created_at, id) > (?2, ?3))
                 ORDER BY created_at ASC, id ASC
                 LIMIT ?4"
            }
        };
        let (after_ts, after_id) = match &query.after {
            Some(c) => (Some(c.created_at), Some(c.id.clone())),
            None => (None, None),
        };
        // One extra row tells us whether another page exists.
        let probe = query.limit as i64 + 1;
        let mut roots = {
            let mut stmt = db.prepare(sql)?;
            let rows = stmt
                .query_map(
                    rusqlite::params![query.snapshot, after_ts, after_id, probe],
                    read_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        let has_more = roots.len() > query.limit;
        roots.truncate(query.limit);
        let next_cursor = roots.last().map(|(body, _)| PageCursor {
            created_at: body.created_at,
            id: body.id.clone(),
        });
        let (nodes, bodies) = attach_replies(db, roots)?;
        Ok(Page { nodes, bodies, next_cursor, has_more })
    })
    .await
}

/// Loads top-level comments created after `snapshot`, oldest first.
///
/// `after` continues from the last arrival already delivered.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if either query fails.
pub async fn fetch_arrivals(
    conn: &Connection,
    snapshot: i64,
    after: Option<PageCursor>,
    limit: usize,
) -> Result<Page, tokio_rusqlite::Error> {
    conn.call(move |db| -> rusqlite::Result<Page> {
        let (after_ts, after_id) = match &after {
            Some(c) => (Some(c.created_at), Some(c.id.clone())),
            None => (None, None),
        };
        let probe = limit as i64 + 1;
        let mut roots = {
            let mut stmt = db.prepare(
                "SELECT id, root_id, author, body, created_at, seen FROM comments
                 WHERE root_id IS NULL AND created_at > ?1
                   AND (?2 IS NULL OR (created_at, id) > (?2, ?3))
                 ORDER BY created_at ASC, id ASC
                 LIMIT ?4",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![snapshot, after_ts, after_id, probe], read_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        let has_more = roots.len() > limit;
        roots.truncate(limit);
        let next_cursor = roots
            .last()
            .map(|(body, _)| PageCursor { created_at: body.created_at, id: body.id.clone() })
            .or(after);
        let (nodes, bodies) = attach_replies(db, roots)?;
        Ok(Page { nodes, bodies, next_cursor, has_more })
    })
    .await
}

/// Flags `ids` as seen. Comments whose flag is NULL or already set are left
/// alone. Returns the number of rows changed.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the `BEGIN IMMEDIATE` transaction fails.
pub async fn mark_seen(conn: &Connection, ids: Vec<String>) -> Result<usize, tokio_rusqlite::Error> {
    conn.call(move |db| -> rusqlite::Result<usize> {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let mut changed = 0;
        {
            let mut stmt = tx.prepare("UPDATE comments SET seen = 1 WHERE id = ?1 AND seen = 0")?;
            for id in &ids {
                changed += stmt.execute(rusqlite::params![id])?;
            }
        }
        tx.commit()?;
        Ok(changed)
    })
    .await
}

/// Number of top-level comments in the store.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the query fails.
pub async fn count_top_level(conn: &Connection) -> Result<i64, tokio_rusqlite::Error> {
    conn.call(|db| -> rusqlite::Result<i64> {
        db.query_row("SELECT COUNT(*) FROM comments WHERE root_id IS NULL", [], |r| r.get(0))
    })
    .await
}

const DEMO_AUTHORS: [&str; 6] = ["ada", "brendan", "carmen", "dmitri", "eun-ji", "farouk"];
const DEMO_LINES: [&str; 5] = [
    "This matches what I saw on the ground last week.",
    "Does anyone have a source for the second figure?",
    "Strong piece. The middle section could use a chart.",
    "I disagree with the conclusion, but the reporting is solid.",
    "Following this thread for updates.",
];

/// Fills the store with `roots` top-level comments and a few replies each,
/// spaced one minute apart and ending at `until`.
///
/// The seen pattern is deterministic: every fourth root is unseen, and
/// replies are unseen on a separate cadence, so both root and reply hits exist.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the transaction fails.
pub async fn seed_demo(
    conn: &Connection,
    roots: usize,
    until: i64,
) -> Result<usize, tokio_rusqlite::Error> {
    conn.call(move |db| -> rusqlite::Result<usize> {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO comments (id, root_id, author, body, created_at, seen)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for i in 0..roots {
                let root_id = uuid::Uuid::new_v4().to_string();
                let root_ts = until - ((roots - i) as i64) * 60;
                stmt.execute(rusqlite::params![
                    &root_id,
                    Option::<String>::None,
                    DEMO_AUTHORS[i % DEMO_AUTHORS.len()],
                    DEMO_LINES[i % DEMO_LINES.len()],
                    root_ts,
                    Some(i % 4 != 1),
                ])?;
                inserted += 1;
                for j in 0..(i % 3) {
                    stmt.execute(rusqlite::params![
                        uuid::Uuid::new_v4().to_string(),
                        &root_id,
                        DEMO_AUTHORS[(i + j + 1) % DEMO_AUTHORS.len()],
                        DEMO_LINES[(i + j + 2) % DEMO_LINES.len()],
                        root_ts + 1 + j as i64,
                        Some((i + j) % 5 != 0),
                    ])?;
                    inserted += 1;
                }
            }
        }
        tx.commit()?;
        Ok(inserted)
    })
    .await
}

fn read_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<(CommentBody, Option<bool>)> {
    Ok((
        CommentBody {
            id: r.get(0)?,
            root_id: r.get(1)?,
            author: r.get(2)?,
            body: r.get(3)?,
            created_at: r.get(4)?,
        },
        r.get(5)?,
    ))
}

/// Builds nodes for `roots` by loading each root's replies in reply order.
fn attach_replies(
    db: &rusqlite::Connection,
    roots: Vec<(CommentBody, Option<bool>)>,
) -> rusqlite::Result<(Vec<CommentNode>, Vec<CommentBody>)> {
    let mut stmt = db.prepare_cached(
        "SELECT id, root_id, author, body, created_at, seen FROM comments
         WHERE root_id = ?1
         ORDER BY created_at ASC, id ASC",
    )?;
    let mut nodes = Vec::with_capacity(roots.len());
    let mut bodies = Vec::with_capacity(roots.len());
    for (root, seen) in roots {
        let replies = stmt
            .query_map(rusqlite::params![&root.id], read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let mut node = CommentNode::new(root.id.clone(), seen);
        node.children = replies
            .iter()
            .map(|(body, seen)| ChildRef::new(body.id.clone(), *seen))
            .collect();
        bodies.push(root);
        bodies.extend(replies.into_iter().map(|(body, _)| body));
        nodes.push(node);
    }
    Ok((nodes, bodies))
}
