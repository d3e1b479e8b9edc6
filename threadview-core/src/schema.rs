/// DDL to create the schema_version tracking table.
///
/// Applied unconditionally on every DB open (before checking the version),
/// using `IF NOT EXISTS` so it is safe to run multiple times.
pub const SCHEMA_VERSION_DDL: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL
    ) STRICT;
";

/// DDL for the v1 schema.
///
/// One `comments` table holds the two-level tree: `root_id` is NULL for
/// top-level comments and names the top-level ancestor for every reply.
/// `seen` is nullable; NULL means the flag does not apply to the viewer.
///
/// The `(root_id, created_at, id)` index serves both the top-level page scan
/// (`root_id IS NULL`) and the per-root reply lookup.
pub const SCHEMA_V1_SQL: &str = "
    CREATE TABLE IF NOT EXISTS comments (
        id          TEXT    PRIMARY KEY,
        root_id     TEXT    REFERENCES comments(id) ON DELETE CASCADE,
        author      TEXT    NOT NULL,
        body        TEXT    NOT NULL,
        created_at  INTEGER NOT NULL,
        seen        INTEGER CHECK(seen IN (0, 1))
    ) STRICT;

    CREATE INDEX IF NOT EXISTS comments_by_root
        ON comments (root_id, created_at, id);
";

/// Runs forward-only schema migration to the latest version.
///
/// Idempotent: safe to call on every startup.
///
/// # Errors
///
/// Returns `rusqlite::Error` if the DDL fails or the version row cannot be read.
pub fn migrate(db: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    db.execute_batch(SCHEMA_VERSION_DDL)?;

    let version: i64 = db
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if version < 1 {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute_batch(SCHEMA_V1_SQL)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        tx.commit()?;
    }

    Ok(())
}
