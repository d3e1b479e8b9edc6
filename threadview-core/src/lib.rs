//! Core of the threadview comment stream.
//!
//! The crate is split into pure view logic and a SQLite-backed store:
//!
//! - [`traversal`] locates the next unseen comments after a focus
//! - [`window`] decides which items are materialized and how
//! - [`pagination`] guards the single outstanding "load more" request
//! - [`deferred`] and [`gate`] hold the alternate-view reveal policies
//! - [`session`] is the per-mount state those policies write into
//! - [`stream`] wires all of the above behind one type
//! - [`db`] and [`schema`] persist comments and serve pages
//!
//! Nothing outside [`db`] performs I/O. Page fetches are started through the
//! [`pagination::PageSource`] trait and reported back by the host.

pub mod config;
pub mod db;
pub mod deferred;
pub mod error;
pub mod gate;
pub mod pagination;
pub mod schema;
pub mod session;
pub mod stream;
pub mod traversal;
pub mod types;
pub mod window;
