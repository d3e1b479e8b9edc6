//! Background loading for threadview.
//!
//! The loader owns no thread of its own: every request is a short tokio task
//! that queries the comment store and sends its result back over the event
//! channel. The main loop applies results in arrival order.
pub mod types;
pub mod worker;
