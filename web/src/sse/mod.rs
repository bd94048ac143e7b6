//! SSE HTTP handler for the web layer.
//!
//! Connection bookkeeping and delivery live in the `realtime` crate; this
//! module only turns an authenticated request into a streaming response.

pub mod handler;
