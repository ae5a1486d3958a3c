//! Client core for the bookshelf analyzer.
//!
//! Holds everything that does not need a window: the HTTP client for the
//! detection and statistics services, the upload state machine that sequences
//! the two calls, the page state it writes to, and the plot math used by the
//! statistics chart.

pub mod api;
pub mod math;
pub mod model;
pub mod prelude;
pub mod telemetry;
pub mod workflow;

pub use prelude::{ApiError, ApiResult};
