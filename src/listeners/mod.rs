//! # Listener contracts.
//!
//! Two boundaries exist between the engine and its callers:
//! - [`OutcomeListener`] - one callback per leaf outcome, used by leaves and groups;
//! - [`RequestListener`] - request-level `on_loaded` (at most once) and `on_completed` (exactly once).
//!
//! Groups decorate the listener they receive (forward first, then react), which is plain
//! closure composition over [`OutcomeListener`].

mod outcome;
mod report;
mod request;

pub use outcome::{forward, OutcomeListener};
pub use report::LoadReport;
pub use request::RequestListener;
