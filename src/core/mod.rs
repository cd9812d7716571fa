//! Evaluation core: leaves, groups and the request driver.
//!
//! The only public API from this module is [`Request`]; leaf and group evaluation are
//! reached through [`Element::evaluate`](crate::Element::evaluate).
//!
//! Internal modules:
//! - [`leaf`]: races completion against deadline under a cancellation token;
//! - [`group`]: sequential/parallel traversal, group deadline, stop-on-first-success;
//! - [`request`]: aggregates outcomes, first-success notification, completion callback.

mod group;
mod leaf;
mod request;

pub(crate) use group::evaluate_group;
pub(crate) use leaf::evaluate_leaf;
pub use request::Request;
