//! Controller layer: UI events, page routing, feature orchestration and backend command dispatch.

pub mod events;
pub mod features;
pub mod orchestration;
pub mod router;
