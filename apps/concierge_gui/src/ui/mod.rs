//! UI layer: headless document, page skeleton, focus-trap modal and the egui shell.

pub mod app;
pub mod document;
pub mod layout;
pub mod modal;
pub mod registry;
pub mod render;
pub mod tags;

pub use app::ConciergeApp;
