//! UI-facing collaborators of the speech pipeline

pub mod notice;
pub mod trigger;

pub use notice::{ErrorSurface, LoadingIndicator, Notice};
pub use trigger::{resolve_text, ContentTree, Trigger, TriggerButton, TriggerState, TriggerView};
