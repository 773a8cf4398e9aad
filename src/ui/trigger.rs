//! Speak triggers: what text a trigger reads and how it looks meanwhile
//!
//! Text is resolved in a fixed order: the trigger's own text, then its
//! target element, then the default question element, then the first
//! text-bearing element in the trigger's container.

use crate::speech::SpeechDispatcher;
use log::{debug, error};
use std::sync::Arc;
use std::time::Duration;

/// Element read when a trigger names nothing else
pub const DEFAULT_CONTENT_ELEMENT: &str = "questionText";

/// How long success/error styling stays before the trigger resets
pub const DEFAULT_RESET_AFTER: Duration = Duration::from_secs(2);

/// Read-only view of the content a trigger can point at
pub trait ContentTree {
    /// Text of the element with `id`, if it exists
    fn text_of(&self, id: &str) -> Option<String>;

    /// Text of the first text-bearing element inside the nearest container
    /// around `trigger_id`
    fn container_text(&self, trigger_id: &str) -> Option<String>;
}

/// A control that speaks something when activated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trigger {
    pub id: String,
    /// Literal text to speak
    pub text: Option<String>,
    /// Id of the element whose text to speak
    pub target: Option<String>,
}

impl Trigger {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Resolve what `trigger` should speak
///
/// The first source that exists wins even if it turns out blank; blank
/// text resolves to `None`.
pub fn resolve_text(trigger: &Trigger, tree: &dyn ContentTree) -> Option<String> {
    let found = trigger
        .text
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| trigger.target.as_deref().and_then(|t| tree.text_of(t)))
        .or_else(|| tree.text_of(DEFAULT_CONTENT_ELEMENT))
        .or_else(|| tree.container_text(&trigger.id));

    found.filter(|t| !t.trim().is_empty())
}

/// Visual state of a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Default,
    Loading,
    Success,
    Error,
}

impl TriggerState {
    /// Triggers cannot be pressed again while loading
    pub fn is_enabled(self) -> bool {
        self != TriggerState::Loading
    }
}

/// Renders trigger state changes
pub trait TriggerView: Send + Sync {
    fn render(&self, trigger_id: &str, state: TriggerState);
}

/// A trigger bound to a view
pub struct TriggerButton {
    trigger: Trigger,
    view: Arc<dyn TriggerView>,
    reset_after: Duration,
}

impl TriggerButton {
    pub fn new(trigger: Trigger, view: Arc<dyn TriggerView>) -> Self {
        Self {
            trigger,
            view,
            reset_after: DEFAULT_RESET_AFTER,
        }
    }

    pub fn with_reset_after(mut self, reset_after: Duration) -> Self {
        self.reset_after = reset_after;
        self
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn resolve(&self, tree: &dyn ContentTree) -> Option<String> {
        resolve_text(&self.trigger, tree)
    }

    /// Speak `text` while walking the view through loading, the outcome and
    /// back to default
    ///
    /// Returns the outcome state, or `None` when there was nothing to say.
    pub async fn activate(
        &self,
        dispatcher: &SpeechDispatcher,
        text: Option<String>,
    ) -> Option<TriggerState> {
        let text = text?;
        let id = self.trigger.id.as_str();

        self.view.render(id, TriggerState::Loading);
        let outcome = match dispatcher.speak_default(&text).await {
            Ok(_) => TriggerState::Success,
            Err(e) => {
                error!("Speech failed for trigger {}: {}", id, e);
                TriggerState::Error
            }
        };
        self.view.render(id, outcome);

        tokio::time::sleep(self.reset_after).await;
        self.view.render(id, TriggerState::Default);
        debug!("Trigger {} reset", id);

        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Page {
        elements: HashMap<String, String>,
        containers: HashMap<String, String>,
    }

    impl Page {
        fn with(mut self, id: &str, text: &str) -> Self {
            self.elements.insert(id.to_string(), text.to_string());
            self
        }

        fn with_container(mut self, trigger: &str, text: &str) -> Self {
            self.containers.insert(trigger.to_string(), text.to_string());
            self
        }
    }

    impl ContentTree for Page {
        fn text_of(&self, id: &str) -> Option<String> {
            self.elements.get(id).cloned()
        }

        fn container_text(&self, trigger_id: &str) -> Option<String> {
            self.containers.get(trigger_id).cloned()
        }
    }

    #[test]
    fn test_explicit_text_first() {
        let page = Page::default().with("questionText", "Question");
        let trigger = Trigger::new("t").with_text("Literal").with_target("questionText");
        assert_eq!(resolve_text(&trigger, &page).as_deref(), Some("Literal"));
    }

    #[test]
    fn test_target_before_default() {
        let page = Page::default()
            .with("questionText", "Question")
            .with("explanationText", "Because");
        let trigger = Trigger::new("t").with_target("explanationText");
        assert_eq!(resolve_text(&trigger, &page).as_deref(), Some("Because"));
    }

    #[test]
    fn test_missing_target_falls_through() {
        let page = Page::default().with("questionText", "Question");
        let trigger = Trigger::new("t").with_target("nowhere");
        assert_eq!(resolve_text(&trigger, &page).as_deref(), Some("Question"));
    }

    #[test]
    fn test_container_last() {
        let page = Page::default().with_container("t", "Nearby text");
        assert_eq!(
            resolve_text(&Trigger::new("t"), &page).as_deref(),
            Some("Nearby text")
        );
        assert_eq!(resolve_text(&Trigger::new("other"), &page), None);
    }

    #[test]
    fn test_blank_target_resolves_to_nothing() {
        let page = Page::default()
            .with("questionText", "Question")
            .with("empty", "   ");
        let trigger = Trigger::new("t").with_target("empty");
        assert_eq!(resolve_text(&trigger, &page), None);
    }

    #[test]
    fn test_loading_disables() {
        assert!(!TriggerState::Loading.is_enabled());
        assert!(TriggerState::Error.is_enabled());
        assert!(TriggerState::Default.is_enabled());
    }
}
