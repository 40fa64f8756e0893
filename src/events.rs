//! Event bindings for the page.
//!
//! [`bind_interactions`] builds the binding table once. Delete links are
//! created long after that, every time a search renders a fragment, so their
//! binding is delegated: it is registered against the page root and resolved
//! against the clicked element when the event arrives.

use entity_core::EntityId;

use crate::view::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    KeyPress(Key),
}

/// Elements an event can target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    SearchButton,
    SearchField,
    SubmitButton,
    TextField,
    /// The delete link inside the fragment of `owner`.
    DeleteLink { owner: EntityId },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: Element,
}

impl Event {
    pub fn click(target: Element) -> Self {
        Self {
            kind: EventKind::Click,
            target,
        }
    }

    pub fn key(target: Element, key: Key) -> Self {
        Self {
            kind: EventKind::KeyPress(key),
            target,
        }
    }
}

/// Which elements a binding applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    SubmitButton,
    SearchButton,
    SearchField,
    /// Any delete link, including ones rendered after binding.
    DeleteAffordance,
}

impl Selector {
    fn matches(self, element: &Element) -> bool {
        matches!(
            (self, element),
            (Self::SubmitButton, Element::SubmitButton)
                | (Self::SearchButton, Element::SearchButton)
                | (Self::SearchField, Element::SearchField)
                | (Self::DeleteAffordance, Element::DeleteLink { .. })
        )
    }

    pub fn is_delegated(self) -> bool {
        matches!(self, Self::DeleteAffordance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Click,
    Enter,
}

impl Trigger {
    fn fires_on(self, kind: EventKind) -> bool {
        match self {
            Self::Click => kind == EventKind::Click,
            Self::Enter => kind == EventKind::KeyPress(Key::Enter),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Submit,
    Search,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub selector: Selector,
    pub trigger: Trigger,
    pub handler: Handler,
}

/// What the controller should do in response to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Search(EntityId),
    Delete(EntityId),
    Submit(String),
}

#[derive(Debug, Clone)]
pub struct Bindings {
    bindings: Vec<Binding>,
}

/// Build the page's binding table.
pub fn bind_interactions() -> Bindings {
    let binding = |selector, trigger, handler| Binding {
        selector,
        trigger,
        handler,
    };
    Bindings {
        bindings: vec![
            binding(Selector::SubmitButton, Trigger::Click, Handler::Submit),
            binding(Selector::SearchButton, Trigger::Click, Handler::Search),
            binding(Selector::SearchField, Trigger::Enter, Handler::Search),
            binding(Selector::DeleteAffordance, Trigger::Click, Handler::Delete),
        ],
    }
}

impl Bindings {
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    /// Resolve an event to an action using the page as it is right now.
    pub fn resolve(&self, event: &Event, page: &Page) -> Option<Action> {
        let binding = self
            .bindings
            .iter()
            .find(|b| b.trigger.fires_on(event.kind) && b.selector.matches(&event.target))?;

        match binding.handler {
            Handler::Submit => Some(Action::Submit(page.text_field().to_string())),
            Handler::Search => Some(Action::Search(EntityId::from(page.search_field()))),
            Handler::Delete => match &event.target {
                // Stale or never-rendered links do not fire.
                Element::DeleteLink { owner } if page.has_live_affordance(owner) => {
                    Some(Action::Delete(owner.clone()))
                }
                _ => None,
            },
        }
    }
}
