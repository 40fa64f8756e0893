//! Page model standing in for the browser document.
//!
//! The page owns the two input fields, the result container with its rendered
//! fragments, the legacy status area fed by the text form, and a status line
//! used to surface request progress and failures.

use std::time::Duration;

use entity_core::{escape_html, render_entity, Entity, EntityId};

/// Visual transition applied when content is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    FadeIn(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// One line of user-visible feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }
}

/// The rendered representation of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub entity: Entity,
    pub html: String,
    pub visible: bool,
    /// Whether the fragment's delete link can still be clicked.
    pub affordance_visible: bool,
    pub transition: Option<Transition>,
}

impl Fragment {
    pub fn new(entity: Entity, expanded: bool) -> Self {
        let html = render_entity(&entity, expanded);
        Self {
            entity,
            html,
            visible: true,
            affordance_visible: true,
            transition: None,
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.entity.id
    }
}

/// Content of the legacy status area (`#foo`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyArea {
    /// Markup returned by the backend, inserted unmodified.
    pub html: String,
    pub transition: Option<Transition>,
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    search_field: String,
    text_field: String,
    results: Vec<Fragment>,
    legacy: Option<LegacyArea>,
    status: Option<StatusMessage>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_field(&self) -> &str {
        &self.search_field
    }

    pub fn set_search_field(&mut self, value: impl Into<String>) {
        self.search_field = value.into();
    }

    pub fn text_field(&self) -> &str {
        &self.text_field
    }

    pub fn set_text_field(&mut self, value: impl Into<String>) {
        self.text_field = value.into();
    }

    /// Replace the whole result container and fade the new fragments in.
    ///
    /// If the input holds several fragments for one id, the last one wins.
    pub fn replace_results(&mut self, fragments: Vec<Fragment>, fade_in: Duration) {
        self.results.clear();
        for mut fragment in fragments {
            fragment.transition = Some(Transition::FadeIn(fade_in));
            self.upsert_fragment(fragment);
        }
    }

    /// Insert a fragment, replacing any existing fragment with the same id.
    pub fn upsert_fragment(&mut self, fragment: Fragment) {
        match self.results.iter_mut().find(|f| f.id() == fragment.id()) {
            Some(existing) => *existing = fragment,
            None => self.results.push(fragment),
        }
    }

    /// Hide every fragment tagged with `id` along with its delete link.
    ///
    /// Returns the number of fragments that were visible before the call.
    pub fn hide_entity(&mut self, id: &EntityId) -> usize {
        let mut hidden = 0;
        for fragment in self.results.iter_mut().filter(|f| f.id() == id) {
            if fragment.visible {
                hidden += 1;
            }
            fragment.visible = false;
            fragment.affordance_visible = false;
        }
        hidden
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.results
    }

    pub fn visible_fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.results.iter().filter(|f| f.visible)
    }

    /// The visible fragment for `id`, if any.
    pub fn fragment(&self, id: &EntityId) -> Option<&Fragment> {
        self.visible_fragments().find(|f| f.id() == id)
    }

    pub fn fragment_mut(&mut self, id: &EntityId) -> Option<&mut Fragment> {
        self.results.iter_mut().find(|f| f.visible && f.id() == id)
    }

    /// Whether a clickable delete link owned by `id` is on the page.
    pub fn has_live_affordance(&self, id: &EntityId) -> bool {
        self.results
            .iter()
            .any(|f| f.affordance_visible && f.id() == id)
    }

    pub fn legacy(&self) -> Option<&LegacyArea> {
        self.legacy.as_ref()
    }

    pub fn set_legacy(&mut self, html: String, fade_in: Duration) {
        self.legacy = Some(LegacyArea {
            html,
            transition: Some(Transition::FadeIn(fade_in)),
        });
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = Some(status);
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Serialize the visible parts of the page.
    pub fn to_html(&self) -> String {
        let mut output = String::new();

        if let Some(status) = &self.status {
            let class = match status.level {
                StatusLevel::Info => "info",
                StatusLevel::Error => "error",
            };
            output.push_str(&format!(
                "<div id='status' class='{}'>{}</div>\n",
                class,
                escape_html(&status.text)
            ));
        }

        if let Some(legacy) = &self.legacy {
            output.push_str(&format!("<div id='foo'>{}</div>\n", legacy.html));
        }

        output.push_str("<div id='result'>");
        for fragment in self.visible_fragments() {
            output.push_str(&fragment.html);
        }
        output.push_str("</div>\n");
        output
    }
}
