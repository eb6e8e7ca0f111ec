//! The per-user session.

use crate::StateTag;
use derive_getters::Getters;
use marquee_core::{ContentRecord, LinkEntry, MediaKind};

/// Rendered outputs of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Artifacts {
    /// Chat caption
    caption: String,
    /// Blog HTML snippet
    html: String,
    /// Composed poster, absent when no image could be produced
    poster: Option<Vec<u8>>,
}

impl Artifacts {
    /// Bundle rendered outputs.
    pub fn new(caption: String, html: String, poster: Option<Vec<u8>>) -> Self {
        Self {
            caption,
            html,
            poster,
        }
    }
}

/// Conversation state for one user.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Session {
    /// Current state
    state: StateTag,
    /// Record being assembled
    record: ContentRecord,
    /// Accepted links, in entry order
    links: Vec<LinkEntry>,
    /// Label waiting for its URL
    pending_label: Option<String>,
    /// Set once synthesis completes
    generated: Option<Artifacts>,
}

impl Session {
    fn with(state: StateTag, record: ContentRecord) -> Self {
        Self {
            state,
            record,
            links: Vec::new(),
            pending_label: None,
            generated: None,
        }
    }

    /// Session for a title picked from search results.
    pub fn from_selection(record: ContentRecord) -> Self {
        Self::with(StateTag::AwaitingLanguage, record)
    }

    /// Session for manual entry, starting at the title.
    pub fn manual(kind: MediaKind) -> Self {
        Self::with(StateTag::ManualWaitTitle, ContentRecord::new("", kind))
    }

    /// Store rendered artifacts and move to `done`.
    pub fn finish(&mut self, artifacts: Artifacts) {
        self.generated = Some(artifacts);
        self.state = StateTag::Done;
    }

    pub(crate) fn set_state(&mut self, state: StateTag) {
        self.state = state;
    }

    pub(crate) fn record_mut(&mut self) -> &mut ContentRecord {
        &mut self.record
    }

    pub(crate) fn set_pending_label(&mut self, label: Option<String>) {
        self.pending_label = label;
    }

    pub(crate) fn push_link(&mut self, link: LinkEntry) {
        self.links.push(link);
        self.pending_label = None;
    }
}
