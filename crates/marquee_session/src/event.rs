//! Turn events and publication actions.

use serde::{Deserialize, Serialize};

/// What the user can do with finished artifacts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Send the caption as text
    Caption,
    /// Send the HTML inline or as a document
    Html,
    /// Host the HTML on the paste service
    Paste,
    /// Forward poster and caption to the configured channel
    Channel,
    /// Send the poster again
    Poster,
}

/// One inbound turn routed through the transition table.
///
/// Selection, manual start and cancel replace or remove the whole session and
/// are handled by the caller.
#[derive(Debug, Clone, PartialEq, Eq, strum::EnumDiscriminants)]
#[strum_discriminants(name(EventKind))]
#[strum_discriminants(derive(Hash, strum::Display, strum::EnumIter))]
#[strum_discriminants(doc = "Payload-free tag of an [`Event`], used as the transition table key.")]
pub enum Event {
    /// Free text
    Text(String),
    /// Uploaded photo bytes
    Photo(Vec<u8>),
    /// Yes/no button
    Choice(bool),
    /// Publication button
    Publish(Action),
}

impl Event {
    /// The discriminant used for table lookup.
    pub fn kind(&self) -> EventKind {
        EventKind::from(self)
    }
}
