//! Publishing finished artifacts.
//!
//! The [`PublicationCoordinator`] turns a publication [`marquee_session::Action`]
//! into outbound intents: caption text, inline or attached HTML, a hosted
//! paste link, or a poster post to the user's channel. Failures are reported to
//! the user with a fallback artifact where one exists.
//!
//! Per-user settings (destination channel, ad link, promo footer) live in
//! [`Preferences`], a set of small JSON files rewritten whole on every change.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod coordinator;
mod paste;
mod prefs;

pub use coordinator::{
    PublicationCoordinator, PublishOptions, PublishOptionsBuilder, PublishRequest,
};
pub use paste::{HttpPasteService, PasteConfig, PasteConfigBuilder};
pub use prefs::{JsonPreferenceStore, Preferences, PromoConfig};
