//! Trait definitions for the collaborators Marquee talks to.
//!
//! The conversation core never touches the network directly. Messaging,
//! metadata lookup, image download and paste hosting all sit behind the traits
//! in this crate so they can be swapped for test doubles.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod intents;
mod traits;

pub use intents::{
    Button, ButtonAction, ChatId, ChatTarget, Inbound, InboundPayload, InlineArticle, Outbound,
    UserId,
};
pub use traits::{
    ImageFetcher, Messenger, MetadataProvider, PasteOutcome, PasteService, SearchCandidate,
};
