//! Per-user conversation state for Marquee.
//!
//! A [`Session`] collects a [`marquee_core::ContentRecord`] and its download
//! links over several message turns. Every turn is an [`Event`] fed through a
//! [`TransitionTable`] that maps `(StateTag, EventKind)` to a pure handler.
//! The table is checked at startup by [`TransitionTable::validate`]: a state
//! and event pair nobody declared is a startup error rather than a silent
//! no-op.
//!
//! Handlers never touch the network. When the collection is complete they
//! return [`Step::Synthesize`] and the caller renders the artifacts, then
//! stores them with [`Session::finish`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod event;
mod handlers;
mod machine;
mod session;
mod state;
mod store;
mod table;

pub use event::{Action, Event, EventKind};
pub use machine::{FlowOptions, StateMachine};
pub use session::{Artifacts, Session};
pub use state::{Prompt, StateTag, Step};
pub use store::{InMemorySessionStore, SessionStore};
pub use table::{Handler, Rule, TransitionTable};
