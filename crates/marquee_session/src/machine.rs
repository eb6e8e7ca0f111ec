//! The conversation state machine.

use crate::{Event, Rule, Session, Step, TransitionTable};
use derive_getters::Getters;
use marquee_error::MarqueeResult;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Flow switches.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Deserialize)]
pub struct FlowOptions {
    /// Ask for release quality after language
    #[serde(default = "default_true")]
    ask_quality: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self { ask_quality: true }
    }
}

impl FlowOptions {
    /// Options with the quality step on or off.
    pub fn new(ask_quality: bool) -> Self {
        Self { ask_quality }
    }
}

/// A validated transition table plus flow options.
#[derive(Debug, Clone)]
pub struct StateMachine {
    table: TransitionTable,
    options: FlowOptions,
}

impl StateMachine {
    /// Build a machine, refusing a table with undeclared pairs.
    ///
    /// # Errors
    ///
    /// Returns a session error if the table fails validation.
    pub fn new(table: TransitionTable, options: FlowOptions) -> MarqueeResult<Self> {
        table.validate()?;
        Ok(Self { table, options })
    }

    /// The standard flow.
    ///
    /// # Errors
    ///
    /// Returns a session error if the standard table fails validation.
    pub fn standard(options: FlowOptions) -> MarqueeResult<Self> {
        Self::new(TransitionTable::standard(), options)
    }

    /// Flow options in effect.
    pub fn options(&self) -> &FlowOptions {
        &self.options
    }

    /// Apply one event. `Advance` moves the session to the new state.
    #[instrument(
        skip(self, session, event),
        fields(state = %session.state(), event = %event.kind())
    )]
    pub fn apply(&self, session: &mut Session, event: &Event) -> Step {
        let step = match self.table.rule(*session.state(), event.kind()) {
            Some(Rule::Handle(handler)) => handler(session, event, &self.options),
            Some(Rule::Ignore) | None => Step::Ignore,
        };
        if let Step::Advance(next, _) = &step {
            debug!(next = %next, "Transition");
            session.set_state(*next);
        } else {
            debug!(step = ?step, "No state change");
        }
        step
    }
}
