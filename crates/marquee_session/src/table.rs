//! Explicit `(state, event kind) -> rule` table.

use crate::handlers;
use crate::{Event, EventKind, FlowOptions, Session, StateTag, Step};
use marquee_error::{MarqueeResult, SessionError, SessionErrorKind};
use std::collections::HashMap;
use strum::IntoEnumIterator;

/// Pure transition function.
pub type Handler = fn(&mut Session, &Event, &FlowOptions) -> Step;

/// What a declared pair does.
#[derive(Clone, Copy)]
pub enum Rule {
    /// Run the handler
    Handle(Handler),
    /// Declared as a no-op
    Ignore,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Handle(_) => f.write_str("Handle"),
            Self::Ignore => f.write_str("Ignore"),
        }
    }
}

/// Transition table keyed by state and event kind.
///
/// # Examples
///
/// ```
/// use marquee_session::TransitionTable;
///
/// assert!(TransitionTable::standard().validate().is_ok());
/// assert!(TransitionTable::new().validate().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    rules: HashMap<(StateTag, EventKind), Rule>,
    duplicates: Vec<(StateTag, EventKind)>,
}

impl TransitionTable {
    /// Empty table. Fails validation until every pair is declared.
    pub fn new() -> Self {
        Self::default()
    }

    fn declare(mut self, state: StateTag, kind: EventKind, rule: Rule) -> Self {
        if self.rules.insert((state, kind), rule).is_some() {
            self.duplicates.push((state, kind));
        }
        self
    }

    /// Route `kind` events in `state` to `handler`.
    pub fn on(self, state: StateTag, kind: EventKind, handler: Handler) -> Self {
        self.declare(state, kind, Rule::Handle(handler))
    }

    /// Declare `kind` events in `state` as no-ops.
    pub fn ignore(self, state: StateTag, kind: EventKind) -> Self {
        self.declare(state, kind, Rule::Ignore)
    }

    /// Declare several kinds as no-ops in `state`.
    pub fn ignore_all(self, state: StateTag, kinds: &[EventKind]) -> Self {
        kinds
            .iter()
            .fold(self, |table, kind| table.ignore(state, *kind))
    }

    /// The conversation flow.
    pub fn standard() -> Self {
        use EventKind::{Choice, Photo, Publish, Text};
        use StateTag::*;

        Self::new()
            .on(ManualWaitTitle, Text, handlers::manual_title)
            .ignore_all(ManualWaitTitle, &[Photo, Choice, Publish])
            .on(ManualWaitYear, Text, handlers::manual_year)
            .ignore_all(ManualWaitYear, &[Photo, Choice, Publish])
            .on(ManualWaitOverview, Text, handlers::manual_overview)
            .ignore_all(ManualWaitOverview, &[Photo, Choice, Publish])
            .on(ManualWaitGenres, Text, handlers::manual_genres)
            .ignore_all(ManualWaitGenres, &[Photo, Choice, Publish])
            .on(ManualWaitRating, Text, handlers::manual_rating)
            .ignore_all(ManualWaitRating, &[Photo, Choice, Publish])
            .on(ManualWaitPoster, Text, handlers::manual_poster_text)
            .on(ManualWaitPoster, Photo, handlers::manual_poster_photo)
            .ignore_all(ManualWaitPoster, &[Choice, Publish])
            .on(AwaitingLanguage, Text, handlers::language)
            .ignore_all(AwaitingLanguage, &[Photo, Choice, Publish])
            .on(AwaitingQuality, Text, handlers::quality)
            .ignore_all(AwaitingQuality, &[Photo, Choice, Publish])
            .on(AskLinks, Choice, handlers::ask_links_choice)
            .on(AskLinks, Text, handlers::ask_links_text)
            .ignore_all(AskLinks, &[Photo, Publish])
            .on(AwaitingLinkLabel, Text, handlers::link_label)
            .ignore_all(AwaitingLinkLabel, &[Photo, Choice, Publish])
            .on(AwaitingLinkUrl, Text, handlers::link_url)
            .ignore_all(AwaitingLinkUrl, &[Photo, Choice, Publish])
            .on(Done, Text, handlers::done_text)
            .on(Done, Publish, handlers::done_publish)
            .ignore_all(Done, &[Photo, Choice])
    }

    /// Check that every pair is declared exactly once.
    ///
    /// # Errors
    ///
    /// Returns the first duplicate or undeclared pair found.
    pub fn validate(&self) -> MarqueeResult<()> {
        if let Some((state, kind)) = self.duplicates.first() {
            return Err(SessionError::new(SessionErrorKind::DuplicateTransition {
                state: state.to_string(),
                event: kind.to_string(),
            })
            .into());
        }
        for state in StateTag::iter() {
            for kind in EventKind::iter() {
                if !self.rules.contains_key(&(state, kind)) {
                    return Err(SessionError::new(SessionErrorKind::UndeclaredTransition {
                        state: state.to_string(),
                        event: kind.to_string(),
                    })
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Look up the rule for a pair.
    pub fn rule(&self, state: StateTag, kind: EventKind) -> Option<Rule> {
        self.rules.get(&(state, kind)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_covers_every_pair() {
        let table = TransitionTable::standard();
        assert_eq!(
            table.rules.len(),
            StateTag::iter().count() * EventKind::iter().count()
        );
        assert!(table.duplicates.is_empty());
    }

    #[test]
    fn test_duplicate_declaration_is_reported() {
        let table = TransitionTable::standard().ignore(StateTag::Done, EventKind::Photo);
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_missing_declaration_is_reported() {
        let table = TransitionTable::new().on(StateTag::Done, EventKind::Text, handlers::done_text);
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("has no rule"));
    }
}
