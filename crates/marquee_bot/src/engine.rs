//! Conversation engine.
//!
//! Routes inbound events to commands, search, selection and the session state
//! machine, and runs synthesis when a session completes. Events from one user
//! are handled one at a time; different users proceed concurrently.

use crate::{CallbackData, HtmlSettings};
use derive_getters::Getters;
use marquee_core::{MediaKind, MetadataNormalizer, is_http_url, parse_year};
use marquee_error::MarqueeResult;
use marquee_interface::{
    Button, ChatId, ChatTarget, Inbound, InboundPayload, InlineArticle, Messenger,
    MetadataProvider, Outbound, SearchCandidate, UserId,
};
use marquee_publish::{Preferences, PromoConfig, PublicationCoordinator, PublishRequest};
use marquee_session::{
    Action, Artifacts, Event, Prompt, Session, SessionStore, StateMachine, Step,
};
use marquee_synth::{CaptionOptions, HtmlOptions, PosterRenderer, render_caption, render_html};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as TurnLock;
use tracing::{debug, error, info, instrument, warn};

const HELP: &str = "🎬 Send a movie or show title to search (add a year to narrow it down, e.g. \"Dune 2021\").\n\n\
Commands:\n\
/manual – enter details yourself (/manual tv for a show)\n\
/cancel – drop the current post\n\
/setchannel <id or @username> – where posts are forwarded\n\
/setad <url> – ad link used by the HTML download gate\n\
/setpromo <@channel> [text] – promo footer for captions\n\
/settings – show your settings";

const START_OVER: &str = "⌛ That post is no longer active. Please start over by sending a title.";

/// Split a trailing four digit year off a search query.
///
/// # Examples
///
/// ```
/// use marquee_bot::split_query_year;
///
/// assert_eq!(split_query_year("Dune 2021"), ("Dune".to_string(), Some(2021)));
/// assert_eq!(split_query_year("1917"), ("1917".to_string(), None));
/// ```
pub fn split_query_year(text: &str) -> (String, Option<u16>) {
    let text = text.trim();
    if let Some((rest, last)) = text.rsplit_once(char::is_whitespace)
        && let Some(year) = parse_year(last)
        && !rest.trim().is_empty()
    {
        return (rest.trim().to_string(), Some(year));
    }
    (text.to_string(), None)
}

fn kind_icon(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Movie => "🎬",
        MediaKind::Show => "📺",
    }
}

fn cancel_row() -> Vec<Button> {
    vec![Button::callback("❌ Cancel", CallbackData::Cancel.encode())]
}

fn action_keyboard() -> Vec<Vec<Button>> {
    let button = |label: &str, action: Action| {
        Button::callback(label, CallbackData::Publish(action).encode())
    };
    vec![
        vec![button("📝 Caption", Action::Caption), button("🌐 HTML", Action::Html)],
        vec![button("🔗 Paste link", Action::Paste), button("📢 Post to channel", Action::Channel)],
        vec![button("🖼 Poster", Action::Poster)],
    ]
}

/// Handles inbound events for every user.
#[derive(Getters, derive_builder::Builder)]
#[builder(pattern = "owned")]
pub struct Engine {
    /// Outbound transport
    messenger: Arc<dyn Messenger>,
    /// Search and details lookups
    metadata: Arc<dyn MetadataProvider>,
    /// Live sessions
    sessions: Arc<dyn SessionStore>,
    /// Per-user settings
    preferences: Arc<Preferences>,
    /// Poster composition
    poster: PosterRenderer,
    /// Publication actions
    coordinator: Arc<PublicationCoordinator>,
    /// Validated transition table
    machine: StateMachine,
    /// Provider record mapping
    #[builder(default)]
    normalizer: MetadataNormalizer,
    /// Caption switches
    #[builder(default)]
    caption: CaptionOptions,
    /// HTML switches
    #[builder(default)]
    html: HtmlSettings,
    /// Answer inline queries
    #[builder(default = "true")]
    inline_queries: bool,
    #[getter(skip)]
    #[builder(setter(skip))]
    turns: Mutex<HashMap<UserId, Arc<TurnLock<()>>>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("machine", &self.machine)
            .field("inline_queries", &self.inline_queries)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Handle one inbound event.
    ///
    /// Failures are reported to the user before being returned.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while handling the event.
    #[instrument(skip(self, inbound), fields(user_id = %inbound.user, chat = %inbound.chat))]
    pub async fn handle(&self, inbound: Inbound) -> MarqueeResult<()> {
        let Inbound {
            user,
            chat,
            payload,
        } = inbound;

        let result = match payload {
            InboundPayload::InlineQuery { id, query } => self.answer_inline(id, &query).await,
            payload => {
                let turn = self.turn_lock(user);
                let result = {
                    let _turn = turn.lock().await;
                    self.handle_turn(user, chat, payload).await
                };
                self.release_turn(user, &turn);
                result
            }
        };

        if let Err(e) = &result {
            error!(error = %e, "Event handling failed");
            let notice = Outbound::text(
                chat,
                format!("⚠️ Something went wrong. {}", e.user_message()),
            );
            if let Err(report) = self.messenger.deliver(notice).await {
                warn!(error = %report, "Could not report failure to user");
            }
        }
        result
    }

    /// Number of users with a turn lock currently allocated.
    pub fn active_turns(&self) -> usize {
        self.turns.lock().len()
    }

    fn turn_lock(&self, user: UserId) -> Arc<TurnLock<()>> {
        self.turns.lock().entry(user).or_default().clone()
    }

    fn release_turn(&self, user: UserId, turn: &Arc<TurnLock<()>>) {
        let mut turns = self.turns.lock();
        // Clones are only taken under this lock: the map and the caller hold the last two.
        if Arc::strong_count(turn) == 2
            && turns.get(&user).is_some_and(|held| Arc::ptr_eq(held, turn))
        {
            turns.remove(&user);
        }
    }

    async fn handle_turn(
        &self,
        user: UserId,
        chat: ChatId,
        payload: InboundPayload,
    ) -> MarqueeResult<()> {
        match payload {
            InboundPayload::Command { name, args } => {
                self.handle_command(user, chat, &name, &args).await
            }
            InboundPayload::Text(text) => match self.sessions.get(user).await {
                Some(session) => self.advance(user, chat, session, Event::Text(text)).await,
                None => self.search(chat, &text).await,
            },
            InboundPayload::Photo(bytes) => match self.sessions.get(user).await {
                Some(session) => self.advance(user, chat, session, Event::Photo(bytes)).await,
                None => {
                    self.say(
                        chat,
                        "🖼 Send a title to search, or /manual to enter details yourself.",
                    )
                    .await
                }
            },
            InboundPayload::Callback { id, data } => {
                self.handle_callback(user, chat, id, &data).await
            }
            InboundPayload::InlineQuery { .. } => Ok(()),
        }
    }

    async fn say(&self, chat: ChatId, text: impl Into<String>) -> MarqueeResult<()> {
        self.messenger.deliver(Outbound::text(chat, text)).await
    }

    async fn send_prompt(
        &self,
        chat: ChatId,
        intro: Option<String>,
        prompt: Prompt,
    ) -> MarqueeResult<()> {
        let text = match intro {
            Some(intro) => format!("{}\n\n{}", intro, prompt.text()),
            None => prompt.text(),
        };
        let mut rows = Vec::new();
        if prompt.wants_choice() {
            rows.push(vec![
                Button::callback("✅ Yes", CallbackData::Links(true).encode()),
                Button::callback("➡️ No, finish", CallbackData::Links(false).encode()),
            ]);
        }
        rows.push(cancel_row());
        self.messenger
            .deliver(Outbound::text_with_buttons(chat, text, rows))
            .await
    }

    async fn advance(
        &self,
        user: UserId,
        chat: ChatId,
        mut session: Session,
        event: Event,
    ) -> MarqueeResult<()> {
        match self.machine.apply(&mut session, &event) {
            Step::Stay(prompt) => self.send_prompt(chat, None, prompt).await,
            Step::Advance(_, prompt) => {
                self.sessions.put(user, session).await;
                self.send_prompt(chat, None, prompt).await
            }
            Step::Synthesize => self.synthesize(user, chat, session).await,
            Step::Publish(action) => self.publish(user, chat, &session, action).await,
            Step::Restart(query) => {
                self.sessions.delete(user).await;
                debug!("Finished session discarded for a new search");
                self.search(chat, &query).await
            }
            Step::Ignore => {
                debug!(event = %event.kind(), "Event ignored in this state");
                Ok(())
            }
        }
    }

    async fn handle_callback(
        &self,
        user: UserId,
        chat: ChatId,
        callback_id: String,
        data: &str,
    ) -> MarqueeResult<()> {
        let ack = Outbound::AnswerCallback {
            callback_id,
            text: None,
        };
        if let Err(e) = self.messenger.deliver(ack).await {
            warn!(error = %e, "Callback acknowledgement failed");
        }

        match CallbackData::parse(data) {
            Some(CallbackData::Select { kind, id }) => self.select(user, chat, kind, id).await,
            Some(CallbackData::Links(answer)) => {
                self.continue_session(user, chat, Event::Choice(answer)).await
            }
            Some(CallbackData::Publish(action)) => {
                self.continue_session(user, chat, Event::Publish(action)).await
            }
            Some(CallbackData::Cancel) => self.cancel(user, chat).await,
            None => {
                debug!(data = %data, "Unrecognized callback data");
                Ok(())
            }
        }
    }

    async fn continue_session(
        &self,
        user: UserId,
        chat: ChatId,
        event: Event,
    ) -> MarqueeResult<()> {
        match self.sessions.require(user).await {
            Ok(session) => self.advance(user, chat, session, event).await,
            Err(e) => {
                debug!(error = %e, "Callback without a session");
                self.say(chat, START_OVER).await
            }
        }
    }

    #[instrument(skip(self))]
    async fn search(&self, chat: ChatId, text: &str) -> MarqueeResult<()> {
        let (mut query, mut year) = split_query_year(text);
        if query.is_empty() {
            return self.say(chat, HELP).await;
        }

        let mut candidates = self.metadata.search(&query, year).await;
        // The trailing number may belong to the title, as in "Blade Runner 2049".
        if candidates.is_empty() && year.is_some() {
            let whole = text.trim();
            candidates = self.metadata.search(whole, None).await;
            if !candidates.is_empty() {
                debug!(query = %whole, "Matched with the year as part of the title");
                query = whole.to_string();
                year = None;
            }
        }
        info!(query = %query, year = ?year, results = candidates.len(), "Search");
        if candidates.is_empty() {
            return self
                .say(
                    chat,
                    format!(
                        "😕 No results for \"{}\". Check the spelling or use /manual.",
                        query
                    ),
                )
                .await;
        }

        let rows = candidates
            .iter()
            .map(|candidate| {
                vec![Button::callback(
                    format!("{} {}", kind_icon(*candidate.kind()), candidate.label()),
                    CallbackData::Select {
                        kind: *candidate.kind(),
                        id: *candidate.id(),
                    }
                    .encode(),
                )]
            })
            .collect();
        let heading = match year {
            Some(year) => format!("🔎 Results for \"{}\" ({}):", query, year),
            None => format!("🔎 Results for \"{}\":", query),
        };
        self.messenger
            .deliver(Outbound::text_with_buttons(chat, heading, rows))
            .await
    }

    #[instrument(skip(self))]
    async fn select(
        &self,
        user: UserId,
        chat: ChatId,
        kind: MediaKind,
        id: u64,
    ) -> MarqueeResult<()> {
        let Some(raw) = self.metadata.details(kind, id).await else {
            return self
                .say(
                    chat,
                    "😕 Could not load details for that title. Try another result or /manual.",
                )
                .await;
        };

        let record = self.normalizer.normalize(&raw, kind);
        let intro = format!(
            "{} Selected: {} ({})",
            kind_icon(kind),
            record.title,
            record.year_label()
        );
        info!(title = %record.title, "Session started from selection");
        self.sessions.put(user, Session::from_selection(record)).await;
        self.send_prompt(chat, Some(intro), Prompt::AskLanguage).await
    }

    async fn cancel(&self, user: UserId, chat: ChatId) -> MarqueeResult<()> {
        if self.sessions.delete(user).await {
            info!("Session cancelled");
            self.say(chat, "❌ Cancelled. Send a title to start again.").await
        } else {
            self.say(chat, "Nothing to cancel.").await
        }
    }

    fn html_options(&self, user: UserId) -> HtmlOptions {
        let ad_link = self.preferences.ad_links().get(user);
        if !*self.html.gate_enabled() && ad_link.is_none() {
            return HtmlOptions::plain();
        }
        let gate = self.html.gate().clone();
        let gate = match ad_link {
            Some(ad_link) => gate.with_ad_url(ad_link),
            None => gate,
        };
        HtmlOptions::gated(gate)
    }

    #[instrument(
        skip(self, session),
        fields(title = %session.record().title, links = session.links().len())
    )]
    async fn synthesize(
        &self,
        user: UserId,
        chat: ChatId,
        mut session: Session,
    ) -> MarqueeResult<()> {
        let record = session.record().clone();
        let links = session.links().clone();

        let footer = self
            .preferences
            .promos()
            .get(user)
            .map(|promo| promo.footer());
        let caption = render_caption(&record, &links, &self.caption.clone().with_footer(footer));
        let html = render_html(&record, &links, &self.html_options(user))?;
        let poster = self.poster.render(&record).await;
        info!(poster = poster.is_some(), "Artifacts generated");

        session.finish(Artifacts::new(caption.clone(), html, poster.clone()));
        self.sessions.put(user, session).await;

        if let Some(bytes) = poster {
            self.messenger
                .deliver(Outbound::Photo {
                    chat: chat.into(),
                    bytes,
                    caption: Some(format!("✅ {} ({})", record.title, record.year_label())),
                    buttons: Vec::new(),
                })
                .await?;
        } else {
            self.say(chat, "🖼 No poster could be generated for this title.")
                .await?;
        }
        self.messenger
            .deliver(Outbound::text_with_buttons(chat, caption, action_keyboard()))
            .await
    }

    async fn publish(
        &self,
        user: UserId,
        chat: ChatId,
        session: &Session,
        action: Action,
    ) -> MarqueeResult<()> {
        let Some(artifacts) = session.generated() else {
            return self.say(chat, START_OVER).await;
        };
        let channel = self.preferences.channels().get(user);
        self.coordinator
            .publish(
                action,
                PublishRequest {
                    chat,
                    record: session.record(),
                    artifacts,
                    channel: channel.as_ref(),
                },
            )
            .await
    }

    async fn save_report<T>(
        &self,
        chat: ChatId,
        saved: MarqueeResult<T>,
        done: String,
    ) -> MarqueeResult<()> {
        match saved {
            Ok(_) => self.say(chat, done).await,
            Err(e) => {
                error!(error = %e, "Preference write failed");
                self.say(chat, format!("❌ Could not save setting. {}", e.user_message())).await
            }
        }
    }

    #[instrument(skip(self, args))]
    async fn handle_command(
        &self,
        user: UserId,
        chat: ChatId,
        name: &str,
        args: &str,
    ) -> MarqueeResult<()> {
        let args = args.trim();
        let off = matches!(args.to_ascii_lowercase().as_str(), "off" | "none" | "clear");
        let prefs = &self.preferences;

        match name {
            "start" | "help" => self.say(chat, HELP).await,
            "manual" => {
                let kind = match args.to_ascii_lowercase().as_str() {
                    "tv" | "show" | "series" => MediaKind::Show,
                    _ => MediaKind::Movie,
                };
                self.sessions.put(user, Session::manual(kind)).await;
                info!(kind = %kind, "Manual session started");
                self.send_prompt(chat, Some("📝 Manual entry.".to_string()), Prompt::AskTitle)
                    .await
            }
            "cancel" => self.cancel(user, chat).await,
            "setchannel" if off => {
                let removed = prefs.channels().remove(user).await;
                self.save_report(chat, removed, "✅ Channel cleared.".to_string()).await
            }
            "setchannel" => match ChatTarget::parse(args) {
                Some(target) => {
                    let done = format!("✅ Posts will be forwarded to {}.", target);
                    let saved = prefs.channels().set(user, target).await;
                    self.save_report(chat, saved, done).await
                }
                None => {
                    self.say(chat, "Usage: /setchannel <numeric id like -100123 or @username>")
                        .await
                }
            },
            "setad" if off => {
                let removed = prefs.ad_links().remove(user).await;
                self.save_report(chat, removed, "✅ Ad link cleared.".to_string()).await
            }
            "setad" if is_http_url(args) => {
                let saved = prefs.ad_links().set(user, args.to_string()).await;
                self.save_report(chat, saved, format!("✅ Ad link set to {}.", args)).await
            }
            "setad" => self.say(chat, "Usage: /setad <http(s) URL>").await,
            "setpromo" if off => {
                let removed = prefs.promos().remove(user).await;
                self.save_report(chat, removed, "✅ Promo cleared.".to_string()).await
            }
            "setpromo" => {
                let (channel, text) = match args.split_once(char::is_whitespace) {
                    Some((channel, text)) => (channel, Some(text.to_string())),
                    None => (args, None),
                };
                if ChatTarget::parse(channel).is_none() || channel.is_empty() {
                    return self.say(chat, "Usage: /setpromo <@channel> [text]").await;
                }
                let promo = PromoConfig::new(channel, text);
                let done = format!("✅ Captions will end with:\n{}", promo.footer());
                let saved = prefs.promos().set(user, promo).await;
                self.save_report(chat, saved, done).await
            }
            "settings" => {
                let channel = prefs
                    .channels()
                    .get(user)
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "not set".to_string());
                let ad = prefs
                    .ad_links()
                    .get(user)
                    .unwrap_or_else(|| "default".to_string());
                let promo = prefs
                    .promos()
                    .get(user)
                    .map(|p| p.channel().clone())
                    .unwrap_or_else(|| "not set".to_string());
                self.say(
                    chat,
                    format!(
                        "⚙️ Settings\nChannel: {}\nAd link: {}\nPromo: {}",
                        channel, ad, promo
                    ),
                )
                .await
            }
            other => {
                debug!(command = %other, "Unknown command");
                self.say(chat, format!("Unknown command /{}.\n\n{}", other, HELP))
                    .await
            }
        }
    }

    #[instrument(skip(self))]
    async fn answer_inline(&self, query_id: String, query: &str) -> MarqueeResult<()> {
        if !self.inline_queries {
            return Ok(());
        }
        let (query, year) = split_query_year(query);
        let candidates = if query.is_empty() {
            Vec::new()
        } else {
            self.metadata.search(&query, year).await
        };
        let results = candidates.iter().map(inline_article).collect();
        self.messenger
            .deliver(Outbound::AnswerInline { query_id, results })
            .await
    }
}

fn inline_article(candidate: &SearchCandidate) -> InlineArticle {
    let label = candidate.label();
    InlineArticle {
        id: format!("{}-{}", candidate.kind(), candidate.id()),
        title: label.clone(),
        description: match candidate.kind() {
            MediaKind::Movie => "Movie".to_string(),
            MediaKind::Show => "TV show".to_string(),
        },
        message_text: format!("{} {}", kind_icon(*candidate.kind()), label),
        thumbnail_url: candidate.poster_url().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_query_year() {
        assert_eq!(split_query_year("  The Batman 2022 "), ("The Batman".to_string(), Some(2022)));
        assert_eq!(split_query_year("Heat\t1995"), ("Heat".to_string(), Some(1995)));
        assert_eq!(split_query_year("Alien 79"), ("Alien 79".to_string(), None));
        assert_eq!(split_query_year(""), (String::new(), None));
    }

    #[test]
    fn test_action_keyboard_has_every_action() {
        let data: Vec<String> = action_keyboard()
            .into_iter()
            .flatten()
            .filter_map(|button| match button.action {
                marquee_interface::ButtonAction::Callback(data) => Some(data),
                marquee_interface::ButtonAction::Url(_) => None,
            })
            .collect();
        assert_eq!(data.len(), 5);
        assert!(data.contains(&"pub:paste".to_string()));
    }
}
