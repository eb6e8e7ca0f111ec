//! Tests for the conversation engine, driven through inbound events.

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use marquee_bot::{Dispatcher, Engine, EngineBuilder};
use marquee_core::MediaKind;
use marquee_error::{HttpError, MarqueeResult};
use marquee_interface::{
    ButtonAction, ChatId, ChatTarget, ImageFetcher, Inbound, InboundPayload, Messenger,
    MetadataProvider, Outbound, PasteOutcome, PasteService, SearchCandidate, UserId,
};
use marquee_publish::{Preferences, PublicationCoordinator, PublishOptions};
use marquee_session::{FlowOptions, InMemorySessionStore, StateMachine, StateTag};
use marquee_synth::{NO_LINKS_CLASS, PosterRenderer};
use parking_lot::Mutex;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

const DUNE_ID: u64 = 438631;
const HEAT_ID: u64 = 949;
const BLADE_RUNNER_2049_ID: u64 = 335984;
const DUNE_POSTER: &str = "https://image.tmdb.org/t/p/w500/dune.jpg";

/// Records every intent in delivery order.
#[derive(Default)]
struct RecordingMessenger {
    sent: Mutex<Vec<Outbound>>,
}

impl RecordingMessenger {
    fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().clone()
    }

    fn clear(&self) {
        self.sent.lock().clear();
    }

    fn texts(&self) -> Vec<String> {
        self.sent()
            .iter()
            .filter_map(|intent| intent.as_text().map(str::to_string))
            .collect()
    }

    fn callback_data(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|intent| match intent {
                Outbound::Text { buttons, .. } => Some(buttons),
                _ => None,
            })
            .flatten()
            .flatten()
            .filter_map(|button| match button.action {
                ButtonAction::Callback(data) => Some(data),
                ButtonAction::Url(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn deliver(&self, intent: Outbound) -> MarqueeResult<()> {
        self.sent.lock().push(intent);
        Ok(())
    }
}

/// A few known titles; everything else is unknown. Years are ignored except
/// that a year-filtered search for "Blade Runner" finds nothing.
struct MockMetadata;

#[async_trait]
impl MetadataProvider for MockMetadata {
    async fn search(&self, query: &str, year: Option<u16>) -> Vec<SearchCandidate> {
        match query.to_ascii_lowercase().as_str() {
            "blade runner 2049" if year.is_none() => vec![SearchCandidate::new(
                MediaKind::Movie,
                BLADE_RUNNER_2049_ID,
                "Blade Runner 2049",
                Some(2017),
                None,
            )],
            "dune" => vec![
                SearchCandidate::new(MediaKind::Movie, DUNE_ID, "Dune", Some(2021), None),
                SearchCandidate::new(MediaKind::Movie, 841, "Dune", Some(1984), None),
            ],
            "heat" => vec![SearchCandidate::new(
                MediaKind::Movie,
                HEAT_ID,
                "Heat",
                Some(1995),
                None,
            )],
            _ => Vec::new(),
        }
    }

    async fn details(&self, _kind: MediaKind, id: u64) -> Option<serde_json::Value> {
        match id {
            DUNE_ID => Some(json!({
                "title": "Dune",
                "release_date": "2021-09-15",
                "vote_average": 7.8,
                "genres": [{"name": "Science Fiction"}, {"name": "Adventure"}],
                "overview": "Paul Atreides travels to the most dangerous planet in the universe.",
                "poster_path": "/dune.jpg",
                "credits": {
                    "cast": [{"name": "Timothée Chalamet"}, {"name": "Zendaya"}],
                    "crew": [{"job": "Director", "name": "Denis Villeneuve"}]
                },
                "similar": {"results": [{"title": "Arrival"}]}
            })),
            HEAT_ID => Some(json!({"title": "Heat", "release_date": "1995-12-15"})),
            _ => None,
        }
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([90, 60, 30, 255])))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

struct StubFetcher;

#[async_trait]
impl ImageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> MarqueeResult<Vec<u8>> {
        if url == DUNE_POSTER {
            Ok(png(100, 150))
        } else {
            Err(HttpError::new(format!("404 {}", url)).into())
        }
    }
}

struct StubPaste;

#[async_trait]
impl PasteService for StubPaste {
    async fn publish(&self, _html: &str) -> PasteOutcome {
        PasteOutcome::Published("https://paste.example/abc".to_string())
    }
}

struct Harness {
    engine: Arc<Engine>,
    messenger: Arc<RecordingMessenger>,
    dir: TempDir,
}

fn harness(ask_quality: bool) -> Harness {
    let dir = TempDir::new().unwrap();
    let messenger = Arc::new(RecordingMessenger::default());
    let coordinator = PublicationCoordinator::new(
        messenger.clone(),
        Arc::new(StubPaste),
        PublishOptions::default(),
    );
    let engine = EngineBuilder::default()
        .messenger(messenger.clone())
        .metadata(Arc::new(MockMetadata))
        .sessions(Arc::new(InMemorySessionStore::new()))
        .preferences(Arc::new(Preferences::open(dir.path()).unwrap()))
        .poster(PosterRenderer::new(Arc::new(StubFetcher), None))
        .coordinator(Arc::new(coordinator))
        .machine(StateMachine::standard(FlowOptions::new(ask_quality)).unwrap())
        .build()
        .unwrap();
    Harness {
        engine: Arc::new(engine),
        messenger,
        dir,
    }
}

fn inbound(user: u64, payload: InboundPayload) -> Inbound {
    Inbound {
        user: UserId(user),
        chat: ChatId(user as i64),
        payload,
    }
}

fn text(user: u64, body: &str) -> Inbound {
    inbound(user, InboundPayload::Text(body.to_string()))
}

fn callback(user: u64, data: &str) -> Inbound {
    inbound(
        user,
        InboundPayload::Callback {
            id: format!("cb-{}", user),
            data: data.to_string(),
        },
    )
}

fn command(user: u64, name: &str, args: &str) -> Inbound {
    inbound(
        user,
        InboundPayload::Command {
            name: name.to_string(),
            args: args.to_string(),
        },
    )
}

impl Harness {
    async fn send(&self, event: Inbound) {
        self.engine.handle(event).await.unwrap();
    }

    async fn state(&self, user: u64) -> Option<StateTag> {
        self.engine
            .sessions()
            .get(UserId(user))
            .await
            .map(|session| *session.state())
    }

    /// Search, select Dune, answer the language and decline links.
    async fn finish_dune(&self, user: u64, language: &str) {
        self.send(text(user, "Dune 2021")).await;
        self.send(callback(user, &format!("sel:movie:{}", DUNE_ID))).await;
        self.send(text(user, language)).await;
        self.send(callback(user, "links:no")).await;
    }
}

#[tokio::test]
async fn test_selection_to_artifacts_end_to_end() {
    let h = harness(false);

    h.send(text(1, "Dune 2021")).await;
    let data = h.messenger.callback_data();
    assert!(data.contains(&format!("sel:movie:{}", DUNE_ID)));
    assert!(data.contains(&"sel:movie:841".to_string()));
    assert_eq!(h.state(1).await, None);

    h.send(callback(1, &format!("sel:movie:{}", DUNE_ID))).await;
    assert_eq!(h.state(1).await, Some(StateTag::AwaitingLanguage));
    let texts = h.messenger.texts();
    assert!(texts.last().unwrap().contains("Selected: Dune (2021)"));

    h.send(text(1, "Hindi Dubbed")).await;
    assert_eq!(h.state(1).await, Some(StateTag::AskLinks));
    assert!(h.messenger.callback_data().contains(&"links:no".to_string()));

    h.messenger.clear();
    h.send(callback(1, "links:no")).await;
    assert_eq!(h.state(1).await, Some(StateTag::Done));

    let session = h.engine.sessions().get(UserId(1)).await.unwrap();
    let artifacts = session.generated().clone().unwrap();
    assert!(artifacts.caption().contains("Language: Hindi Dubbed"));
    assert!(artifacts.caption().contains("Director: Denis Villeneuve"));
    assert!(artifacts.html().contains(NO_LINKS_CLASS));
    let poster = artifacts.poster().clone().unwrap();
    assert!(poster.starts_with(&[0x89, b'P', b'N', b'G']));

    let sent = h.messenger.sent();
    assert!(matches!(&sent[1], Outbound::Photo { bytes, .. } if *bytes == poster));
    match &sent[2] {
        Outbound::Text { text, buttons, .. } => {
            assert_eq!(text, artifacts.caption());
            assert_eq!(buttons.iter().flatten().count(), 5);
        }
        other => panic!("expected caption text, got {:?}", other),
    }
}

#[tokio::test]
async fn test_language_line_absent_without_language() {
    let h = harness(false);
    h.send(command(1, "manual", "")).await;
    for answer in ["Arrival", "2016", "skip", "Drama", "N/A", "skip"] {
        h.send(text(1, answer)).await;
    }
    assert_eq!(h.state(1).await, Some(StateTag::AwaitingLanguage));

    // Blank language re-prompts instead of being stored.
    h.send(text(1, "   ")).await;
    assert_eq!(h.state(1).await, Some(StateTag::AwaitingLanguage));

    h.send(text(1, "English")).await;
    h.send(text(1, "no")).await;
    let session = h.engine.sessions().get(UserId(1)).await.unwrap();
    let artifacts = session.generated().clone().unwrap();
    assert!(artifacts.caption().contains("Language: English"));
    assert!(artifacts.caption().contains("Rating: N/A"));
    assert!(artifacts.poster().is_none());
    assert!(h.messenger.texts().iter().any(|t| t.contains("No poster")));
}

#[tokio::test]
async fn test_manual_year_needs_four_digits() {
    let h = harness(true);
    h.send(command(3, "manual", "")).await;
    assert_eq!(h.state(3).await, Some(StateTag::ManualWaitTitle));

    h.send(text(3, "Past Lives")).await;
    assert_eq!(h.state(3).await, Some(StateTag::ManualWaitYear));

    h.send(text(3, "23")).await;
    assert_eq!(h.state(3).await, Some(StateTag::ManualWaitYear));
    assert!(h.messenger.texts().last().unwrap().contains("exactly 4 digits"));

    h.send(text(3, "2023")).await;
    assert_eq!(h.state(3).await, Some(StateTag::ManualWaitOverview));
    let session = h.engine.sessions().get(UserId(3)).await.unwrap();
    assert_eq!(session.record().year, Some(2023));
}

#[tokio::test]
async fn test_manual_tv_session_is_a_show() {
    let h = harness(true);
    h.send(command(3, "manual", "tv")).await;
    let session = h.engine.sessions().get(UserId(3)).await.unwrap();
    assert_eq!(session.record().kind, MediaKind::Show);
}

#[tokio::test]
async fn test_callback_without_session_asks_to_start_over() {
    let h = harness(true);
    h.send(callback(4, "pub:caption")).await;
    h.send(callback(4, "links:yes")).await;

    let sent = h.messenger.sent();
    let acks = sent
        .iter()
        .filter(|intent| matches!(intent, Outbound::AnswerCallback { .. }))
        .count();
    assert_eq!(acks, 2);
    let texts = h.messenger.texts();
    assert_eq!(texts.len(), 2);
    assert!(texts.iter().all(|t| t.contains("start over")));
    assert_eq!(h.state(4).await, None);
}

#[tokio::test]
async fn test_unknown_selection_keeps_user_out_of_a_session() {
    let h = harness(true);
    h.send(callback(4, "sel:movie:1")).await;
    assert_eq!(h.state(4).await, None);
    assert!(h.messenger.texts().last().unwrap().contains("Could not load details"));
}

#[tokio::test]
async fn test_concurrent_urls_from_one_user_add_one_link() {
    let h = harness(false);
    h.send(text(5, "Dune")).await;
    h.send(callback(5, &format!("sel:movie:{}", DUNE_ID))).await;
    h.send(text(5, "Hindi")).await;
    h.send(callback(5, "links:yes")).await;
    h.send(text(5, "1080p")).await;
    assert_eq!(h.state(5).await, Some(StateTag::AwaitingLinkUrl));

    let (first, second) = tokio::join!(
        h.engine.handle(text(5, "https://a.example/one")),
        h.engine.handle(text(5, "https://b.example/two")),
    );
    first.unwrap();
    second.unwrap();

    let session = h.engine.sessions().get(UserId(5)).await.unwrap();
    assert_eq!(session.links().len(), 1);
    assert_eq!(*session.state(), StateTag::AskLinks);
    assert_eq!(h.engine.active_turns(), 0);
}

#[tokio::test]
async fn test_users_progress_independently() {
    let h = harness(false);
    let (a, b) = (h.finish_dune(6, "Hindi Dubbed"), h.finish_dune(7, "Tamil"));
    tokio::join!(a, b);

    for (user, language) in [(6, "Hindi Dubbed"), (7, "Tamil")] {
        let session = h.engine.sessions().get(UserId(user)).await.unwrap();
        assert_eq!(*session.state(), StateTag::Done);
        let caption = session.generated().clone().unwrap().caption().clone();
        assert!(caption.contains(&format!("Language: {}", language)));
    }
}

#[tokio::test]
async fn test_publish_repeats_while_done() {
    let h = harness(false);
    h.finish_dune(8, "Hindi").await;
    h.messenger.clear();

    h.send(callback(8, "pub:caption")).await;
    h.send(callback(8, "pub:caption")).await;
    h.send(callback(8, "pub:paste")).await;

    let texts = h.messenger.texts();
    let captions = texts.iter().filter(|t| t.starts_with("🎬 Dune (2021)")).count();
    assert_eq!(captions, 2);
    assert!(texts.iter().any(|t| t.contains("https://paste.example/abc")));
    assert_eq!(h.state(8).await, Some(StateTag::Done));
}

#[tokio::test]
async fn test_channel_post_uses_saved_channel() {
    let h = harness(false);
    h.send(command(9, "setchannel", "@movie_drops")).await;
    h.finish_dune(9, "Hindi").await;
    h.messenger.clear();

    h.send(callback(9, "pub:channel")).await;
    let sent = h.messenger.sent();
    assert!(sent.iter().any(|intent| matches!(
        intent,
        Outbound::Photo { chat: ChatTarget::Username(name), .. } if name == "@movie_drops"
    )));
    assert!(h.messenger.texts().iter().any(|t| t == "✅ Posted to @movie_drops"));
}

#[tokio::test]
async fn test_text_after_done_starts_new_search() {
    let h = harness(false);
    h.finish_dune(10, "Hindi").await;
    h.messenger.clear();

    h.send(text(10, "Heat")).await;
    assert_eq!(h.state(10).await, None);
    assert!(h.messenger.callback_data().contains(&format!("sel:movie:{}", HEAT_ID)));
}

#[tokio::test]
async fn test_cancel_drops_session() {
    let h = harness(true);
    h.send(command(11, "manual", "")).await;
    h.send(callback(11, "cancel")).await;
    assert_eq!(h.state(11).await, None);
    assert!(h.messenger.texts().last().unwrap().starts_with("❌ Cancelled"));

    h.send(command(11, "cancel", "")).await;
    assert_eq!(h.messenger.texts().last().unwrap(), "Nothing to cancel.");
}

#[tokio::test]
async fn test_search_without_results() {
    let h = harness(true);
    h.send(text(12, "Nonexistent Film")).await;
    assert!(h.messenger.texts()[0].contains("No results"));
    assert!(h.messenger.callback_data().is_empty());
}

#[tokio::test]
async fn test_preference_commands() {
    let h = harness(true);

    h.send(command(13, "setchannel", "-100123")).await;
    assert_eq!(
        h.engine.preferences().channels().get(UserId(13)),
        Some(ChatTarget::Id(-100123))
    );
    h.send(command(13, "setchannel", "not a channel")).await;
    assert!(h.messenger.texts().last().unwrap().starts_with("Usage: /setchannel"));

    h.send(command(13, "setad", "ftp://ads.example")).await;
    assert!(h.messenger.texts().last().unwrap().starts_with("Usage: /setad"));
    h.send(command(13, "setad", "https://ads.example/go")).await;
    assert_eq!(
        h.engine.preferences().ad_links().get(UserId(13)).as_deref(),
        Some("https://ads.example/go")
    );

    h.send(command(13, "setpromo", "@cinema Join for daily drops")).await;
    assert!(h.messenger.texts().last().unwrap().contains("👉 @cinema"));

    h.send(command(13, "settings", "")).await;
    let settings = h.messenger.texts().last().unwrap().clone();
    assert!(settings.contains("Channel: -100123"));
    assert!(settings.contains("Promo: @cinema"));

    h.send(command(13, "setchannel", "off")).await;
    assert_eq!(h.engine.preferences().channels().get(UserId(13)), None);

    h.send(command(13, "frobnicate", "")).await;
    assert!(h.messenger.texts().last().unwrap().starts_with("Unknown command /frobnicate."));
}

#[tokio::test]
async fn test_promo_footer_and_ad_gate_apply_to_artifacts() {
    let h = harness(false);
    h.send(command(14, "setpromo", "@cinema")).await;
    h.send(command(14, "setad", "https://ads.example/go")).await;
    h.finish_dune(14, "Hindi").await;

    let session = h.engine.sessions().get(UserId(14)).await.unwrap();
    let artifacts = session.generated().clone().unwrap();
    assert!(artifacts.caption().ends_with("📢 Join @cinema"));
    assert!(artifacts.html().contains("var COUNTDOWN"));
}

#[tokio::test]
async fn test_inline_query_lists_candidates() {
    let h = harness(true);
    h.send(inbound(
        15,
        InboundPayload::InlineQuery {
            id: "iq".to_string(),
            query: "dune".to_string(),
        },
    ))
    .await;

    match &h.messenger.sent()[0] {
        Outbound::AnswerInline { query_id, results } => {
            assert_eq!(query_id, "iq");
            assert_eq!(results.len(), 2);
            assert_eq!(results[0].title, "Dune (2021)");
            assert_eq!(results[0].id, format!("movie-{}", DUNE_ID));
        }
        other => panic!("expected inline answer, got {:?}", other),
    }
    assert_eq!(h.state(15).await, None);
}

#[tokio::test]
async fn test_photo_without_session_gets_hint() {
    let h = harness(true);
    h.send(inbound(16, InboundPayload::Photo(png(10, 10)))).await;
    assert!(h.messenger.texts()[0].contains("/manual"));
}

#[tokio::test]
async fn test_dispatcher_starts_one_worker_per_user() {
    let h = harness(true);
    let dispatcher = Dispatcher::new(h.engine.clone());

    let handles: Vec<_> = [command(17, "help", ""), command(18, "manual", "")]
        .into_iter()
        .filter_map(|event| dispatcher.dispatch(event))
        .collect();
    assert_eq!(handles.len(), 2);
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(h.state(17).await, None);
    assert_eq!(h.state(18).await, Some(StateTag::ManualWaitTitle));
    assert_eq!(h.messenger.texts().len(), 2);
    assert_eq!(dispatcher.active_users(), 0);
    assert_eq!(h.engine.active_turns(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_dispatcher_keeps_each_users_events_in_order() {
    let h = harness(true);
    let dispatcher = Dispatcher::new(h.engine.clone());
    let (tx, rx) = mpsc::channel(16);
    let running = tokio::spawn(dispatcher.clone().run(rx));

    let users: Vec<u64> = (100..300).collect();
    for &user in &users {
        tx.send(command(user, "manual", "")).await.unwrap();
    }
    for &user in &users {
        tx.send(text(user, "Arrival")).await.unwrap();
        tx.send(text(user, "2016")).await.unwrap();
    }
    drop(tx);
    running.await.unwrap();

    for &user in &users {
        let session = h.engine.sessions().get(UserId(user)).await.unwrap();
        assert_eq!(*session.state(), StateTag::ManualWaitOverview, "user {}", user);
        assert_eq!(session.record().title, "Arrival");
        assert_eq!(session.record().year, Some(2016));
    }
    assert_eq!(dispatcher.active_users(), 0);
    assert_eq!(h.engine.active_turns(), 0);
}

#[tokio::test]
async fn test_trailing_number_that_belongs_to_the_title() {
    let h = harness(true);
    h.send(text(19, "Blade Runner 2049")).await;

    let texts = h.messenger.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Results for \"Blade Runner 2049\""), "{}", texts[0]);
    assert_eq!(
        h.messenger.callback_data(),
        vec![format!("sel:movie:{}", BLADE_RUNNER_2049_ID)]
    );
}

#[tokio::test]
async fn test_year_still_narrows_when_it_matches() {
    let h = harness(true);
    h.send(text(20, "Heat 1995")).await;
    assert!(h.messenger.texts()[0].contains("Results for \"Heat\" (1995)"));
}

#[tokio::test]
async fn test_turn_locks_are_released_after_each_event() {
    let h = harness(true);
    for user in 21..31 {
        h.send(command(user, "manual", "")).await;
        h.send(text(user, "Arrival")).await;
    }
    assert_eq!(h.engine.active_turns(), 0);

    let mut events = JoinSet::new();
    for user in 21..31 {
        let engine = h.engine.clone();
        events.spawn(async move { engine.handle(text(user, "2016")).await });
    }
    while let Some(result) = events.join_next().await {
        result.unwrap().unwrap();
    }
    assert_eq!(h.engine.active_turns(), 0);
    assert_eq!(h.state(21).await, Some(StateTag::ManualWaitOverview));
}

#[tokio::test]
async fn test_failed_setting_hides_internal_detail() {
    let h = harness(true);
    std::fs::create_dir(h.dir.path().join("channels.json.tmp")).unwrap();

    h.send(command(32, "setchannel", "@drops")).await;

    let reply = h.messenger.texts().last().unwrap().clone();
    assert!(reply.starts_with("❌ Could not save setting."), "{}", reply);
    assert!(!reply.contains(" at line "), "{}", reply);
    assert!(!reply.contains("channels.json"), "{}", reply);
    assert_eq!(h.engine.preferences().channels().get(UserId(32)), None);
}
