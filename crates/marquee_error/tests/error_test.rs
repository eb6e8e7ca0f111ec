//! Tests for error conversion and user-facing messages.

use marquee_error::{
    HttpError, MarqueeError, MarqueeErrorKind, RenderError, RenderErrorKind, SessionError,
    SessionErrorKind, StorageError, StorageErrorKind, TransportError, TransportErrorKind,
};

#[test]
fn test_render_task_failure_converts() {
    let err: MarqueeError = RenderError::new(RenderErrorKind::Task("task cancelled".into())).into();
    match err.kind() {
        MarqueeErrorKind::Render(e) => {
            assert_eq!(e.kind, RenderErrorKind::Task("task cancelled".into()))
        }
        other => panic!("unexpected kind: {}", other),
    }
    assert!(err.to_string().contains("Render task failed: task cancelled"));
}

#[test]
fn test_user_message_hides_internals() {
    let errors: Vec<MarqueeError> = vec![
        HttpError::new("500 from https://api.themoviedb.org/3/search/multi?api_key=secret").into(),
        StorageError::new(StorageErrorKind::FileWrite("/srv/marquee/channels.json.tmp".into()))
            .into(),
        RenderError::new(RenderErrorKind::Task("panicked".into())).into(),
    ];
    for err in &errors {
        assert!(err.to_string().contains(" at line "));
        let message = err.user_message();
        assert!(!message.contains("line"), "{}", message);
        assert!(!message.contains(".rs"), "{}", message);
        assert!(!message.contains("secret"), "{}", message);
        assert!(!message.contains("/srv"), "{}", message);
    }
}

#[test]
fn test_expired_session_message() {
    let err: MarqueeError = SessionError::new(SessionErrorKind::NotFound(7)).into();
    assert_eq!(
        err.user_message(),
        "Your session has expired. Search again to start over."
    );
}

#[test]
fn test_detail_keeps_message_and_drops_location() {
    let err: MarqueeError = TransportError::new(TransportErrorKind::Rejected {
        status: 403,
        description: "Forbidden: bot is not a member of the channel chat".into(),
    })
    .into();
    let detail = err.detail();
    assert!(detail.contains("bot is not a member of the channel chat"));
    assert!(!detail.contains(" at line "), "{}", detail);
}
