use std::sync::Arc;

use playback_telemetry::{
    AccountIdentity, AnalyticsToken, ContentItem, LocalPlayer, PlaybackContext, PlayerEvent,
    PlayerEventKind, PlayerHandle, ReadyReport, RecordingSink, SinkCall, TelemetryBridge,
    TelemetryConfig, ViewerId,
};

const ORIGIN: &str = "watch.example.org";

fn setup() -> (TelemetryBridge, Arc<RecordingSink>) {
    playback_telemetry::init_logging();
    let sink = Arc::new(RecordingSink::new());
    let config = TelemetryConfig {
        collector_origin: ORIGIN.into(),
        ..TelemetryConfig::default()
    };
    (TelemetryBridge::new(Some(sink.clone()), &config), sink)
}

fn movie_context(media_id: &str, title: &str) -> PlaybackContext {
    PlaybackContext {
        item: Some(ContentItem::new(media_id, title)),
        token: AnalyticsToken::new("tok"),
        viewer_id: Some(ViewerId(42)),
        feed_id: "shelf1".into(),
    }
}

fn ready(media_id: &str, title: &str, viewer_id: Option<ViewerId>) -> SinkCall {
    SinkCall::Ready(ReadyReport {
        token: "tok".into(),
        origin: ORIGIN.into(),
        feed_id: "shelf1".into(),
        media_id: media_id.into(),
        title: title.into(),
        viewer_id,
    })
}

fn handle(player: &Arc<LocalPlayer>) -> Option<Arc<dyn PlayerHandle>> {
    let player: Arc<dyn PlayerHandle> = player.clone();
    Some(player)
}

#[test]
fn end_to_end_item_change() {
    let (bridge, sink) = setup();
    let player = Arc::new(LocalPlayer::new());

    bridge.set_context(movie_context("m1", "Movie"));
    bridge.bind(handle(&player));
    player.emit(&PlayerEvent::ItemReady { index: 0 });

    assert_eq!(sink.take(), vec![ready("m1", "Movie", Some(ViewerId(42)))]);

    bridge.set_context(movie_context("m2", "Sequel"));
    player.emit(&PlayerEvent::ItemReady { index: 1 });

    assert_eq!(
        sink.take(),
        vec![SinkCall::Remove, ready("m2", "Sequel", Some(ViewerId(42)))]
    );
    assert_eq!(player.listener_count(), PlayerEventKind::ALL.len());
}

#[test]
fn binding_requires_player_item_and_token() {
    let full = movie_context("m1", "Movie");
    let cases = [
        (false, Some(full.clone())),
        (true, Some(PlaybackContext { item: None, ..full.clone() })),
        (true, Some(PlaybackContext { token: None, ..full.clone() })),
        (false, Some(PlaybackContext { item: None, token: None, ..full.clone() })),
        (true, None),
    ];

    for (with_player, context) in cases {
        let (bridge, sink) = setup();
        let player = Arc::new(LocalPlayer::new());

        if let Some(context) = context {
            bridge.set_context(context);
        }
        if with_player {
            bridge.bind(handle(&player));
        }

        for event in [
            PlayerEvent::ItemReady { index: 0 },
            PlayerEvent::Time { position: 1.0, duration: 10.0 },
            PlayerEvent::Complete,
        ] {
            player.emit(&event);
        }

        assert!(!bridge.is_bound());
        assert_eq!(player.listener_count(), 0);
        assert!(sink.calls().is_empty());

        bridge.unmount();
        assert!(sink.calls().is_empty());
    }
}

#[test]
fn rebinding_never_leaves_two_subscription_sets() {
    let (bridge, sink) = setup();
    let first = Arc::new(LocalPlayer::new());
    let second = Arc::new(LocalPlayer::new());

    bridge.set_context(movie_context("m1", "Movie"));
    bridge.bind(handle(&first));
    bridge.bind(handle(&second));
    bridge.bind(handle(&first));
    bridge.set_context(movie_context("m2", "Sequel"));

    for kind in PlayerEventKind::ALL {
        assert_eq!(first.listeners_for(kind), 1, "kind {kind}");
    }
    assert_eq!(second.listener_count(), 0);

    sink.take();
    first.emit(&PlayerEvent::Complete);
    second.emit(&PlayerEvent::Complete);
    assert_eq!(sink.calls(), vec![SinkCall::Complete]);
}

#[test]
fn each_invalidation_flushes_once_before_rebinding() {
    let (bridge, sink) = setup();
    let player = Arc::new(LocalPlayer::new());

    bridge.set_context(movie_context("m1", "Movie"));
    bridge.bind(handle(&player));
    player.emit(&PlayerEvent::Time { position: 12.0, duration: 90.0 });

    bridge.set_context(movie_context("m2", "Sequel"));
    player.emit(&PlayerEvent::ItemReady { index: 1 });

    let calls = sink.calls();
    assert_eq!(
        calls,
        vec![
            SinkCall::Time { position: 12.0, duration: 90.0 },
            SinkCall::Remove,
            ready("m2", "Sequel", Some(ViewerId(42))),
        ]
    );

    bridge.bind(None);
    assert_eq!(sink.count(|c| *c == SinkCall::Remove), 2);
    assert_eq!(player.listener_count(), 0);
}

#[test]
fn ready_repeats_with_values_captured_at_bind_time() {
    let (bridge, sink) = setup();
    let player = Arc::new(LocalPlayer::new());

    bridge.set_context(movie_context("m1", "Movie"));
    bridge.bind(handle(&player));

    // A viewer change alone does not rebind; the session keeps the old id.
    bridge.refresh_from(&AnalyticsToken::new("tok"), &AccountIdentity::signed_in("7"));
    assert_eq!(sink.count(|c| *c == SinkCall::Remove), 0);

    for _ in 0..3 {
        player.emit(&PlayerEvent::ItemReady { index: 0 });
    }

    assert_eq!(sink.calls(), vec![ready("m1", "Movie", Some(ViewerId(42))); 3]);
}

#[test]
fn seek_reports_live_player_duration() {
    let (bridge, sink) = setup();
    let player = Arc::new(LocalPlayer::new());
    player.set_duration(5400.0);

    bridge.set_context(movie_context("m1", "Movie"));
    bridge.bind(handle(&player));
    player.emit(&PlayerEvent::Seek {
        position: 100.0,
        offset: 200.0,
        duration: Some(1.0),
    });
    player.emit(&PlayerEvent::Seeked);

    assert_eq!(
        sink.calls(),
        vec![
            SinkCall::Seek { offset: 200.0, duration: 5400.0 },
            SinkCall::Seeked,
        ]
    );
}

#[test]
fn teardown_is_idempotent() {
    let (bridge, sink) = setup();
    let player = Arc::new(LocalPlayer::new());

    bridge.set_context(movie_context("m1", "Movie"));
    bridge.bind(handle(&player));

    bridge.bind(None);
    bridge.bind(None);
    bridge.unmount();

    assert_eq!(sink.calls(), vec![SinkCall::Remove]);
    assert_eq!(bridge.snapshot().flush_count, 1);
}

#[test]
fn teardown_tolerates_destroyed_player() {
    let (bridge, sink) = setup();
    let player = Arc::new(LocalPlayer::new());

    bridge.set_context(movie_context("m1", "Movie"));
    bridge.bind(handle(&player));
    player.destroy();

    bridge.unmount();
    assert_eq!(sink.calls(), vec![SinkCall::Remove]);
    assert!(!bridge.is_bound());
    assert_eq!(player.listener_count(), 0);
}

#[test]
fn all_event_kinds_are_forwarded() {
    let (bridge, sink) = setup();
    let player = Arc::new(LocalPlayer::new());
    player.set_duration(60.0);

    bridge.set_context(PlaybackContext {
        viewer_id: None,
        ..movie_context("m1", "Movie")
    });
    bridge.bind(handle(&player));

    player.emit(&PlayerEvent::ItemReady { index: 0 });
    player.emit(&PlayerEvent::AdImpression);
    player.emit(&PlayerEvent::Time { position: 5.0, duration: 60.0 });
    player.emit(&PlayerEvent::Seek { position: 5.0, offset: 30.0, duration: None });
    player.emit(&PlayerEvent::Seeked);
    player.emit(&PlayerEvent::Complete);
    bridge.unmount();

    assert_eq!(
        sink.calls(),
        vec![
            ready("m1", "Movie", None),
            SinkCall::AdImpression,
            SinkCall::Time { position: 5.0, duration: 60.0 },
            SinkCall::Seek { offset: 30.0, duration: 60.0 },
            SinkCall::Seeked,
            SinkCall::Complete,
            SinkCall::Remove,
        ]
    );
}

#[test]
fn disabled_config_keeps_bridge_unbound() {
    let (bridge, sink) = setup();
    let player = Arc::new(LocalPlayer::new());
    let config = TelemetryConfig {
        enabled: false,
        analytics_token: Some("tok".into()),
        ..TelemetryConfig::default()
    };

    bridge.set_item(Some(ContentItem::new("m1", "Movie")), "shelf1");
    bridge.bind(handle(&player));
    bridge.refresh_from(&config.token(), &AccountIdentity::anonymous());

    assert!(!bridge.is_bound());
    assert!(sink.calls().is_empty());
}

#[test]
fn token_change_flushes_and_rebinds() {
    let (bridge, sink) = setup();
    let player = Arc::new(LocalPlayer::new());

    bridge.set_context(movie_context("m1", "Movie"));
    bridge.bind(handle(&player));
    let first = bridge.snapshot().session_id;

    bridge.set_context(PlaybackContext {
        token: AnalyticsToken::new("tok2"),
        ..movie_context("m1", "Movie")
    });
    player.emit(&PlayerEvent::ItemReady { index: 0 });

    let calls = sink.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], SinkCall::Remove);
    match &calls[1] {
        SinkCall::Ready(report) => assert_eq!(report.token, "tok2"),
        other => panic!("expected ready, got {other:?}"),
    }
    assert_ne!(bridge.snapshot().session_id, first);
    assert_eq!(player.listener_count(), PlayerEventKind::ALL.len());
}

#[test]
fn feed_change_flushes_and_rebinds() {
    let (bridge, sink) = setup();
    let player = Arc::new(LocalPlayer::new());

    bridge.set_context(movie_context("m1", "Movie"));
    bridge.bind(handle(&player));

    bridge.set_item(Some(ContentItem::new("m1", "Movie")), "shelf2");
    player.emit(&PlayerEvent::ItemReady { index: 0 });

    let calls = sink.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], SinkCall::Remove);
    match &calls[1] {
        SinkCall::Ready(report) => {
            assert_eq!(report.feed_id, "shelf2");
            assert_eq!(report.media_id, "m1");
        }
        other => panic!("expected ready, got {other:?}"),
    }
    assert_eq!(player.listener_count(), PlayerEventKind::ALL.len());
    assert_eq!(bridge.snapshot().feed_id.as_deref(), Some("shelf2"));
}

#[test]
fn losing_token_tears_down_without_rebinding() {
    let (bridge, sink) = setup();
    let player = Arc::new(LocalPlayer::new());

    bridge.set_context(movie_context("m1", "Movie"));
    bridge.bind(handle(&player));

    bridge.refresh_from(&None::<AnalyticsToken>, &AccountIdentity::signed_in("42"));
    player.emit(&PlayerEvent::ItemReady { index: 0 });
    player.emit(&PlayerEvent::Complete);

    assert_eq!(sink.calls(), vec![SinkCall::Remove]);
    assert!(!bridge.is_bound());
    assert_eq!(player.listener_count(), 0);
}

#[test]
fn dropping_bridge_flushes_like_unmount() {
    let (bridge, sink) = setup();
    let player = Arc::new(LocalPlayer::new());

    bridge.set_context(movie_context("m1", "Movie"));
    bridge.bind(handle(&player));
    player.emit(&PlayerEvent::Time { position: 1.0, duration: 2.0 });
    drop(bridge);

    assert_eq!(
        sink.calls(),
        vec![SinkCall::Time { position: 1.0, duration: 2.0 }, SinkCall::Remove]
    );
    assert_eq!(player.listener_count(), 0);
}

#[test]
fn serialized_context_with_empty_token_stays_unbound() {
    let (bridge, sink) = setup();
    let player = Arc::new(LocalPlayer::new());
    let context: PlaybackContext = serde_json::from_str(
        r#"{"item":{"mediaId":"m1","title":"Movie"},"token":"","viewerId":42,"feedId":"shelf1"}"#,
    )
    .unwrap();

    bridge.set_context(context);
    bridge.bind(handle(&player));
    player.emit(&PlayerEvent::ItemReady { index: 0 });

    assert!(!bridge.is_bound());
    assert!(sink.calls().is_empty());
}
