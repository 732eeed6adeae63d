mod common;

use std::time::Duration;

use common::{Fixture, MemorySource, drain, fixture, standard_source};
use musicards::{
    audio::{
        error::AudioError,
        manager::Activation,
        player::{FadeOutReason, Phase},
        traits::MediaHandle,
    },
    event::events::Event,
};
use tokio::time::sleep;

fn unlocked(source: MemorySource) -> Fixture {
    let f = fixture(source);
    assert!(f.manager.unlock());
    drain(&f.events);
    f
}

#[tokio::test(start_paused = true)]
async fn activation_is_ignored_until_unlocked() {
    let f = fixture(standard_source());

    assert_eq!(f.manager.activate("cats").await, Ok(Activation::Locked));
    assert_eq!(f.backend.opens(), 0);
    assert_eq!(f.source.total_fetches(), 0);
    assert_eq!(f.manager.active().await, None);
    assert!(drain(&f.events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn unlock_fires_once() {
    let f = fixture(standard_source());

    assert!(!f.manager.gate().is_unlocked());
    assert!(f.manager.unlock());
    assert!(!f.manager.unlock());
    assert!(f.manager.gate().is_unlocked());
    assert_eq!(drain(&f.events), vec![Event::AudioUnlocked]);
}

#[tokio::test(start_paused = true)]
async fn invalid_window_never_opens_media() {
    let f = unlocked(standard_source());

    let err = f.manager.activate("inverted").await.unwrap_err();
    assert!(matches!(err, AudioError::ConfigValidation { .. }));
    assert_eq!(f.backend.opens(), 0);
    assert_eq!(f.manager.active().await, None);
    assert!(f.manager.player("inverted").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn out_of_range_window_is_rejected_not_played() {
    let f = unlocked(standard_source());

    let err = f.manager.activate("endless").await.unwrap_err();
    assert!(matches!(err, AudioError::ConfigValidation { .. }));
    assert_eq!(f.backend.opens(), 0);
    assert!(f.manager.player("endless").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn unreadable_configs_are_reported() {
    let f = unlocked(standard_source());

    let missing = f.manager.activate("nowhere").await.unwrap_err();
    assert!(matches!(missing, AudioError::ConfigFetch { .. }));

    let garbled = f.manager.activate("garbled").await.unwrap_err();
    assert!(matches!(garbled, AudioError::ConfigParse { .. }));

    assert_eq!(f.backend.opens(), 0);
    assert_eq!(f.manager.active().await, None);
}

#[tokio::test(start_paused = true)]
async fn activation_starts_configured_window() {
    let f = unlocked(standard_source());

    assert_eq!(f.manager.activate("rent").await, Ok(Activation::Started));
    assert_eq!(f.manager.active().await.as_deref(), Some("rent"));

    let media = f.backend.media("rent").unwrap();
    assert_eq!(media.position(), Duration::from_secs(30));

    sleep(Duration::from_secs(1)).await;
    assert!((media.volume() - 0.5).abs() < f32::EPSILON);
    assert!(f.manager.is_playing("rent").await);
    assert_eq!(drain(&f.events), vec![Event::PlaybackStarted("rent".into())]);
}

#[tokio::test(start_paused = true)]
async fn repeat_activation_reuses_media_and_rewinds() {
    let f = unlocked(standard_source());

    f.manager.activate("cats").await.unwrap();
    sleep(Duration::from_secs(2)).await;
    let media = f.backend.media("cats").unwrap();
    assert_eq!(media.position(), Duration::from_secs(3));

    assert_eq!(f.manager.activate("cats").await, Ok(Activation::Started));
    assert_eq!(media.position(), Duration::from_secs(1));

    f.manager.deactivate("cats").await;
    sleep(Duration::from_secs(1)).await;
    assert!(!f.manager.is_playing("cats").await);

    assert_eq!(f.manager.activate("cats").await, Ok(Activation::Started));
    assert_eq!(f.backend.opens(), 1);
    assert_eq!(f.backend.created("cats"), 1);
    assert_eq!(f.source.fetches("audio/cats/config.json"), 1);
}

#[tokio::test(start_paused = true)]
async fn switching_fades_out_previous_before_loading_next() {
    let f = unlocked(standard_source());
    f.manager.activate("cats").await.unwrap();
    sleep(Duration::from_secs(1)).await;
    let cats = f.manager.player("cats").await.unwrap();

    let request = f.manager.request("rent").await.unwrap();
    assert_eq!(cats.phase(), Phase::FadingOut(FadeOutReason::Stopped));
    assert_eq!(f.backend.opens(), 1);
    assert_eq!(f.manager.active().await, None);

    assert_eq!(f.manager.fulfil(request).await, Ok(Activation::Started));
    assert_eq!(f.manager.active().await.as_deref(), Some("rent"));

    sleep(Duration::from_secs(1)).await;
    assert_eq!(cats.phase(), Phase::Idle);
    assert!(f.manager.is_playing("rent").await);

    let events = drain(&f.events);
    assert!(events.contains(&Event::PlaybackStopped("cats".into())));
    assert!(events.contains(&Event::PlaybackStarted("rent".into())));
}

#[tokio::test(start_paused = true)]
async fn only_last_hovered_item_stays_audible() {
    let f = unlocked(standard_source());

    for item in ["cats", "rent", "wicked", "rent", "cats"] {
        f.manager.activate(item).await.unwrap();
        sleep(Duration::from_millis(100)).await;
    }
    sleep(Duration::from_secs(1)).await;

    assert_eq!(f.manager.active().await.as_deref(), Some("cats"));
    assert!(f.manager.is_playing("cats").await);
    assert!(!f.manager.is_playing("rent").await);
    assert!(!f.manager.is_playing("wicked").await);
    assert_eq!(f.backend.opens(), 3);
}

#[tokio::test(start_paused = true)]
async fn deactivation_during_fetch_discards_it() {
    let f = unlocked(standard_source().with_delay("cats", Duration::from_millis(300)));

    let manager = f.manager.clone();
    let pending = tokio::spawn(async move { manager.activate("cats").await });
    sleep(Duration::from_millis(50)).await;
    f.manager.deactivate("cats").await;

    assert_eq!(pending.await.unwrap(), Ok(Activation::Superseded));
    assert_eq!(f.backend.opens(), 0);
    assert_eq!(f.manager.active().await, None);
    assert!(drain(&f.events).is_empty());

    // The config was still cached for the next hover.
    assert!(f.manager.config("cats").await.is_some());
}

#[tokio::test(start_paused = true)]
async fn newer_request_wins_over_slow_fetch() {
    let f = unlocked(standard_source().with_delay("cats", Duration::from_millis(300)));

    let manager = f.manager.clone();
    let slow = tokio::spawn(async move { manager.activate("cats").await });
    sleep(Duration::from_millis(50)).await;

    assert_eq!(f.manager.activate("rent").await, Ok(Activation::Started));
    assert_eq!(slow.await.unwrap(), Ok(Activation::Superseded));
    assert_eq!(f.manager.active().await.as_deref(), Some("rent"));
    assert_eq!(f.backend.created("cats"), 0);
}

#[tokio::test(start_paused = true)]
async fn mute_covers_existing_and_future_players() {
    let f = unlocked(standard_source());
    f.manager.activate("cats").await.unwrap();

    assert!(f.manager.toggle_mute().await);
    assert!(f.manager.is_muted().await);
    let cats = f.backend.media("cats").unwrap();
    assert!(cats.is_muted());

    f.manager.activate("rent").await.unwrap();
    let rent = f.backend.media("rent").unwrap();
    assert!(rent.is_muted());

    sleep(Duration::from_secs(1)).await;
    assert!((rent.volume() - 0.5).abs() < f32::EPSILON);

    assert!(!f.manager.toggle_mute().await);
    assert!(!cats.is_muted());
    assert!(!rent.is_muted());

    let mutes: Vec<Event> = drain(&f.events)
        .into_iter()
        .filter(|e| matches!(e, Event::MuteChanged(_)))
        .collect();
    assert_eq!(
        mutes,
        vec![Event::MuteChanged(true), Event::MuteChanged(false)]
    );
}

#[tokio::test(start_paused = true)]
async fn refused_playback_clears_selection() {
    let f = unlocked(standard_source());
    f.backend.fail_play("rent");

    let err = f.manager.activate("rent").await.unwrap_err();
    assert!(matches!(err, AudioError::PlaybackStart { .. }));
    assert_eq!(f.manager.active().await, None);
    assert!(!f.manager.is_playing("rent").await);
}
