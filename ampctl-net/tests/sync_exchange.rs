//! End-to-end sync exchanges against a scripted fake device.

mod common;

use std::time::Duration;

use ampctl_net::{SyncError, SyncOutcome, SyncSession, DEFAULT_TIMEOUT};
use ampctl_types::{AmpSettings, EffectKind, KnobTarget, SettingId};

use common::{reply_for, FakeAmp, Script};

fn device_settings() -> AmpSettings {
    let mut s = AmpSettings::default();
    s.set(SettingId::TremoloRate, 3.5).unwrap();
    s.set(SettingId::TremoloDepth, 25.0).unwrap();
    s.set(SettingId::EchoDelay, 250.0).unwrap();
    s.set(SettingId::EchoFeedback, 40.0).unwrap();
    s.set(SettingId::ReverbShimmer, 12000.0).unwrap();
    s.footswitches[0].set(EffectKind::Distortion, true);
    s.footswitches[2].set(EffectKind::Reverb, true);
    s.knobs = [KnobTarget::EchoFeedback, KnobTarget::NotAssigned];
    s
}

#[test]
fn first_sync_fetches_device_state() {
    let on_device = device_settings();
    let amp = FakeAmp::serve(vec![Script::Reply(reply_for(&on_device))]);

    let mut session = SyncSession::new(amp.addr.clone(), DEFAULT_TIMEOUT);
    let mut settings = AmpSettings::default();
    let outcome = session.sync(&mut settings).expect("sync");

    assert_eq!(outcome, SyncOutcome::Applied);
    assert_eq!(settings, on_device);

    let requests = amp.finish();
    assert_eq!(requests, vec!["GET /putsets HTTP/1.1\r\n".to_string()]);
}

#[test]
fn second_sync_pushes_an_update() {
    let on_device = device_settings();
    let amp = FakeAmp::serve(vec![
        Script::Reply(reply_for(&on_device)),
        Script::Reply(reply_for(&on_device)),
    ]);

    let mut session = SyncSession::new(amp.addr.clone(), DEFAULT_TIMEOUT);
    let mut settings = AmpSettings::default();
    session.sync(&mut settings).expect("first sync");

    // Edit locally, then push.
    settings.set(SettingId::EchoDelay, 500.0).unwrap();
    settings.set(SettingId::EchoFeedback, 50.0).unwrap();
    session.sync(&mut settings).expect("second sync");

    let requests = amp.finish();
    assert!(requests[1].starts_with("GET /getsets/ "), "was {:?}", requests[1]);
    assert!(requests[1].ends_with(" HTTP/1.1\r\n"), "was {:?}", requests[1]);
    // Delay 500 ms as ticks, feedback 50 % as a fraction.
    assert!(requests[1].contains(" 24000 0.5 "), "was {:?}", requests[1]);
}

#[test]
fn garbled_reply_is_protocol_error_and_leaves_store() {
    let amp = FakeAmp::serve(vec![Script::Reply("HTTP/1.1 500 ERROR".to_string())]);

    let mut session = SyncSession::new(amp.addr.clone(), DEFAULT_TIMEOUT);
    let mut settings = AmpSettings::default();
    let before = settings.clone();

    match session.sync(&mut settings) {
        Err(SyncError::Protocol(_)) => {}
        other => panic!("expected protocol error, got {:?}", other),
    }
    assert_eq!(settings, before);
    assert!(!session.is_connected());
    amp.finish();
}

#[test]
fn out_of_range_footswitch_in_reply_is_protocol_error() {
    // A bitmask of 32 has a bit above the five effect bits.
    let reply =
        "HTTP/1.1 200 OK settings: 32 0 0 24000 5 0.5 0.5 0.5 0.5 9000 0.5 0.2 0.75 0.5 0 1 2"
            .to_string();
    let amp = FakeAmp::serve(vec![Script::Reply(reply)]);

    let mut session = SyncSession::new(amp.addr.clone(), DEFAULT_TIMEOUT);
    let mut settings = AmpSettings::default();
    let before = settings.clone();

    match session.sync(&mut settings) {
        Err(SyncError::Protocol(_)) => {}
        other => panic!("expected protocol error, got {:?}", other),
    }
    assert_eq!(settings, before);
    amp.finish();
}

#[test]
fn update_follows_even_a_failed_first_exchange() {
    // The fetch happens on the first successful connection only; a garbled
    // first reply must not make the next sync fetch again.
    let on_device = device_settings();
    let amp = FakeAmp::serve(vec![
        Script::Reply("not a settings dump".to_string()),
        Script::Reply(reply_for(&on_device)),
    ]);

    let mut session = SyncSession::new(amp.addr.clone(), DEFAULT_TIMEOUT);
    let mut settings = AmpSettings::default();

    assert!(session.sync(&mut settings).is_err());
    session.sync(&mut settings).expect("second sync");
    assert_eq!(settings, on_device);

    let requests = amp.finish();
    assert_eq!(requests[0], "GET /putsets HTTP/1.1\r\n");
    assert!(requests[1].starts_with("GET /getsets/ "), "was {:?}", requests[1]);
}

#[test]
fn empty_reply_is_protocol_error() {
    let amp = FakeAmp::serve(vec![Script::CloseSilently]);

    let mut session = SyncSession::new(amp.addr.clone(), DEFAULT_TIMEOUT);
    let mut settings = AmpSettings::default();

    // Zero bytes then close: the reply "arrived" and has zero tokens.
    match session.sync(&mut settings) {
        Err(SyncError::Protocol(_)) => {}
        other => panic!("expected protocol error, got {:?}", other),
    }
    amp.finish();
}

#[test]
fn silent_device_times_out_as_transport_error() {
    let amp = FakeAmp::serve(vec![Script::Stall(Duration::from_millis(1500))]);

    let mut session = SyncSession::new(amp.addr.clone(), Duration::from_millis(300));
    let mut settings = AmpSettings::default();
    let before = settings.clone();

    match session.sync(&mut settings) {
        Err(SyncError::Transport(_)) => {}
        other => panic!("expected transport error, got {:?}", other),
    }
    assert_eq!(settings, before);
    amp.finish();
}

#[test]
fn session_is_reentrant_after_failure() {
    let on_device = device_settings();
    let amp = FakeAmp::serve(vec![
        Script::CloseSilently,
        Script::Reply(reply_for(&on_device)),
    ]);

    let mut session = SyncSession::new(amp.addr.clone(), DEFAULT_TIMEOUT);
    let mut settings = AmpSettings::default();

    assert!(session.sync(&mut settings).is_err());
    let outcome = session.sync(&mut settings).expect("retry");
    assert_eq!(outcome, SyncOutcome::Applied);
    assert_eq!(settings, on_device);
    amp.finish();
}
