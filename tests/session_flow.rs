//! End-to-end session behavior against a fake soundbar

mod common;

use common::{pump, FakeSoundbar};
use yas_link::core::ManualClock;
use yas_link::devices::yas207::constants::{HANDSHAKE_FOLLOWUP, HANDSHAKE_INIT};
use yas_link::devices::yas207::{
    InputKind, Intent, IntentValue, LinkSession, NamedCommand, SessionPhase, SessionSettings,
    SurroundKind, WakeRule,
};
use yas_link::Error;
use NamedCommand::*;

fn synced_session(device: &mut FakeSoundbar) -> LinkSession<ManualClock> {
    let mut session = LinkSession::with_clock(SessionSettings::default(), ManualClock::new());
    pump(&mut session, device);
    assert_eq!(session.phase(), SessionPhase::Synced);
    session
}

#[test]
fn test_handshake_then_return_to_standby() {
    let mut device = FakeSoundbar::new();
    let session = synced_session(&mut device);

    let received = device.received();
    assert_eq!(received[0], HANDSHAKE_INIT.to_vec());
    assert_eq!(received[1], HANDSHAKE_FOLLOWUP.to_vec());
    assert_eq!(
        device.received_commands(),
        vec![ReportStatus, SetInputHdmi, PowerOff, ReportStatus]
    );

    let state = session.current_state().unwrap();
    assert!(!state.power);
    assert_eq!(state.input, InputKind::Hdmi);
    assert!(session.reconciliation().is_none());
}

#[test]
fn test_volume_intent_while_off() {
    let mut device = FakeSoundbar::new();
    let mut session = synced_session(&mut device);
    device.clear_received();

    session
        .submit_intent(Intent {
            volume: Some(20),
            ..Intent::default()
        })
        .unwrap();
    pump(&mut session, &mut device);

    let mut expected = vec![ReportStatus, PowerOn];
    expected.extend(std::iter::repeat(VolumeUp).take(10));
    expected.extend([PowerOff, ReportStatus]);
    assert_eq!(device.received_commands(), expected);

    let state = session.current_state().unwrap();
    assert_eq!(state.volume, 20);
    assert!(!state.power);
    assert!(session.reconciliation().is_none());
}

#[test]
fn test_intent_leaving_device_on() {
    let mut device = FakeSoundbar::new();
    let mut session = synced_session(&mut device);
    device.clear_received();

    let intent = Intent::from_fields([
        ("power", IntentValue::from(true)),
        ("input", IntentValue::from("tv")),
        ("surround", IntentValue::from("movie")),
        ("clearvoice", IntentValue::from(true)),
    ])
    .unwrap();
    session.submit_intent(intent).unwrap();
    pump(&mut session, &mut device);

    assert_eq!(
        device.received_commands(),
        vec![ReportStatus, PowerOn, SetInputTv, SetMovie, ClearvoiceOn, ReportStatus]
    );
    let state = session.current_state().unwrap();
    assert!(state.power);
    assert_eq!(state.input, InputKind::Tv);
    assert_eq!(state.surround, SurroundKind::Movie);
    assert!(state.clearvoice);
}

#[test]
fn test_refused_change_stops_after_one_retry() {
    let mut device = FakeSoundbar::new();
    let mut session = synced_session(&mut device);
    device.clear_received();
    device.volume_locked = true;

    session
        .submit_intent(Intent {
            volume: Some(15),
            power: Some(true),
            ..Intent::default()
        })
        .unwrap();
    pump(&mut session, &mut device);

    let mut expected = vec![ReportStatus, PowerOn];
    expected.extend(std::iter::repeat(VolumeUp).take(5));
    expected.push(ReportStatus);
    assert_eq!(device.received_commands(), expected);
    assert_eq!(session.current_state().unwrap().volume, 10);
    assert!(session.reconciliation().is_none());
}

#[test]
fn test_mute_while_off_is_not_enforced() {
    let mut device = FakeSoundbar::new();
    let mut session = synced_session(&mut device);
    device.clear_received();

    session
        .submit_intent(Intent {
            mute: Some(true),
            ..Intent::default()
        })
        .unwrap();
    pump(&mut session, &mut device);

    assert_eq!(device.received_commands(), vec![ReportStatus]);
    assert!(!session.current_state().unwrap().muted);
}

#[test]
fn test_wake_rule_disabled_keeps_device_on() {
    let mut settings = SessionSettings::default();
    settings.initial_policy.wake_rule = None;
    let mut device = FakeSoundbar::new();
    let mut session = LinkSession::with_clock(settings, ManualClock::new());
    pump(&mut session, &mut device);

    assert_eq!(device.received_commands(), vec![ReportStatus]);
    assert!(session.current_state().unwrap().power);
}

#[test]
fn test_custom_wake_rule() {
    let mut settings = SessionSettings::default();
    settings.initial_policy.wake_rule = Some(WakeRule {
        wake_input: InputKind::Bluetooth,
        standby_input: InputKind::Analog,
    });
    let mut device = FakeSoundbar::new();
    let mut session = LinkSession::with_clock(settings, ManualClock::new());
    pump(&mut session, &mut device);

    let state = session.current_state().unwrap();
    assert_eq!(state.input, InputKind::Analog);
    assert!(!state.power);
}

#[test]
fn test_named_and_raw_commands() {
    let mut device = FakeSoundbar::new();
    let mut session = synced_session(&mut device);
    device.clear_received();

    session.submit_command("power_on").unwrap();
    session.submit_command("mute_on").unwrap();
    session
        .submit_raw(yas_link::devices::yas207::RawPacket::from("0305"))
        .unwrap();
    pump(&mut session, &mut device);

    assert_eq!(device.received_commands(), vec![PowerOn, MuteOn, ReportStatus]);
    assert!(session.current_state().unwrap().muted);

    assert!(matches!(
        session.submit_command("self_destruct"),
        Err(Error::UnknownCommand(_))
    ));
}

#[test]
fn test_resync_after_reset() {
    let mut device = FakeSoundbar::new();
    let mut session = synced_session(&mut device);
    device.clear_received();

    session.on_transport_reset();
    assert_eq!(session.phase(), SessionPhase::Initial);
    pump(&mut session, &mut device);

    // Fresh handshake wakes the device again and the initial intent reapplies
    assert_eq!(session.phase(), SessionPhase::Synced);
    assert_eq!(
        device.received_commands(),
        vec![ReportStatus, SetInputHdmi, PowerOff, ReportStatus]
    );
    assert!(!session.current_state().unwrap().power);
}
