//! Randomised call sequences against the attachment coordinator

use proptest::prelude::*;
use tempfile::TempDir;

use super::attachment::AttachmentCoordinator;
use super::ports::{player_event_channel, PlayerSignal};
use super::testing::MockDevices;
use crate::domain::attachment::AudioPhase;

#[derive(Debug, Clone)]
enum Action {
    SelectImage,
    ClearImage,
    StartRecording,
    StopRecording,
    PlayAudio,
    StopPlayback,
    DeleteAudio,
    Teardown,
    Ready,
    Completed,
    Failed,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        1 => Just(Action::SelectImage),
        1 => Just(Action::ClearImage),
        3 => Just(Action::StartRecording),
        3 => Just(Action::StopRecording),
        3 => Just(Action::PlayAudio),
        1 => Just(Action::StopPlayback),
        1 => Just(Action::DeleteAudio),
        1 => Just(Action::Teardown),
        3 => Just(Action::Ready),
        2 => Just(Action::Completed),
        1 => Just(Action::Failed),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn devices_follow_phase(
        actions in prop::collection::vec(action(), 1..40),
        recorder_start_fails in prop::bool::weighted(0.05),
        recorder_stop_fails in prop::bool::weighted(0.1),
        player_acquire_fails in prop::bool::weighted(0.1),
        player_prepare_fails in prop::bool::weighted(0.1),
        player_start_fails in prop::bool::weighted(0.1),
        player_stop_fails in prop::bool::weighted(0.2),
    ) {
        let devices = MockDevices::new();
        devices.script(|s| {
            s.recorder_start_fails = recorder_start_fails;
            s.recorder_stop_fails = recorder_stop_fails;
            s.player_acquire_fails = player_acquire_fails;
            s.player_prepare_fails = player_prepare_fails;
            s.player_start_fails = player_start_fails;
            s.player_stop_fails = player_stop_fails;
        });
        let dir = TempDir::new().unwrap();
        let (tx, mut events) = player_event_channel();
        let mut coordinator =
            AttachmentCoordinator::new(devices.recorder(), devices.player(), dir.path(), tx);

        for action in actions {
            match action {
                Action::SelectImage => coordinator.select_image(Some("content://media/1".into())),
                Action::ClearImage => coordinator.clear_image(),
                Action::StartRecording => coordinator.start_recording(),
                Action::StopRecording => coordinator.stop_recording(),
                Action::PlayAudio => coordinator.play_audio(),
                Action::StopPlayback => coordinator.stop_playback(),
                Action::DeleteAudio => coordinator.delete_audio(),
                Action::Teardown => coordinator.teardown(),
                Action::Ready => { devices.signal(PlayerSignal::Ready); }
                Action::Completed => { devices.signal(PlayerSignal::Completed); }
                Action::Failed => { devices.signal(PlayerSignal::Failed("decoder".into())); }
            }
            while let Ok(event) = events.try_recv() {
                coordinator.handle_player_event(event);
            }

            let phase = coordinator.phase().clone();
            prop_assert_eq!(coordinator.recorder_held(), phase.is_recording());
            if phase.is_playing() {
                prop_assert!(coordinator.player_held());
            }
            prop_assert!(!(coordinator.recorder_held() && coordinator.player_held()));
            prop_assert_eq!(devices.recorders_held(), usize::from(coordinator.recorder_held()));
            prop_assert_eq!(devices.players_held(), usize::from(coordinator.player_held()));

            match phase {
                AudioPhase::Idle => prop_assert!(coordinator.audio_file().is_none()),
                AudioPhase::Recording | AudioPhase::Recorded | AudioPhase::Playing => {
                    prop_assert!(coordinator.audio_file().is_some())
                }
                AudioPhase::Error(_) => {}
            }
        }

        coordinator.teardown();
        prop_assert_eq!(devices.recorders_held(), 0);
        prop_assert_eq!(devices.players_held(), 0);
    }
}
