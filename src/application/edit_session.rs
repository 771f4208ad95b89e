//! Task-edit session use case
//!
//! One session owns the draft and the attachment coordinator, and is the
//! only thing that touches them. User commands and player signals are
//! processed one at a time from a single loop, so no transition is ever
//! observed half-applied.

use std::time::Duration as StdDuration;

use chrono::NaiveDateTime;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::attachment::{AttachmentCoordinator, AttachmentSnapshot};
use super::ports::{
    Notice, Notifier, PlayerDevice, PlayerEventReceiver, RecorderDevice, SessionStore,
    TaskSubmitter,
};
use crate::domain::attachment::AudioPhase;
use crate::domain::recording::Duration;
use crate::domain::task::{Priority, SaveResult, Task, TaskDraft};

/// How often the recording cap is checked
const RECORDING_CAP_POLL: StdDuration = StdDuration::from_millis(250);

/// Message shown after a successful save
pub const SAVE_SUCCESS_MESSAGE: &str = "Task saved!";

/// Commands a user (or the UI) can send to a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    SetTitle(String),
    SetBody(String),
    SetTag(String),
    SetPriority(Priority),
    SetDue(Option<NaiveDateTime>),
    SelectImage(Option<String>),
    ClearImage,
    StartRecording,
    StopRecording,
    PlayAudio,
    StopPlayback,
    DeleteAudio,
    Save,
    ResetSaveState,
    /// Discard the draft and its voice memo
    Cancel,
}

/// Configuration for an edit session
#[derive(Debug, Clone)]
pub struct EditSessionConfig {
    /// Simulated latency before the task is handed to the submitter
    pub submit_delay: Duration,
    /// Recordings are stopped automatically after this long
    pub max_recording: Duration,
    /// Whether to show a notification after saving
    pub enable_notify: bool,
}

impl Default for EditSessionConfig {
    fn default() -> Self {
        Self {
            submit_delay: Duration::default_submit_delay(),
            max_recording: Duration::default_max_recording(),
            enable_notify: false,
        }
    }
}

/// Everything a presenter needs to render the session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub draft: TaskDraft,
    pub attachments: AttachmentSnapshot,
    pub save_result: SaveResult,
    pub is_loading: bool,
}

/// How a session ended
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Explicit save; carries the stored task
    Saved(Task),
    /// Explicit cancel; the memo was deleted
    Cancelled,
    /// Command channel closed without save or cancel
    Closed,
}

/// Task-edit session
pub struct EditSession<R, P, S, K, N>
where
    R: RecorderDevice,
    P: PlayerDevice,
    S: TaskSubmitter,
    K: SessionStore,
    N: Notifier,
{
    coordinator: AttachmentCoordinator<R, P>,
    draft: TaskDraft,
    save_result: SaveResult,
    is_loading: bool,
    submitter: S,
    session_store: K,
    notifier: N,
    config: EditSessionConfig,
}

impl<R, P, S, K, N> EditSession<R, P, S, K, N>
where
    R: RecorderDevice,
    P: PlayerDevice,
    S: TaskSubmitter,
    K: SessionStore,
    N: Notifier,
{
    /// Create a new session around a fresh coordinator
    pub fn new(
        coordinator: AttachmentCoordinator<R, P>,
        draft: TaskDraft,
        submitter: S,
        session_store: K,
        notifier: N,
        config: EditSessionConfig,
    ) -> Self {
        Self {
            coordinator,
            draft,
            save_result: SaveResult::Idle,
            is_loading: false,
            submitter,
            session_store,
            notifier,
            config,
        }
    }

    pub fn coordinator(&self) -> &AttachmentCoordinator<R, P> {
        &self.coordinator
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn save_result(&self) -> &SaveResult {
        &self.save_result
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            draft: self.draft.clone(),
            attachments: self.coordinator.snapshot(),
            save_result: self.save_result.clone(),
            is_loading: self.is_loading,
        }
    }

    /// Apply a command that completes without waiting.
    ///
    /// `Save` and `Cancel` end the session and are handled by [`Self::run`];
    /// here they are ignored.
    pub fn apply(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::SetTitle(title) => self.draft.set_title(title),
            SessionCommand::SetBody(body) => self.draft.set_body(body),
            SessionCommand::SetTag(tag) => self.draft.set_tag(tag),
            SessionCommand::SetPriority(priority) => self.draft.set_priority(priority),
            SessionCommand::SetDue(due) => self.draft.set_due(due),
            SessionCommand::SelectImage(reference) => self.coordinator.select_image(reference),
            SessionCommand::ClearImage => self.coordinator.clear_image(),
            SessionCommand::StartRecording => device_call(|| self.coordinator.start_recording()),
            SessionCommand::StopRecording => device_call(|| self.coordinator.stop_recording()),
            SessionCommand::PlayAudio => device_call(|| self.coordinator.play_audio()),
            SessionCommand::StopPlayback => device_call(|| self.coordinator.stop_playback()),
            SessionCommand::DeleteAudio => device_call(|| self.coordinator.delete_audio()),
            SessionCommand::ResetSaveState => self.save_result = SaveResult::Idle,
            SessionCommand::Save | SessionCommand::Cancel => {
                debug!(?command, "session-ending command passed to apply; ignored");
            }
        }
    }

    /// Validate the draft and compose the task to submit.
    ///
    /// Returns `None` (with `save_result` set) when nothing should be submitted.
    pub async fn prepare_save(&mut self) -> Option<Task> {
        if self.is_loading {
            debug!("save already in flight");
            return None;
        }

        if !self.draft.has_title() {
            self.save_result = SaveResult::Error("Title cannot be empty.".to_string());
            return None;
        }

        // The submitted memo must be a finished file
        if self.coordinator.phase().is_recording() {
            device_call(|| self.coordinator.stop_recording());
            if let AudioPhase::Error(reason) = self.coordinator.phase() {
                warn!(%reason, "memo lost while saving");
                self.save_result =
                    SaveResult::Error(format!("Voice memo could not be saved: {}", reason));
                return None;
            }
        }
        if self.coordinator.phase().is_playing() {
            device_call(|| self.coordinator.stop_playback());
        }

        let owner_id = match self.session_store.load().await {
            Ok(identity) => identity.user_id.filter(|id| !id.is_empty()),
            Err(e) => {
                warn!(error = %e, "cannot read session; saving without owner");
                None
            }
        };

        match self.draft.compose(
            self.coordinator.image_reference(),
            self.coordinator.audio_file(),
            owner_id,
        ) {
            Ok(task) => {
                self.is_loading = true;
                self.save_result = SaveResult::Idle;
                Some(task)
            }
            Err(e) => {
                self.save_result = SaveResult::Error(e.to_string());
                None
            }
        }
    }

    /// Hand a composed task to the submitter after the configured delay.
    pub async fn submit(&mut self, task: Task) -> Option<Task> {
        tokio::time::sleep(self.config.submit_delay.as_std()).await;

        let outcome = self.submitter.submit(task).await;
        self.is_loading = false;

        match outcome {
            Ok(saved) => {
                info!(id = ?saved.id, title = %saved.title, "task saved");
                self.save_result = SaveResult::Success(Some(SAVE_SUCCESS_MESSAGE.to_string()));
                if self.config.enable_notify {
                    if let Err(e) = self.notifier.notify(&Notice::task_saved(&saved)).await {
                        warn!(error = %e, "notification failed");
                    }
                }
                Some(saved)
            }
            Err(e) => {
                warn!(error = %e, "task submission failed");
                self.save_result = SaveResult::Error(format!("Failed to save task: {}", e));
                None
            }
        }
    }

    /// Validate, compose, and submit in one step.
    pub async fn save(&mut self) -> Option<Task> {
        let task = self.prepare_save().await?;
        self.submit(task).await
    }

    /// Discard the memo and release every device
    pub fn cancel(&mut self) {
        device_call(|| {
            self.coordinator.delete_audio();
            self.coordinator.teardown();
        });
    }

    /// Stop a recording that has run past the configured cap
    fn enforce_recording_cap(&mut self) {
        if let Some(elapsed) = self.coordinator.recording_elapsed() {
            if elapsed >= self.config.max_recording.as_std() {
                info!(limit = %self.config.max_recording, "recording cap reached");
                device_call(|| self.coordinator.stop_recording());
            }
        }
    }

    /// Run the session until it is saved, cancelled, or its command channel closes.
    ///
    /// A snapshot is published after every processed input.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        mut player_events: PlayerEventReceiver,
        updates: watch::Sender<SessionSnapshot>,
    ) -> SessionOutcome {
        let mut cap_check = tokio::time::interval(RECORDING_CAP_POLL);
        cap_check.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let outcome = loop {
            tokio::select! {
                command = commands.recv() => match command {
                    None => {
                        debug!("command channel closed");
                        break SessionOutcome::Closed;
                    }
                    Some(SessionCommand::Cancel) => {
                        self.cancel();
                        break SessionOutcome::Cancelled;
                    }
                    Some(SessionCommand::Save) => {
                        if let Some(task) = self.prepare_save().await {
                            updates.send_replace(self.snapshot());
                            if let Some(saved) = self.submit(task).await {
                                break SessionOutcome::Saved(saved);
                            }
                        }
                    }
                    Some(command) => self.apply(command),
                },
                Some(event) = player_events.recv() => {
                    device_call(|| self.coordinator.handle_player_event(event));
                }
                _ = cap_check.tick() => {
                    if self.coordinator.recording_elapsed().is_none() {
                        continue;
                    }
                    self.enforce_recording_cap();
                }
            }
            updates.send_replace(self.snapshot());
        };

        device_call(|| self.coordinator.teardown());
        updates.send_replace(self.snapshot());
        outcome
    }
}

/// Run a coordinator call that may wait on a device thread.
///
/// Encoding a finished memo and joining device threads block, so on a
/// multi-thread runtime the worker is handed over with `block_in_place`.
/// A current-thread runtime has no other worker to hand over to.
fn device_call<T>(call: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(call)
        }
        _ => call(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        player_event_channel, NotificationError, PlayerSignal, SessionStoreError,
        SubmissionError,
    };
    use crate::application::testing::{MockDevices, MockPlayer, MockRecorder};
    use crate::domain::session::SessionIdentity;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct MockSubmitter {
        submitted: Arc<Mutex<Vec<Task>>>,
        fail: bool,
    }

    #[async_trait]
    impl TaskSubmitter for MockSubmitter {
        async fn submit(&self, mut task: Task) -> Result<Task, SubmissionError> {
            if self.fail {
                return Err(SubmissionError::Unavailable("offline".into()));
            }
            task.id.get_or_insert_with(|| "1".to_string());
            self.submitted.lock().unwrap().push(task.clone());
            Ok(task)
        }
    }

    struct MockSessionStore {
        identity: SessionIdentity,
    }

    #[async_trait]
    impl SessionStore for MockSessionStore {
        async fn load(&self) -> Result<SessionIdentity, SessionStoreError> {
            Ok(self.identity.clone())
        }

        async fn save(&self, _identity: &SessionIdentity) -> Result<(), SessionStoreError> {
            Ok(())
        }

        async fn clear(&self) -> Result<(), SessionStoreError> {
            Ok(())
        }

        fn path(&self) -> PathBuf {
            PathBuf::from("/dev/null")
        }
    }

    #[derive(Clone, Default)]
    struct MockNotifier {
        shown: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn notify(&self, _notice: &Notice) -> Result<(), NotificationError> {
            self.shown.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    type TestSession =
        EditSession<MockRecorder, MockPlayer, MockSubmitter, MockSessionStore, MockNotifier>;

    struct Harness {
        devices: MockDevices,
        submitter: MockSubmitter,
        notifier: MockNotifier,
        events: PlayerEventReceiver,
        session: TestSession,
        _dir: TempDir,
    }

    fn harness_with(submitter: MockSubmitter, config: EditSessionConfig) -> Harness {
        let devices = MockDevices::new();
        let dir = TempDir::new().unwrap();
        let (tx, events) = player_event_channel();
        let coordinator =
            AttachmentCoordinator::new(devices.recorder(), devices.player(), dir.path(), tx);
        let notifier = MockNotifier::default();
        let session = EditSession::new(
            coordinator,
            TaskDraft::new(),
            submitter.clone(),
            MockSessionStore {
                identity: SessionIdentity::logged_in("user-9"),
            },
            notifier.clone(),
            config,
        );
        Harness {
            devices,
            submitter,
            notifier,
            events,
            session,
            _dir: dir,
        }
    }

    fn fast_config() -> EditSessionConfig {
        EditSessionConfig {
            submit_delay: Duration::from_millis(1),
            ..Default::default()
        }
    }

    fn harness() -> Harness {
        harness_with(MockSubmitter::default(), fast_config())
    }

    #[tokio::test]
    async fn blank_title_is_rejected_without_submitting() {
        let mut h = harness();
        h.session.apply(SessionCommand::SetTitle("   ".into()));

        assert!(h.session.save().await.is_none());
        assert_eq!(
            h.session.save_result(),
            &SaveResult::Error("Title cannot be empty.".into())
        );
        assert!(h.submitter.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_composes_task_with_attachments_and_owner() {
        let mut h = harness();
        h.session.apply(SessionCommand::SetTitle(" Call mom ".into()));
        h.session.apply(SessionCommand::SetTag("".into()));
        h.session.apply(SessionCommand::SetPriority(Priority::Low));
        h.session
            .apply(SessionCommand::SelectImage(Some("content://media/3".into())));
        h.session.apply(SessionCommand::StartRecording);
        h.session.apply(SessionCommand::StopRecording);

        let saved = h.session.save().await.unwrap();
        assert_eq!(saved.title, "Call mom");
        assert!(saved.tag.is_none());
        assert_eq!(saved.priority, Priority::Low);
        assert_eq!(saved.image_url.as_deref(), Some("content://media/3"));
        assert!(saved.audio_url.unwrap().starts_with("file://"));
        assert_eq!(saved.owner_id.as_deref(), Some("user-9"));
        assert_eq!(
            h.session.save_result(),
            &SaveResult::Success(Some(SAVE_SUCCESS_MESSAGE.into()))
        );
        assert!(!h.session.is_loading());
    }

    #[tokio::test]
    async fn save_stops_an_active_recording_first() {
        let mut h = harness();
        h.session.apply(SessionCommand::SetTitle("Memo".into()));
        h.session.apply(SessionCommand::StartRecording);

        let saved = h.session.save().await.unwrap();
        assert!(saved.audio_url.is_some());
        assert_eq!(h.session.coordinator().phase(), &AudioPhase::Recorded);
        assert_eq!(h.devices.recorders_held(), 0);
    }

    #[tokio::test]
    async fn save_aborts_when_memo_cannot_be_finished() {
        let mut h = harness();
        h.session.apply(SessionCommand::SetTitle("Memo".into()));
        h.session.apply(SessionCommand::StartRecording);
        h.devices.script(|s| s.recorder_stop_fails = true);

        assert!(h.session.save().await.is_none());
        match h.session.save_result() {
            SaveResult::Error(message) => {
                assert!(message.starts_with("Voice memo could not be saved"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(h.submitter.submitted.lock().unwrap().is_empty());
        assert!(!h.session.is_loading());
        assert!(h.session.coordinator().phase().is_error());
        assert_eq!(h.devices.recorders_held(), 0);
    }

    #[tokio::test]
    async fn submit_failure_is_reported() {
        let mut h = harness_with(
            MockSubmitter {
                fail: true,
                ..Default::default()
            },
            fast_config(),
        );
        h.session.apply(SessionCommand::SetTitle("Study".into()));

        assert!(h.session.save().await.is_none());
        match h.session.save_result() {
            SaveResult::Error(message) => assert!(message.starts_with("Failed to save task")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!h.session.is_loading());

        h.session.apply(SessionCommand::ResetSaveState);
        assert_eq!(h.session.save_result(), &SaveResult::Idle);
    }

    #[tokio::test]
    async fn save_is_ignored_while_loading() {
        let mut h = harness();
        h.session.apply(SessionCommand::SetTitle("Study".into()));
        let first = h.session.prepare_save().await;
        assert!(first.is_some());
        assert!(h.session.is_loading());

        assert!(h.session.prepare_save().await.is_none());
    }

    #[tokio::test]
    async fn notification_only_when_enabled() {
        let mut h = harness();
        h.session.apply(SessionCommand::SetTitle("Quiet".into()));
        h.session.save().await.unwrap();
        assert_eq!(h.notifier.shown.load(Ordering::SeqCst), 0);

        let mut h = harness_with(
            MockSubmitter::default(),
            EditSessionConfig {
                enable_notify: true,
                ..fast_config()
            },
        );
        h.session.apply(SessionCommand::SetTitle("Loud".into()));
        h.session.save().await.unwrap();
        assert_eq!(h.notifier.shown.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn run_serialises_commands_and_player_signals() {
        let h = harness();
        let devices = h.devices.clone();
        let submitter = h.submitter.clone();
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (update_tx, mut update_rx) = watch::channel(h.session.snapshot());
        let task = tokio::spawn(h.session.run(cmd_rx, h.events, update_tx));

        cmd_tx.send(SessionCommand::SetTitle("Voice note".into())).await.unwrap();
        cmd_tx.send(SessionCommand::StartRecording).await.unwrap();
        cmd_tx.send(SessionCommand::StopRecording).await.unwrap();
        cmd_tx.send(SessionCommand::PlayAudio).await.unwrap();

        update_rx
            .wait_for(|s| s.attachments.player_held)
            .await
            .unwrap();
        devices.signal(PlayerSignal::Ready);
        update_rx
            .wait_for(|s| s.attachments.phase == AudioPhase::Playing)
            .await
            .unwrap();
        devices.signal(PlayerSignal::Completed);
        update_rx
            .wait_for(|s| s.attachments.phase == AudioPhase::Recorded && !s.attachments.player_held)
            .await
            .unwrap();

        cmd_tx.send(SessionCommand::Save).await.unwrap();
        let outcome = task.await.unwrap();
        match outcome {
            SessionOutcome::Saved(saved) => assert_eq!(saved.title, "Voice note"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(submitter.submitted.lock().unwrap().len(), 1);
        assert_eq!(devices.recorders_held(), 0);
        assert_eq!(devices.players_held(), 0);
    }

    #[tokio::test]
    async fn run_cancel_deletes_memo() {
        let h = harness();
        let devices = h.devices.clone();
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (update_tx, _update_rx) = watch::channel(h.session.snapshot());
        let task = tokio::spawn(h.session.run(cmd_rx, h.events, update_tx));

        cmd_tx.send(SessionCommand::StartRecording).await.unwrap();
        cmd_tx.send(SessionCommand::Cancel).await.unwrap();

        assert_eq!(task.await.unwrap(), SessionOutcome::Cancelled);
        let path = devices.last_output().unwrap();
        assert!(!path.exists());
        assert_eq!(devices.recorders_held(), 0);
    }

    #[tokio::test]
    async fn run_closed_channel_tears_down() {
        let h = harness();
        let devices = h.devices.clone();
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (update_tx, _update_rx) = watch::channel(h.session.snapshot());
        let task = tokio::spawn(h.session.run(cmd_rx, h.events, update_tx));

        cmd_tx.send(SessionCommand::StartRecording).await.unwrap();
        drop(cmd_tx);

        assert_eq!(task.await.unwrap(), SessionOutcome::Closed);
        assert_eq!(devices.recorders_held(), 0);
    }

    #[tokio::test]
    async fn run_stops_recording_at_cap() {
        let h = harness_with(
            MockSubmitter::default(),
            EditSessionConfig {
                max_recording: Duration::from_millis(10),
                ..fast_config()
            },
        );
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (update_tx, mut update_rx) = watch::channel(h.session.snapshot());
        let task = tokio::spawn(h.session.run(cmd_rx, h.events, update_tx));

        cmd_tx.send(SessionCommand::StartRecording).await.unwrap();
        update_rx
            .wait_for(|s| s.attachments.phase == AudioPhase::Recorded)
            .await
            .unwrap();

        cmd_tx.send(SessionCommand::Cancel).await.unwrap();
        assert_eq!(task.await.unwrap(), SessionOutcome::Cancelled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn slow_memo_encoding_leaves_runtime_responsive() {
        let h = harness();
        h.devices
            .script(|s| s.recorder_stop_delay = Some(StdDuration::from_millis(300)));
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (update_tx, mut update_rx) = watch::channel(h.session.snapshot());
        let task = tokio::spawn(h.session.run(cmd_rx, h.events, update_tx));

        cmd_tx.send(SessionCommand::StartRecording).await.unwrap();
        update_rx
            .wait_for(|s| s.attachments.recorder_held)
            .await
            .unwrap();

        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = tokio::spawn({
            let ticks = Arc::clone(&ticks);
            async move {
                loop {
                    tokio::time::sleep(StdDuration::from_millis(10)).await;
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        cmd_tx.send(SessionCommand::StopRecording).await.unwrap();
        update_rx
            .wait_for(|s| s.attachments.phase == AudioPhase::Recorded)
            .await
            .unwrap();
        ticker.abort();
        assert!(ticks.load(Ordering::SeqCst) >= 5);

        cmd_tx.send(SessionCommand::Cancel).await.unwrap();
        assert_eq!(task.await.unwrap(), SessionOutcome::Cancelled);
    }
}
