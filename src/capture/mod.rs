mod artifacts;
mod model;

pub use model::{ArtifactNaming, CaptureSession, PendingArtifact};

use std::path::PathBuf;

use crate::config::{RecorderConfig, RecordingFlags};
use crate::encounter::{CaptureContext, EndReason, Intent};
use crate::recorder::{RecorderBackend, RecorderClient, RecorderError};
use model::{TEMP_DIRECTORY_NAME, TEMP_RECORDING_BASE_NAME};

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to connect to the recorder: {0}")]
    ConnectionFailed(#[source] RecorderError),
    #[error("Failed to start recording: {0}")]
    StartFailed(#[source] RecorderError),
    #[error("Failed to stop recording: {0}")]
    StopFailed(#[source] RecorderError),
    #[error("Recorder rejected the output path '{path}': {source}")]
    OutputPathRejected {
        path: String,
        #[source]
        source: RecorderError,
    },
    #[error("Failed to query the recorder output directory: {0}")]
    OutputDirectoryUnavailable(#[source] RecorderError),
    #[error("No pending temporary recording to save")]
    NoPendingArtifact,
    #[error("Failed to move the recording to '{}': {reason}", .destination.display())]
    MoveFailed { destination: PathBuf, reason: String },
}

/// Executes capture intents against the recorder and manages the
/// temporary-artifact promotion/discard workflow. Holds at most one active
/// session and at most one pending artifact.
pub struct CaptureLifecycleManager<B: RecorderBackend> {
    recorder: RecorderClient<B>,
    recorder_config: RecorderConfig,
    flags: RecordingFlags,
    actor_name: String,
    session: Option<CaptureSession>,
    pending: Option<PendingArtifact>,
    // Guards against a second start request while one is in flight; a
    // BeginCapture arriving during a start is dropped, not queued.
    start_in_flight: bool,
}

impl<B: RecorderBackend> CaptureLifecycleManager<B> {
    pub fn new(
        backend: B,
        recorder_config: RecorderConfig,
        flags: RecordingFlags,
        actor_name: impl Into<String>,
    ) -> Self {
        Self {
            recorder: RecorderClient::new(backend),
            recorder_config,
            flags,
            actor_name: actor_name.into(),
            session: None,
            pending: None,
            start_in_flight: false,
        }
    }

    pub fn flags(&self) -> RecordingFlags {
        self.flags
    }

    pub fn toggle_save_all(&mut self) -> bool {
        self.flags.save_all = !self.flags.save_all;
        self.flags.save_all
    }

    pub fn toggle_temporary(&mut self) -> bool {
        self.flags.temporary = !self.flags.temporary;
        self.flags.temporary
    }

    pub fn has_active_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn has_pending_artifact(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_recorder_connected(&self) -> bool {
        self.recorder.is_connected()
    }

    pub async fn connect(&mut self) -> Result<(), CaptureError> {
        self.recorder
            .connect(&self.recorder_config.address, &self.recorder_config.password)
            .await
            .map_err(CaptureError::ConnectionFailed)
    }

    pub async fn apply_intent(&mut self, intent: Intent) -> Result<(), CaptureError> {
        match intent {
            Intent::BeginCapture(context) => self.on_begin_capture(&context).await,
            Intent::EndCapture(reason) => self.on_end_capture(reason).await,
            Intent::ResetEncounter => {
                tracing::debug!("Encounter reset acknowledged");
                Ok(())
            }
        }
    }

    /// Starts a capture for the given encounter context. Idempotent: a
    /// second begin while a session exists or a start is in flight is a
    /// side-effect-free success.
    pub async fn on_begin_capture(&mut self, context: &CaptureContext) -> Result<(), CaptureError> {
        if self.start_in_flight || self.session.is_some() {
            tracing::debug!("Capture already active, begin request dropped");
            return Ok(());
        }

        self.start_in_flight = true;
        let result = self.begin_capture_inner(context).await;
        self.start_in_flight = false;
        result
    }

    // The session is created only after every recorder call has succeeded,
    // so a failed start leaves no session behind and the next BeginCapture
    // gets a clean attempt.
    async fn begin_capture_inner(&mut self, context: &CaptureContext) -> Result<(), CaptureError> {
        if !self.recorder.is_connected() {
            self.connect().await?;
        }

        let naming = ArtifactNaming::compose(context, &self.actor_name);
        let is_temporary = self.flags.temporary;
        let target_path = if is_temporary {
            // The temp slot is last-write-wins: a new temporary capture
            // replaces any unsaved artifact still sitting there.
            self.discard_pending().await;
            ArtifactNaming::temporary_target_path()
        } else {
            naming.permanent_target_path()
        };

        self.recorder
            .set_output_path(&target_path)
            .await
            .map_err(|source| CaptureError::OutputPathRejected {
                path: target_path.clone(),
                source,
            })?;
        self.recorder
            .start_recording()
            .await
            .map_err(CaptureError::StartFailed)?;

        tracing::info!(
            boss_name = %naming.boss_name,
            dungeon_name = %naming.dungeon_name,
            target_path = %target_path,
            temporary = is_temporary,
            "Recording started"
        );

        self.session = Some(CaptureSession {
            target_path,
            is_temporary,
            naming,
        });
        Ok(())
    }

    /// Stops the active capture. No-op without a session; a failed stop
    /// leaves the session active so a retry remains meaningful.
    pub async fn on_end_capture(&mut self, reason: EndReason) -> Result<(), CaptureError> {
        if self.session.is_none() {
            tracing::debug!(?reason, "No active capture, end request dropped");
            return Ok(());
        }

        self.recorder
            .stop_recording()
            .await
            .map_err(CaptureError::StopFailed)?;

        let Some(session) = self.session.take() else {
            return Ok(());
        };
        tracing::info!(?reason, target_path = %session.target_path, "Recording stopped");

        if !session.is_temporary {
            return Ok(());
        }

        self.pending = Some(PendingArtifact {
            dungeon_name: session.naming.dungeon_name.clone(),
            file_stem: session.naming.file_stem.clone(),
        });

        if self.flags.save_all {
            self.promote().await?;
        } else {
            tracing::info!("Temporary recording finished and pending a save decision");
        }

        Ok(())
    }

    /// Promotes the newest temporary artifact into its permanent
    /// dungeon-named directory under the composed file name, preserving the
    /// artifact's original extension. The temp file is left untouched on
    /// failure so the promotion can be retried.
    pub async fn promote(&mut self) -> Result<PathBuf, CaptureError> {
        let output_root = self
            .recorder
            .output_directory()
            .await
            .map_err(CaptureError::OutputDirectoryUnavailable)?;
        let temp_directory = output_root.join(TEMP_DIRECTORY_NAME);

        let artifact =
            artifacts::find_latest_temp_artifact(&temp_directory, TEMP_RECORDING_BASE_NAME)
                .map_err(|reason| CaptureError::MoveFailed {
                    destination: temp_directory.clone(),
                    reason,
                })?
                .ok_or(CaptureError::NoPendingArtifact)?;

        // A stray temp file from a previous run has no recorded context;
        // sentinel names still let the user rescue it.
        let (dungeon_name, file_stem) = match self.pending.as_ref() {
            Some(pending) => (pending.dungeon_name.clone(), pending.file_stem.clone()),
            None => {
                let naming = ArtifactNaming::compose(
                    &CaptureContext {
                        boss_name: crate::catalog::UNKNOWN_BOSS.to_string(),
                        dungeon_name: crate::catalog::UNKNOWN_DUNGEON.to_string(),
                    },
                    &self.actor_name,
                );
                (naming.dungeon_name, naming.file_stem)
            }
        };

        let extension = artifact
            .extension()
            .and_then(|value| value.to_str())
            .map(|value| format!(".{value}"))
            .unwrap_or_default();
        let destination = output_root
            .join(&dungeon_name)
            .join(format!("{file_stem}{extension}"));

        artifacts::move_artifact(&artifact, &destination).map_err(|reason| {
            CaptureError::MoveFailed {
                destination: destination.clone(),
                reason,
            }
        })?;

        self.pending = None;
        tracing::info!(destination = %destination.display(), "Recording saved");
        Ok(destination)
    }

    /// Drops the pending artifact and deletes its temp files. Deletion
    /// failures are logged, never fatal.
    pub async fn discard_pending(&mut self) {
        self.pending = None;

        match self.recorder.output_directory().await {
            Ok(output_root) => {
                artifacts::wipe_temp_artifacts(
                    &output_root.join(TEMP_DIRECTORY_NAME),
                    TEMP_RECORDING_BASE_NAME,
                );
            }
            Err(error) => {
                tracing::warn!(
                    recorder_error = %error,
                    "Failed to resolve the temp directory for discard"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CaptureError, CaptureLifecycleManager};
    use crate::config::{RecorderConfig, RecordingFlags};
    use crate::encounter::{CaptureContext, EndReason};
    use crate::recorder::testing::ScriptedRecorder;
    use std::path::{Path, PathBuf};

    fn sample_context() -> CaptureContext {
        CaptureContext {
            boss_name: "Borugarm".to_string(),
            dungeon_name: "Ruinous Manor".to_string(),
        }
    }

    fn manager_with_flags(
        output_root: &Path,
        flags: RecordingFlags,
    ) -> CaptureLifecycleManager<ScriptedRecorder> {
        CaptureLifecycleManager::new(
            ScriptedRecorder::new(output_root.to_path_buf()),
            RecorderConfig::default(),
            flags,
            "Elleon",
        )
    }

    fn recorded_calls(manager: &CaptureLifecycleManager<ScriptedRecorder>) -> Vec<String> {
        manager.recorder.backend().calls()
    }

    fn write_temp_artifact(output_root: &Path) -> PathBuf {
        let temp_directory = output_root.join("Temp");
        std::fs::create_dir_all(&temp_directory).expect("Failed to create temp directory");
        let artifact = temp_directory.join("PendingEncounter.mkv");
        std::fs::write(&artifact, b"capture").expect("Failed to write temp artifact");
        artifact
    }

    #[tokio::test]
    async fn begin_capture_connects_sets_path_and_starts() {
        let workspace = tempfile::tempdir().expect("Failed to create test workspace");
        let mut manager = manager_with_flags(workspace.path(), RecordingFlags::default());

        manager
            .on_begin_capture(&sample_context())
            .await
            .expect("Expected capture start to succeed");

        assert!(manager.has_active_session());
        let calls = recorded_calls(&manager);
        assert!(calls[0].starts_with("connect "));
        assert!(
            calls[1].starts_with("set_output_path Ruinous Manor/Borugarm_Elleon_"),
            "Unexpected output path call: {}",
            calls[1]
        );
        assert_eq!(calls[2], "start_recording");
    }

    #[tokio::test]
    async fn repeated_begin_capture_is_dropped_while_session_active() {
        let workspace = tempfile::tempdir().expect("Failed to create test workspace");
        let mut manager = manager_with_flags(workspace.path(), RecordingFlags::default());

        manager
            .on_begin_capture(&sample_context())
            .await
            .expect("Expected first capture start to succeed");
        manager
            .on_begin_capture(&sample_context())
            .await
            .expect("Expected duplicate begin to be a no-op");

        let start_calls = recorded_calls(&manager)
            .iter()
            .filter(|call| call.as_str() == "start_recording")
            .count();
        assert_eq!(start_calls, 1, "Duplicate begin must not reach the recorder");
    }

    #[tokio::test]
    async fn failed_start_rolls_back_to_no_session() {
        let workspace = tempfile::tempdir().expect("Failed to create test workspace");
        let mut manager = manager_with_flags(workspace.path(), RecordingFlags::default());
        manager.recorder.backend_mut().fail_start = true;

        let result = manager.on_begin_capture(&sample_context()).await;

        assert!(matches!(result, Err(CaptureError::StartFailed(_))));
        assert!(!manager.has_active_session());

        // The next attempt gets a clean start.
        manager.recorder.backend_mut().fail_start = false;
        manager
            .on_begin_capture(&sample_context())
            .await
            .expect("Expected retried capture start to succeed");
        assert!(manager.has_active_session());
    }

    #[tokio::test]
    async fn connection_failure_is_reported_and_retried_on_next_begin() {
        let workspace = tempfile::tempdir().expect("Failed to create test workspace");
        let mut manager = manager_with_flags(workspace.path(), RecordingFlags::default());
        manager.recorder.backend_mut().fail_connect = true;

        let result = manager.on_begin_capture(&sample_context()).await;
        assert!(matches!(result, Err(CaptureError::ConnectionFailed(_))));
        assert!(!manager.is_recorder_connected());

        manager.recorder.backend_mut().fail_connect = false;
        manager
            .on_begin_capture(&sample_context())
            .await
            .expect("Expected capture start after reconnect to succeed");
        assert!(manager.is_recorder_connected());
    }

    #[tokio::test]
    async fn end_capture_without_session_is_a_noop() {
        let workspace = tempfile::tempdir().expect("Failed to create test workspace");
        let mut manager = manager_with_flags(workspace.path(), RecordingFlags::default());

        manager
            .on_end_capture(EndReason::BossKilled)
            .await
            .expect("Expected end without session to succeed");

        assert!(recorded_calls(&manager).is_empty());
    }

    #[tokio::test]
    async fn failed_stop_keeps_session_active_for_retry() {
        let workspace = tempfile::tempdir().expect("Failed to create test workspace");
        let mut manager = manager_with_flags(workspace.path(), RecordingFlags::default());
        manager
            .on_begin_capture(&sample_context())
            .await
            .expect("Expected capture start to succeed");

        manager.recorder.backend_mut().fail_stop = true;
        let result = manager.on_end_capture(EndReason::BossKilled).await;
        assert!(matches!(result, Err(CaptureError::StopFailed(_))));
        assert!(
            manager.has_active_session(),
            "A failed stop must leave the session active"
        );

        manager.recorder.backend_mut().fail_stop = false;
        manager
            .on_end_capture(EndReason::BossKilled)
            .await
            .expect("Expected retried stop to succeed");
        assert!(!manager.has_active_session());
    }

    #[tokio::test]
    async fn temporary_capture_ends_pending_and_promotes_on_save() {
        let workspace = tempfile::tempdir().expect("Failed to create test workspace");
        let flags = RecordingFlags {
            temporary: true,
            save_all: false,
        };
        let mut manager = manager_with_flags(workspace.path(), flags);

        manager
            .on_begin_capture(&sample_context())
            .await
            .expect("Expected temporary capture start to succeed");
        assert!(recorded_calls(&manager)
            .iter()
            .any(|call| call == "set_output_path Temp/PendingEncounter"));

        write_temp_artifact(workspace.path());
        manager
            .on_end_capture(EndReason::BossKilled)
            .await
            .expect("Expected temporary capture stop to succeed");
        assert!(manager.has_pending_artifact());

        let destination = manager
            .promote()
            .await
            .expect("Expected promotion to succeed");

        assert!(destination.starts_with(workspace.path().join("Ruinous Manor")));
        let destination_name = destination
            .file_name()
            .and_then(|name| name.to_str())
            .expect("Expected destination file name");
        assert!(destination_name.starts_with("Borugarm_Elleon_"));
        assert!(destination_name.ends_with(".mkv"), "Original extension must be preserved");
        assert!(destination.exists());
        assert!(
            !workspace.path().join("Temp/PendingEncounter.mkv").exists(),
            "Promoted artifact must leave the temp slot"
        );
        assert!(!manager.has_pending_artifact());
    }

    #[tokio::test]
    async fn save_all_promotes_automatically_when_capture_ends() {
        let workspace = tempfile::tempdir().expect("Failed to create test workspace");
        let flags = RecordingFlags {
            temporary: true,
            save_all: true,
        };
        let mut manager = manager_with_flags(workspace.path(), flags);

        manager
            .on_begin_capture(&sample_context())
            .await
            .expect("Expected temporary capture start to succeed");
        write_temp_artifact(workspace.path());
        manager
            .on_end_capture(EndReason::BossKilled)
            .await
            .expect("Expected stop with automatic save to succeed");

        let saved = std::fs::read_dir(workspace.path().join("Ruinous Manor"))
            .expect("Expected dungeon directory after automatic save")
            .count();
        assert_eq!(saved, 1);
        assert!(!manager.has_pending_artifact());
    }

    #[tokio::test]
    async fn failed_move_leaves_temp_artifact_in_place_for_retry() {
        let workspace = tempfile::tempdir().expect("Failed to create test workspace");
        let flags = RecordingFlags {
            temporary: true,
            save_all: false,
        };
        let mut manager = manager_with_flags(workspace.path(), flags);

        manager
            .on_begin_capture(&sample_context())
            .await
            .expect("Expected temporary capture start to succeed");
        let artifact = write_temp_artifact(workspace.path());
        manager
            .on_end_capture(EndReason::BossKilled)
            .await
            .expect("Expected temporary capture stop to succeed");

        // A file squatting on the dungeon directory name makes the move fail.
        let blocking_file = workspace.path().join("Ruinous Manor");
        std::fs::write(&blocking_file, b"in the way").expect("Failed to write blocking file");

        let result = manager.promote().await;
        assert!(matches!(result, Err(CaptureError::MoveFailed { .. })));
        assert!(
            artifact.exists(),
            "A failed move must leave the temp artifact untouched for retry"
        );
        assert!(
            manager.has_pending_artifact(),
            "A failed move must keep the pending save decision"
        );

        std::fs::remove_file(&blocking_file).expect("Failed to remove blocking file");
        let destination = manager
            .promote()
            .await
            .expect("Expected retried promotion to succeed");

        assert!(destination.exists());
        assert!(!artifact.exists(), "The retry must claim the temp artifact");
        assert!(!manager.has_pending_artifact());
    }

    #[tokio::test]
    async fn promote_with_empty_temp_directory_reports_no_pending_artifact() {
        let workspace = tempfile::tempdir().expect("Failed to create test workspace");
        let mut manager = manager_with_flags(workspace.path(), RecordingFlags::default());
        manager.connect().await.expect("Expected connect to succeed");

        let result = manager.promote().await;

        assert!(matches!(result, Err(CaptureError::NoPendingArtifact)));
        assert!(
            !workspace.path().join("Temp").exists(),
            "A failed save must not create directories"
        );
    }

    #[tokio::test]
    async fn new_temporary_capture_wipes_previous_unsaved_artifact() {
        let workspace = tempfile::tempdir().expect("Failed to create test workspace");
        let flags = RecordingFlags {
            temporary: true,
            save_all: false,
        };
        let mut manager = manager_with_flags(workspace.path(), flags);

        manager
            .on_begin_capture(&sample_context())
            .await
            .expect("Expected first temporary capture to start");
        let first_artifact = write_temp_artifact(workspace.path());
        manager
            .on_end_capture(EndReason::BossKilled)
            .await
            .expect("Expected first temporary capture to stop");
        assert!(manager.has_pending_artifact());

        // Starting the next temporary capture claims the temp slot.
        manager
            .on_begin_capture(&sample_context())
            .await
            .expect("Expected second temporary capture to start");

        assert!(
            !first_artifact.exists(),
            "The unsaved artifact must be wiped before a new temporary capture"
        );
        assert!(!manager.has_pending_artifact());
    }

    #[tokio::test]
    async fn stray_temp_artifact_promotes_with_sentinel_names() {
        let workspace = tempfile::tempdir().expect("Failed to create test workspace");
        let mut manager = manager_with_flags(workspace.path(), RecordingFlags::default());
        manager.connect().await.expect("Expected connect to succeed");
        write_temp_artifact(workspace.path());

        let destination = manager
            .promote()
            .await
            .expect("Expected stray artifact promotion to succeed");

        assert!(destination.starts_with(workspace.path().join("UnknownDungeon")));
        let destination_name = destination
            .file_name()
            .and_then(|name| name.to_str())
            .expect("Expected destination file name");
        assert!(destination_name.starts_with("UnknownBoss_Elleon_"));
    }
}
