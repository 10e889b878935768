//! Thin user-facing command layer for the chat/command collaborator. Every
//! function returns a human-readable message; failures never escape as
//! anything but a reportable string.

use crate::capture::CaptureLifecycleManager;
use crate::recorder::RecorderBackend;

pub fn help_text() -> &'static str {
    "Recording commands:\n\
     save      - move the pending temporary recording into its dungeon folder\n\
     discard   - delete the pending temporary recording\n\
     saveall   - toggle automatic saving of temporary recordings\n\
     temp      - toggle temporary recording mode"
}

pub fn toggle_save_all<B: RecorderBackend>(manager: &mut CaptureLifecycleManager<B>) -> String {
    if manager.toggle_save_all() {
        "Automatic saving enabled. Every temporary recording will be kept.".to_string()
    } else {
        "Automatic saving disabled. Use the save command to keep recordings.".to_string()
    }
}

pub fn toggle_temporary<B: RecorderBackend>(manager: &mut CaptureLifecycleManager<B>) -> String {
    if manager.toggle_temporary() {
        "Temporary recording mode enabled. Captures await a save decision.".to_string()
    } else {
        "Temporary recording mode disabled. Captures are saved directly.".to_string()
    }
}

pub async fn save_now<B: RecorderBackend>(
    manager: &mut CaptureLifecycleManager<B>,
) -> Result<String, String> {
    match manager.promote().await {
        Ok(destination) => Ok(format!("Recording saved to '{}'.", destination.display())),
        Err(error) => Err(error.to_string()),
    }
}

pub async fn discard_now<B: RecorderBackend>(manager: &mut CaptureLifecycleManager<B>) -> String {
    manager.discard_pending().await;
    "Pending temporary recording discarded.".to_string()
}
