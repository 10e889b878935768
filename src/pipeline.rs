use tokio::sync::mpsc;

use crate::capture::CaptureLifecycleManager;
use crate::encounter::EncounterTracker;
use crate::events::GameEvent;
use crate::recorder::RecorderBackend;

/// Drains the host's event channel and drives the tracker and lifecycle
/// manager, one event to completion before the next. Intent failures are
/// reported and never abort processing of subsequent events.
pub async fn run_capture_pipeline<B: RecorderBackend>(
    mut events: mpsc::UnboundedReceiver<GameEvent>,
    mut tracker: EncounterTracker,
    mut manager: CaptureLifecycleManager<B>,
) {
    while let Some(event) = events.recv().await {
        for intent in tracker.handle_event(&event) {
            if let Err(error) = manager.apply_intent(intent).await {
                tracing::error!(capture_error = %error, "Failed to execute capture intent");
            }
        }
    }

    tracing::debug!("Game event channel closed, capture pipeline stopped");
}
