mod capture;
mod catalog;
mod commands;
mod config;
mod encounter;
mod events;
mod pipeline;
mod recorder;

pub use capture::{
    ArtifactNaming, CaptureError, CaptureLifecycleManager, CaptureSession, PendingArtifact,
};
pub use catalog::{
    load_reference_catalog, CatalogError, MonsterEntry, MonsterRecord, ReferenceCatalog,
    ZoneRecord, UNKNOWN_BOSS, UNKNOWN_DUNGEON,
};
pub use commands::{discard_now, help_text, save_now, toggle_save_all, toggle_temporary};
pub use config::{
    load_or_create_config, write_config, Config, ConfigError, RecorderConfig, RecordingFlags,
};
pub use encounter::{CaptureContext, EncounterState, EncounterTracker, EndReason, Intent};
pub use events::{CombatStatus, EntityId, GameEvent};
pub use pipeline::run_capture_pipeline;
pub use recorder::{RecorderBackend, RecorderClient, RecorderError};
