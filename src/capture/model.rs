use crate::encounter::CaptureContext;

/// Directory under the recorder output root that holds provisional captures.
pub(crate) const TEMP_DIRECTORY_NAME: &str = "Temp";
/// Fixed base name for temporary artifacts so they can be found again at
/// promotion time. The recorder appends its own container extension.
pub(crate) const TEMP_RECORDING_BASE_NAME: &str = "PendingEncounter";

/// One active recording correlated with an encounter. Created when a
/// BeginCapture intent is accepted, destroyed once the artifact is finalized,
/// left pending, or discarded.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    pub target_path: String,
    pub is_temporary: bool,
    pub naming: ArtifactNaming,
}

/// A finished temporary capture awaiting an explicit save or discard.
#[derive(Debug, Clone)]
pub struct PendingArtifact {
    pub dungeon_name: String,
    pub file_stem: String,
}

/// Name components resolved at capture start; reused verbatim when a
/// temporary artifact is promoted later.
#[derive(Debug, Clone)]
pub struct ArtifactNaming {
    pub boss_name: String,
    pub dungeon_name: String,
    pub file_stem: String,
}

impl ArtifactNaming {
    pub(crate) fn compose(context: &CaptureContext, actor_name: &str) -> Self {
        let timestamp = artifact_timestamp();
        let boss_name = sanitize_path_component(&context.boss_name);
        let dungeon_name = sanitize_path_component(&context.dungeon_name);
        let actor = sanitize_path_component(actor_name);
        let file_stem = format!("{boss_name}_{actor}_{timestamp}");

        Self {
            boss_name,
            dungeon_name,
            file_stem,
        }
    }

    pub(crate) fn permanent_target_path(&self) -> String {
        format!("{}/{}", self.dungeon_name, self.file_stem)
    }

    pub(crate) fn temporary_target_path() -> String {
        format!("{TEMP_DIRECTORY_NAME}/{TEMP_RECORDING_BASE_NAME}")
    }
}

// ISO-8601 UTC with ':' and '.' replaced so the stamp is valid in file names.
fn artifact_timestamp() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

fn sanitize_path_component(value: &str) -> String {
    let sanitized: String = value
        .chars()
        .map(|character| match character {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            other => other,
        })
        .collect();

    let trimmed = sanitized.trim();
    if trimmed.is_empty() {
        "Unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{ArtifactNaming, sanitize_path_component};
    use crate::encounter::CaptureContext;

    #[test]
    fn composes_boss_actor_timestamp_file_stem() {
        let naming = ArtifactNaming::compose(
            &CaptureContext {
                boss_name: "Borugarm".to_string(),
                dungeon_name: "Ruinous Manor".to_string(),
            },
            "Elleon",
        );

        assert!(naming.file_stem.starts_with("Borugarm_Elleon_"));
        assert!(
            !naming.file_stem.contains(':') && !naming.file_stem.contains('.'),
            "Timestamp must be sanitized for file names, got '{}'",
            naming.file_stem
        );
        assert_eq!(
            naming.permanent_target_path(),
            format!("Ruinous Manor/{}", naming.file_stem)
        );
    }

    #[test]
    fn sanitizes_path_hostile_name_characters() {
        assert_eq!(
            sanitize_path_component("Kelsaik: Nest/Keeper"),
            "Kelsaik- Nest-Keeper"
        );
        assert_eq!(sanitize_path_component("  "), "Unnamed");
    }

    #[test]
    fn temporary_target_path_uses_fixed_slot() {
        assert_eq!(
            ArtifactNaming::temporary_target_path(),
            "Temp/PendingEncounter"
        );
    }
}
