use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub(crate) fn matches_temp_base_name(file_name: &str, base_name: &str) -> bool {
    let lower_file_name = file_name.to_ascii_lowercase();
    lower_file_name.starts_with(&base_name.to_ascii_lowercase())
}

/// Finds the most recently modified artifact in the temp directory whose
/// file name starts with the temp base name. A missing temp directory is
/// treated as "nothing pending", not an error.
pub(crate) fn find_latest_temp_artifact(
    temp_directory: &Path,
    base_name: &str,
) -> Result<Option<PathBuf>, String> {
    let directory_entries = match fs::read_dir(temp_directory) {
        Ok(entries) => entries,
        Err(error) => {
            if temp_directory.exists() {
                return Err(format!(
                    "Failed to read temporary recording directory '{}': {error}",
                    temp_directory.display()
                ));
            }
            return Ok(None);
        }
    };

    let mut latest_match: Option<(SystemTime, PathBuf)> = None;

    for entry_result in directory_entries {
        let entry = entry_result.map_err(|error| {
            format!(
                "Failed to read temporary recording directory '{}': {error}",
                temp_directory.display()
            )
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !matches_temp_base_name(file_name, base_name) {
            continue;
        }

        let modified_time = entry
            .metadata()
            .and_then(|metadata| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        if latest_match
            .as_ref()
            .map(|(latest_time, _)| modified_time > *latest_time)
            .unwrap_or(true)
        {
            latest_match = Some((modified_time, path));
        }
    }

    Ok(latest_match.map(|(_, path)| path))
}

/// Moves an artifact into its permanent location. Rename first; falls back
/// to copy-then-delete for cross-device moves. On failure the source file is
/// left in place so the promotion can be retried.
pub(crate) fn move_artifact(source: &Path, destination: &Path) -> Result<(), String> {
    if let Some(destination_directory) = destination.parent() {
        fs::create_dir_all(destination_directory).map_err(|error| {
            format!(
                "Failed to create recording directory '{}': {error}",
                destination_directory.display()
            )
        })?;
    }

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(rename_error) => {
            fs::copy(source, destination).map_err(|copy_error| {
                format!(
                    "Failed to move recording into place. rename error: {rename_error}; copy error: {copy_error}"
                )
            })?;
            if let Err(remove_error) = fs::remove_file(source) {
                tracing::warn!(
                    source_path = %source.display(),
                    "Failed to remove temporary recording after fallback copy: {remove_error}"
                );
            }
            Ok(())
        }
    }
}

/// Deletes every artifact matching the temp base name. Deletion failures are
/// logged and skipped; wiping the temp slot is never fatal.
pub(crate) fn wipe_temp_artifacts(temp_directory: &Path, base_name: &str) {
    let directory_entries = match fs::read_dir(temp_directory) {
        Ok(entries) => entries,
        Err(error) => {
            if temp_directory.exists() {
                tracing::warn!(
                    temp_directory = %temp_directory.display(),
                    "Failed to read temporary recording directory for wipe: {error}"
                );
            }
            return;
        }
    };

    for entry_result in directory_entries {
        let Ok(entry) = entry_result else {
            continue;
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !matches_temp_base_name(file_name, base_name) {
            continue;
        }

        if let Err(error) = fs::remove_file(&path) {
            tracing::warn!(
                artifact_path = %path.display(),
                "Failed to delete temporary recording: {error}"
            );
        }
    }
}
