use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RecorderError {
    #[error("Failed to connect to the recorder at {address}: {reason}")]
    ConnectionFailed { address: String, reason: String },
    #[error("The recorder is not connected")]
    NotConnected,
    #[error("Recorder request failed: {0}")]
    RequestFailed(String),
}

/// Capability surface of the remote recording backend. The wire protocol
/// behind it is owned by the backend implementation, not this crate.
#[async_trait]
pub trait RecorderBackend: Send {
    async fn connect(&mut self, address: &str, password: &str) -> Result<(), RecorderError>;
    async fn set_output_path(&mut self, path: &str) -> Result<(), RecorderError>;
    async fn start_recording(&mut self) -> Result<(), RecorderError>;
    async fn stop_recording(&mut self) -> Result<(), RecorderError>;
    async fn output_directory(&mut self) -> Result<PathBuf, RecorderError>;
}

/// Wrapper that tracks connection state and the recorder's believed
/// recording state, making connect/start/stop idempotent against repeated
/// requests.
pub struct RecorderClient<B> {
    backend: B,
    connected: bool,
    recording: bool,
}

impl<B: RecorderBackend> RecorderClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            connected: false,
            recording: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    #[cfg(test)]
    pub(crate) fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub async fn connect(&mut self, address: &str, password: &str) -> Result<(), RecorderError> {
        if self.connected {
            return Ok(());
        }

        self.backend.connect(address, password).await?;
        self.connected = true;
        tracing::info!(recorder_address = address, "Connected to the recorder");
        Ok(())
    }

    pub async fn set_output_path(&mut self, path: &str) -> Result<(), RecorderError> {
        if !self.connected {
            return Err(RecorderError::NotConnected);
        }

        self.backend.set_output_path(path).await
    }

    pub async fn start_recording(&mut self) -> Result<(), RecorderError> {
        if !self.connected {
            return Err(RecorderError::NotConnected);
        }

        if self.recording {
            tracing::debug!("Recorder already recording, start request skipped");
            return Ok(());
        }

        self.backend.start_recording().await?;
        self.recording = true;
        Ok(())
    }

    pub async fn stop_recording(&mut self) -> Result<(), RecorderError> {
        if !self.connected {
            return Err(RecorderError::NotConnected);
        }

        if !self.recording {
            tracing::debug!("Recorder not recording, stop request skipped");
            return Ok(());
        }

        self.backend.stop_recording().await?;
        self.recording = false;
        Ok(())
    }

    pub async fn output_directory(&mut self) -> Result<PathBuf, RecorderError> {
        if !self.connected {
            return Err(RecorderError::NotConnected);
        }

        self.backend.output_directory().await
    }
}
