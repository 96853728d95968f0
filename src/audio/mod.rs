pub mod analysis;
pub mod capture;
pub mod device;
pub mod queue;
pub mod smoothing;

use thiserror::Error;

/// Capture-side failures. Everything except `NoDevicesFound` is recoverable:
/// the caller reports it and keeps (or restores) the previous source.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio devices found")]
    NoDevicesFound,

    #[error("'{0}' cannot capture audio (no input channels)")]
    NoInputChannels(String),

    #[error("failed to open '{name}': {source}")]
    DeviceOpenFailed {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("no capture device available for {0}")]
    DeviceSwitchUnavailable(String),
}

impl AudioError {
    pub(crate) fn open_failed(
        name: &str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::DeviceOpenFailed {
            name: name.to_string(),
            source: source.into(),
        }
    }
}
