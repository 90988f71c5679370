use thiserror::Error;

/// Main error type for the Retrofilm library
#[derive(Error, Debug)]
pub enum RetrofilmError {
    #[error("Grade processing error: {0}")]
    Grade(#[from] GradeError),

    #[error("Overlay error: {0}")]
    Overlay(#[from] OverlayError),

    #[error("Light leak error: {0}")]
    Leak(#[from] LeakError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Grade-transform errors
#[derive(Error, Debug)]
pub enum GradeError {
    #[error("Frame buffer has invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Grade transform failed: {reason}")]
    TransformFailed { reason: String },
}

/// Overlay construction and compositing errors
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Failed to parse font: {reason}")]
    FontParseFailed { reason: String },

    #[error("No usable font found; searched: {searched}")]
    FontNotFound { searched: String },

    #[error("Overlay dimensions do not match frame: overlay {overlay:?}, frame {frame:?}")]
    DimensionMismatch {
        overlay: (u32, u32),
        frame: (u32, u32),
    },
}

/// Light-leak manager errors
#[derive(Error, Debug)]
pub enum LeakError {
    #[error("Leak directory not readable: {path}")]
    DirectoryUnreadable { path: String },

    #[error("Leak image failed to load: {path} - {reason}")]
    LoadFailed { path: String, reason: String },
}

/// Pipeline orchestration errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Frame size changed mid-video: expected {expected:?}, got {actual:?}")]
    FrameSizeChanged {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Frame processing failed: {reason}")]
    FrameProcessingFailed { reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using RetrofilmError
pub type Result<T> = std::result::Result<T, RetrofilmError>;

impl RetrofilmError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Overlay(OverlayError::FontNotFound { searched }) => {
                format!(
                    "No usable font was found (searched: {}). Pass one explicitly with --font.",
                    searched
                )
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
