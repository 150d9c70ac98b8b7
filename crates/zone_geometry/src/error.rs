use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZoneError {
    #[error("Mask buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    MaskDimensions {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ZoneError>;
