use thiserror::Error;

/// Main error type for the ChainView system
#[derive(Error, Debug)]
pub enum CvError {
    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised by the quote-to-chart pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Unknown measure: {name}")]
    UnknownMeasure { name: String },

    /// Scale built over zero quotes. Recoverable: the scale falls back to a
    /// `[0, 1]` domain and reports this value instead of failing.
    #[error("Empty series domain for {scale} scale")]
    EmptySeriesDomain { scale: String },

    #[error("Invalid option kind: {value:?} (expected CALL or PUT)")]
    InvalidOptionKind { value: String },

    #[error("Invalid expiry date: {value:?} (expected YYYY-MM-DD)")]
    InvalidExpiryDate { value: String },
}

/// Chain retrieval and decoding errors
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Data source not found: {0}")]
    SourceNotFound(String),

    #[error("Invalid data source: {message}")]
    InvalidSource { message: String },

    #[error("Data loading failed: {message}")]
    LoadingFailed { message: String },

    #[error("Data parsing error: {message}")]
    ParseError { message: String },
}

/// Result type alias for ChainView operations
pub type CvResult<T> = Result<T, CvError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::CvError::Validation(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::CvError::Config(format!($($arg)*))
    };
}
