use qna_core::question::MapError;
use qna_core::validation::ValidationError;

/// Result of talking to the questions API
pub type ApiResult<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Cannot connect to the backend server at {base_url} ({reason}). Please check if it is running.")]
    Connectivity { base_url: String, reason: String },

    #[error("Server error: {status} - {message}")]
    Application { status: u16, message: String },

    #[error("Unexpected response from server: {0}")]
    DataShape(String),
}

impl From<MapError> for Error {
    fn from(err: MapError) -> Self {
        Error::DataShape(err.to_string())
    }
}

impl Error {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Error::Connectivity { .. })
    }
}
