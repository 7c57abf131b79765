#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Data directory not found")]
    NoDataDir,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("API returned a false response: {0}")]
    FalseResponse(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Analytics store error: {0}")]
    Analytics(String),

    #[error("TMDB API key is not configured")]
    MissingApiKey,
}

pub const FETCH_FAILED_MESSAGE: &str = "Error fetching movies. Please try again later.";

impl Error {
    /// Text shown to the user when a movie list fetch fails.
    ///
    /// A false response carries its own message; every other failure collapses
    /// into the generic one.
    pub fn user_message(&self) -> String {
        match self {
            Error::FalseResponse(msg) => msg.clone(),
            _ => FETCH_FAILED_MESSAGE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
