use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StatsError {
    /// Message recorded on a platform result when its fetch fails.
    ///
    /// A non-2xx response names the status; transport and body failures share
    /// one generic message.
    #[must_use]
    pub fn result_message(&self) -> String {
        match self {
            StatsError::UnexpectedStatus { status, .. } => {
                format!("API fetch failed (Status: {status})")
            }
            StatsError::Http(_) | StatsError::Deserialize { .. } => {
                "Failed to fetch data".to_string()
            }
        }
    }
}
