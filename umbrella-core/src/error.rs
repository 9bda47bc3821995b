use thiserror::Error;

/// Failures that abort an umbrella check before a verdict is produced.
#[derive(Debug, Error)]
pub enum UmbrellaError {
    #[error("Invalid time format: '{0}'. Try something like '9 PM', '6:30 AM' or '14:00'.")]
    InvalidTimeFormat(String),

    #[error("Error fetching the location data for '{city}'")]
    LocationNotFound {
        city: String,
        status: Option<u16>,
        body: String,
    },

    #[error("Error fetching the weather forecast data")]
    ForecastFetchFailed { status: Option<u16>, body: String },
}

impl UmbrellaError {
    /// Raw `status body` line for fetch failures, if any.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            Self::InvalidTimeFormat(_) => None,
            Self::LocationNotFound { status, body, .. }
            | Self::ForecastFetchFailed { status, body } => Some(match status {
                Some(code) => format!("{code} {body}"),
                None => body.clone(),
            }),
        }
    }
}
