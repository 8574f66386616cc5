//! Startup errors reported to the user before the terminal UI takes over

use thiserror::Error;

use crate::weather::FetchError;

#[derive(Error, Debug)]
pub enum HourcastError {
    /// A loaded setting failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP client for a weather endpoint could not be built
    #[error("Cannot set up the {endpoint} client: {source}")]
    Client {
        endpoint: &'static str,
        #[source]
        source: FetchError,
    },
}

impl HourcastError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn client(endpoint: &'static str, source: FetchError) -> Self {
        Self::Client { endpoint, source }
    }

    /// One-line explanation printed on stderr
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            HourcastError::Config(message) => {
                format!("{message}. Check the config file or HOURCAST_* variables.")
            }
            HourcastError::Client { endpoint, .. } => {
                format!("Could not initialise the {endpoint} HTTP client. Check TLS and proxy settings.")
            }
        }
    }
}
