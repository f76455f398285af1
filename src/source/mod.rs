use reqwest::{StatusCode, blocking::Client, header::ACCEPT};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

mod config;
pub mod models;
pub use config::*;
pub use models::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GET {url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything able to resolve a URL to a JSON document.
pub trait JsonSource {
    fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, self::Error>;
}

/// Blocking HTTP source, one request per call.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(config: &self::Config) -> Result<Self, self::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

impl JsonSource for HttpSource {
    fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, self::Error> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(self::Error::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes()?;
        Ok(serde_json::from_slice(&body)?)
    }
}
