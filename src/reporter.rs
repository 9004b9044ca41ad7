use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;

use crate::error::{Result, RevisionError};

const VAR_ENDPOINT: [&str; 3] = ["api", "v1", "var"];

pub trait Publisher {
    fn publish(&self, key: &str, value: &str) -> Result<()>;
}

/// Publishes variables to the coordination service over HTTP.
pub struct HttpPublisher {
    base_url: Url,
    client: Client,
}

impl HttpPublisher {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|err| {
            RevisionError::Config(format!(
                "invalid coordination service url \"{base_url}\" - {err}"
            ))
        })?;

        // The step blocks until the service answers
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|err| RevisionError::Reporting(format!("error creating http client - {err}")))?;

        Ok(Self { base_url, client })
    }
}

impl Publisher for HttpPublisher {
    fn publish(&self, key: &str, value: &str) -> Result<()> {
        let url = variable_url(&self.base_url, key)?;
        debug!("POST {}", url);

        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "text/plain")
            .body(value.to_string())
            .send()
            .map_err(|err| RevisionError::Reporting(format!("POST {url} failed - {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RevisionError::Reporting(format!(
                "setting revision var returned status {status}"
            )));
        }

        info!("published {}", key);
        Ok(())
    }
}

/// `{base_url}/api/v1/var?key={key}`, keeping any path prefix of `base_url`.
pub fn variable_url(base_url: &Url, key: &str) -> Result<Url> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| {
            RevisionError::Config(format!(
                "coordination service url \"{base_url}\" cannot be a base"
            ))
        })?
        .pop_if_empty()
        .extend(VAR_ENDPOINT);
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut().append_pair("key", key);
    Ok(url)
}
