// ── Kismet REST source ──
//
// Live snapshots from a Kismet server's device view. Kismet reports
// client devices only, so access point lists are always empty.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::anonymize::MacAnonymizer;
use crate::error::CoreError;
use crate::model::Snapshot;

use super::{SnapshotSource, decode_snapshot};

/// Device view, relative to the server's base URL.
pub const DEVICES_PATH: &str = "devices/views/all/devices.json";

const SESSION_HEADER: &str = "kismet";

/// Polls `{api_url}/devices/views/all/devices.json` with the session key
/// in the `Kismet: sessionid=<key>` header.
#[derive(Debug)]
pub struct KismetSource {
    http: reqwest::Client,
    devices_url: Url,
    anonymizer: Option<MacAnonymizer>,
}

impl KismetSource {
    /// Build a client for `base_url`, authenticating with `api_key` when
    /// one is given.
    pub fn new(
        base_url: &str,
        api_key: Option<&SecretString>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let mut session = HeaderValue::from_str(&format!("sessionid={}", key.expose_secret()))
                .map_err(|e| CoreError::Authentication {
                    message: format!("invalid API key header value: {e}"),
                })?;
            session.set_sensitive(true);
            headers.insert(SESSION_HEADER, session);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("airwatch/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, CoreError> {
        Ok(Self {
            http,
            devices_url: devices_url(base_url)?,
            anonymizer: None,
        })
    }

    /// Replace device MACs with daily-salted identifiers on load.
    pub fn with_anonymizer(mut self, anonymizer: MacAnonymizer) -> Self {
        self.anonymizer = Some(anonymizer);
        self
    }

    pub fn devices_url(&self) -> &Url {
        &self.devices_url
    }
}

impl SnapshotSource for KismetSource {
    async fn load(&self) -> Result<Snapshot, CoreError> {
        debug!(url = %self.devices_url, "fetching kismet devices");
        let resp = self.http.get(self.devices_url.clone()).send().await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CoreError::Authentication {
                message: format!("Kismet returned {status}; check the API key"),
            });
        }
        if !status.is_success() {
            return Err(CoreError::Snapshot {
                path: self.devices_url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let body = resp.bytes().await?;
        decode_snapshot(&body, self.devices_url.as_str(), self.anonymizer.as_ref())
    }
}

/// Join the device view onto `base_url`, keeping any path prefix the
/// server is mounted under.
fn devices_url(base_url: &str) -> Result<Url, CoreError> {
    let mut url = Url::parse(base_url)?;
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    url.join(DEVICES_PATH).map_err(CoreError::from)
}
