use crate::{ChecksumSource, FetchConfig, RemoteError, RetryPolicy};
use relcat_schema::Sha256Digest;
use std::io::Read;

/// Fetches `.sha256` sidecars over blocking HTTP.
///
/// Each request is bounded by the configured timeout and redirects are
/// followed. Gateway errors are retried according to the [`RetryPolicy`].
pub struct HttpChecksumSource {
    config: FetchConfig,
    policy: RetryPolicy,
    agent: ureq::Agent,
}

impl HttpChecksumSource {
    pub fn new(config: FetchConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .build();
        let agent = ureq::Agent::new_with_config(agent_config);
        let policy = config.retry_policy();
        Self {
            config,
            policy,
            agent,
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn do_get(&self, url: &str) -> Result<String, RemoteError> {
        let mut req = self
            .agent
            .get(url)
            .header("User-Agent", concat!("relcat/", env!("CARGO_PKG_VERSION")));
        if let Some(ref token) = self.config.auth_token {
            req = req.header("Authorization", &format!("Bearer {token}"));
        }
        let resp = match req.call() {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(404)) => {
                return Err(RemoteError::NotFound(url.to_owned()));
            }
            Err(ureq::Error::StatusCode(code)) => {
                return Err(RemoteError::Status {
                    code,
                    url: url.to_owned(),
                });
            }
            Err(e) => {
                return Err(RemoteError::Http(e.to_string()));
            }
        };

        let code = resp.status().as_u16();
        if code == 404 {
            return Err(RemoteError::NotFound(url.to_owned()));
        }
        if code >= 400 {
            return Err(RemoteError::Status {
                code,
                url: url.to_owned(),
            });
        }

        let mut reader = resp.into_body().into_reader();
        let mut body = String::new();
        reader.read_to_string(&mut body)?;
        Ok(body)
    }
}

impl ChecksumSource for HttpChecksumSource {
    fn fetch_checksum(&self, url: &str) -> Result<Sha256Digest, RemoteError> {
        let body = self.policy.run(url, |attempt| {
            tracing::debug!("GET {url} (attempt {attempt})");
            self.do_get(url)
        })?;
        Sha256Digest::from_sidecar(&body).ok_or_else(|| RemoteError::EmptyChecksum(url.to_owned()))
    }
}
