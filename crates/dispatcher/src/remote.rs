//! HttpRemote - reqwest client for the collection service

use contracts::{
    Batch, ContractError, Credential, CredentialEnvelope, PushAck, RemoteConfig, RemoteEndpoint,
    CREDENTIALS_PATH, SENSOR_GRID_PATH,
};
use reqwest::header::AUTHORIZATION;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::error::{DispatcherError, Result};

/// Collection service reached over HTTP(S)
///
/// No timeout is applied: a stalled call blocks the run.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base: String,
    authorization: Option<String>,
    client: reqwest::Client,
}

impl HttpRemote {
    /// Create a client for `host`
    ///
    /// `authorization` is presented on the credential endpoint only.
    pub fn new(host: &str, authorization: Option<String>) -> Result<Self> {
        let url = reqwest::Url::parse(host)
            .map_err(|e| DispatcherError::invalid_endpoint(host, e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DispatcherError::invalid_endpoint(
                host,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| DispatcherError::invalid_endpoint(host, e.to_string()))?;

        Ok(Self {
            base: host.trim_end_matches('/').to_string(),
            authorization,
            client,
        })
    }

    /// Create a client from the `[remote]` section
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        Self::new(&config.host, config.authorization.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        url: &str,
        response: Response,
    ) -> std::result::Result<T, ContractError> {
        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(ContractError::unauthorized(format!("{url} answered {status}")));
        }
        if !status.is_success() {
            return Err(ContractError::transport(url, format!("{url} answered {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ContractError::transport(url, e.to_string()))?;
        debug!(%status, bytes = body.len(), "Reply received");

        serde_json::from_slice(&body).map_err(|e| {
            ContractError::transport(url, format!("undecodable reply ({status}): {e}"))
        })
    }
}

impl RemoteEndpoint for HttpRemote {
    fn endpoint(&self) -> &str {
        &self.base
    }

    #[instrument(name = "http_remote_fetch_credentials", skip(self))]
    async fn fetch_credentials(&self) -> std::result::Result<CredentialEnvelope, ContractError> {
        let url = self.url(CREDENTIALS_PATH);
        let mut request = self.client.get(&url);
        if let Some(authorization) = &self.authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ContractError::transport(&url, e.to_string()))?;
        self.decode(&url, response).await
    }

    #[instrument(
        name = "http_remote_push_sensor_grids",
        skip(self, credential, batches),
        fields(batches = batches.len())
    )]
    async fn push_sensor_grids(
        &self,
        credential: &Credential,
        batches: &[Batch],
    ) -> std::result::Result<PushAck, ContractError> {
        let url = self.url(SENSOR_GRID_PATH);
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, &credential.token)
            .json(batches)
            .send()
            .await
            .map_err(|e| ContractError::transport(&url, e.to_string()))?;
        self.decode(&url, response).await
    }
}
