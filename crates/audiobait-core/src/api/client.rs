//! HTTP client for the device backend.
//!
//! The client authenticates once on [`ApiClient::connect`] and attaches
//! the resulting token to every later request. Re-authenticating after
//! the token expires is left to the caller via [`ApiClient::authenticate`].

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use url::Url;

use super::error::{is_http_success, ApiError};
use super::types::{FileResponse, TokenResponse};
use crate::playlist::SoundId;
use crate::storage::ApiConfig;

/// Default timeout for every HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Authenticated backend client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    server_url: String,
    device_name: String,
    password: String,
    token: String,
}

impl ApiClient {
    /// Build a client and obtain a fresh token.
    pub async fn connect(
        server_url: &str,
        device_name: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        Url::parse(server_url)
            .map_err(|e| ApiError::permanent(format!("invalid server url '{server_url}': {e}")))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::permanent(format!("http client: {e}")))?;

        let mut api = Self {
            http,
            server_url: server_url.trim_end_matches('/').to_string(),
            device_name: device_name.to_string(),
            password: password.to_string(),
            token: String::new(),
        };
        api.authenticate().await?;
        Ok(api)
    }

    /// [`connect`](Self::connect) using the `[api]` config section.
    pub async fn from_config(settings: &ApiConfig) -> Result<Self, ApiError> {
        Self::connect(
            &settings.server_url,
            &settings.device_name,
            &settings.password,
            settings.timeout(),
        )
        .await
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Exchange the device credentials for a new token.
    pub async fn authenticate(&mut self) -> Result<(), ApiError> {
        if self.password.is_empty() {
            return Err(ApiError::permanent("no password set"));
        }

        let body = json!({
            "devicename": self.device_name,
            "password": self.password,
        });
        let resp = self
            .http
            .post(self.endpoint("/authenticate_device")?)
            .json(&body)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let token: TokenResponse = resp.json().await?;
        if !token.success {
            return Err(ApiError::permanent(format!(
                "authentication failed: {}",
                token.message()
            )));
        }
        self.token = token.token;
        tracing::debug!(device = %self.device_name, "authenticated with backend");
        Ok(())
    }

    /// Post an event with one or more occurrence times.
    ///
    /// `details` must be a JSON object; a `dateTimes` array is added to it.
    pub async fn report_event(
        &self,
        details: &Value,
        times: &[DateTime<Utc>],
    ) -> Result<(), ApiError> {
        let mut payload = details.clone();
        let obj = payload
            .as_object_mut()
            .ok_or_else(|| ApiError::permanent("event details must be a JSON object"))?;
        let date_times: Vec<String> = times.iter().map(|t| format_timestamp(*t)).collect();
        obj.insert("dateTimes".into(), json!(date_times));

        let resp = self
            .http
            .post(self.endpoint("/api/v1/events")?)
            .header(AUTHORIZATION, &self.token)
            .json(&payload)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    /// Fetch the device's audio schedule document.
    pub async fn schedule(&self) -> Result<Value, ApiError> {
        let resp = self
            .http
            .get(self.endpoint("/api/v1/schedules")?)
            .header(AUTHORIZATION, &self.token)
            .send()
            .await?;
        Ok(check_status(resp).await?.json().await?)
    }

    /// Look up metadata and a download token for a sound file.
    pub async fn file_details(&self, file_id: SoundId) -> Result<FileResponse, ApiError> {
        let resp = self
            .http
            .get(self.endpoint(&format!("/api/v1/files/{file_id}"))?)
            .header(AUTHORIZATION, &self.token)
            .send()
            .await?;
        Ok(check_status(resp).await?.json().await?)
    }

    /// Download a file described by [`file_details`](Self::file_details) to `path`.
    ///
    /// Does nothing if `path` already exists. A partial file is removed
    /// if the transfer fails.
    pub async fn download_file(&self, file: &FileResponse, path: &Path) -> Result<(), ApiError> {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Ok(());
        }

        let url = Url::parse_with_params(
            self.endpoint("/api/v1/signedUrl")?.as_str(),
            &[("jwt", file.jwt.as_str())],
        )
        .map_err(|e| ApiError::permanent(format!("invalid download url: {e}")))?;
        let resp = check_status(self.http.get(url).send().await?).await?;

        let result = write_body(resp, path).await;
        if result.is_err() {
            let _ = tokio::fs::remove_file(path).await;
        }
        result
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.server_url, path);
        Url::parse(&raw).map_err(|e| ApiError::permanent(format!("invalid url '{raw}': {e}")))
    }
}

/// Pass 2xx responses through; turn anything else into a classified error.
async fn check_status(resp: Response) -> Result<Response, ApiError> {
    let code = resp.status().as_u16();
    if is_http_success(code) {
        return Ok(resp);
    }
    match resp.text().await {
        Ok(body) => Err(ApiError::from_status(code, &body)),
        Err(e) => Err(ApiError::temporary(format!(
            "request failed ({code}) and body read failed: {e}"
        ))),
    }
}

async fn write_body(mut resp: Response, path: &Path) -> Result<(), ApiError> {
    let io_err = |e: std::io::Error| ApiError::permanent(format!("write {}: {e}", path.display()));
    let mut out = tokio::fs::File::create(path).await.map_err(io_err)?;
    while let Some(chunk) = resp.chunk().await? {
        out.write_all(&chunk).await.map_err(io_err)?;
    }
    out.flush().await.map_err(io_err)?;
    Ok(())
}

fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}
