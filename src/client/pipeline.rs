//! Per-request pipeline: credential injection, expiry detection, replay.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{status_to_error, Result};

use super::Client;

impl Client {
    /// Send a request through the authenticated pipeline.
    ///
    /// Requests to `/auth/` endpoints pass through untouched. All other
    /// requests carry `Authorization: Bearer <token>` when a credential
    /// is stored and go out anonymously when not.
    ///
    /// A 401 response triggers one coordinated refresh and at most one
    /// replay; whatever the replay returns is the final outcome. When the
    /// refresh fails, the original 401 response is returned (the
    /// coordinator has already cleared the session by then). Transport
    /// errors and non-401 responses propagate unchanged and never start
    /// a refresh.
    pub async fn execute(&self, mut request: Request) -> Result<Response> {
        if self.config.is_auth_endpoint(request.url()) {
            return Ok(self.http.execute(request).await?);
        }

        // Cloned before the first send; a streaming body cannot be
        // replayed and keeps its 401 as the final outcome.
        let retry = request.try_clone();

        if let Some(credential) = self.store.load()? {
            attach_bearer(&mut request, &credential.access_token);
        }

        let response = self.http.execute(request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(mut retry) = retry else {
            debug!("401 on a request without a replayable body");
            return Ok(response);
        };

        match self.coordinator.refresh().await {
            Ok(fresh) => {
                debug!(url = %retry.url(), "replaying request with refreshed token");
                attach_bearer(&mut retry, &fresh.access_token);
                Ok(self.http.execute(retry).await?)
            }
            Err(err) => {
                debug!(error = %err, "token refresh failed; surfacing original 401");
                Ok(response)
            }
        }
    }

    /// GET an API path and decode the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.endpoint(path)?;
        let request = self.http.get(url).build()?;
        let response = self.execute(request).await?;
        decode(response).await
    }

    /// POST a JSON body to an API path and decode the response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path)?;
        let request = self.http.post(url).json(body).build()?;
        let response = self.execute(request).await?;
        decode(response).await
    }
}

fn attach_bearer(request: &mut Request, token: &str) {
    if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
        request.headers_mut().insert(AUTHORIZATION, value);
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_to_error(status.as_u16(), &body));
    }
    Ok(response.json().await?)
}
