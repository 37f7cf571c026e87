use crate::backend::{BackendError, ZoneBackend};
use crate::config::canonical_zone_name;
use crate::powerdns::types::*;
use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, error};

const MAX_ERROR_BODY: usize = 200;

#[derive(Clone)]
pub struct PowerDnsClient {
    http: Client,
    base_url: String, // e.g. "http://127.0.0.1:8081/api/v1"
    api_key: String,
    server_id: String, // usually "localhost"
}

impl PowerDnsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        server_id: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            server_id: server_id.into(),
        }
    }

    fn auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("X-API-Key", &self.api_key)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/servers/{}/{}",
            self.base_url,
            self.server_id,
            path.trim_start_matches('/')
        )
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, BackendError> {
        let url = self.url(path);
        debug!(%method, %url, "HTTP request");

        let mut req = self.auth_header(self.http.request(method.clone(), &url));
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().await.map_err(|err| {
            error!(%method, %url, "HTTP request failed: {err}");
            BackendError::Transport(err)
        })?;
        debug!(%method, %url, status = res.status().as_u16(), "HTTP response");
        Ok(res)
    }

    async fn api_error(method: Method, path: &str, res: Response) -> BackendError {
        let status = res.status().as_u16();
        let body = match res.text().await {
            Ok(body) => body,
            Err(err) => return BackendError::Transport(err),
        };

        if let Ok(api) = serde_json::from_str::<ApiErrorBody>(&body) {
            if !api.error.is_empty() {
                error!(%method, path, status, "API error: {}", api.error);
                return BackendError::Api {
                    status,
                    message: api.error,
                };
            }
        }

        let body = truncate(&body, MAX_ERROR_BODY);
        error!(%method, path, status, "API error: {body}");
        BackendError::UnexpectedStatus { status, body }
    }
}

#[async_trait]
impl ZoneBackend for PowerDnsClient {
    async fn get_zone(&self, zone_id: &str) -> Result<Option<PdnsZone>, BackendError> {
        let path = format!("zones/{}", canonical_zone_name(zone_id));
        let res = self.send::<()>(Method::GET, &path, None).await?;
        match res.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::OK => {
                let body = res.bytes().await?;
                Ok(Some(serde_json::from_slice(&body)?))
            }
            _ => Err(Self::api_error(Method::GET, &path, res).await),
        }
    }

    async fn create_zone(&self, zone: &PdnsZone) -> Result<PdnsZone, BackendError> {
        let path = "zones";
        let res = self.send(Method::POST, path, Some(zone)).await?;
        if res.status() != StatusCode::CREATED {
            return Err(Self::api_error(Method::POST, path, res).await);
        }
        let body = res.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn patch_zone(&self, zone_id: &str, patch: &ZonePatch) -> Result<(), BackendError> {
        let path = format!("zones/{}", canonical_zone_name(zone_id));
        let res = self.send(Method::PATCH, &path, Some(patch)).await?;
        if res.status() != StatusCode::NO_CONTENT {
            return Err(Self::api_error(Method::PATCH, &path, res).await);
        }
        Ok(())
    }
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_server_and_path() {
        let client = PowerDnsClient::new("http://127.0.0.1:8081/api/v1/", "key", "localhost");
        assert_eq!(
            client.url("/zones/example.com."),
            "http://127.0.0.1:8081/api/v1/servers/localhost/zones/example.com."
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 200), "short");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }
}
