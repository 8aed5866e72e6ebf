use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use super::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::error::StoreError;

impl Method {
    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// HTTP transport backed by `reqwest`. No timeout or retry is configured.
pub struct ReqwestTransport {
    base_url: String,
    http: Client,
}

impl ReqwestTransport {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let http = Client::builder()
            .build()
            .map_err(|e| StoreError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, StoreError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.to_reqwest(), &url);

        if request.method != Method::Get {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_trimmed() {
        let transport = ReqwestTransport::new("http://localhost:3000/").unwrap();
        assert_eq!(transport.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(Method::Patch.to_reqwest(), reqwest::Method::PATCH);
        assert_eq!(Method::Delete.to_reqwest(), reqwest::Method::DELETE);
    }
}
