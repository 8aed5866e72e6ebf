//! Scripted transport for exercising remote mode without a server.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{ApiRequest, ApiResponse, HttpTransport};
use crate::error::StoreError;

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, StoreError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: serde_json::Value) {
        self.push(Ok(ApiResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub fn respond_empty(&self, status: u16) {
        self.push(Ok(ApiResponse {
            status,
            body: String::new(),
        }));
    }

    pub fn fail(&self, message: &str) {
        self.push(Err(StoreError::Network(message.to_string())));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, response: Result<ApiResponse, StoreError>) {
        self.responses.lock().unwrap().push_back(response);
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, StoreError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StoreError::Network("no scripted response".to_string())))
    }
}
