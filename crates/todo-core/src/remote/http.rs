//! Remote store over HTTP using reqwest

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::RemoteStore;
use crate::config::ClientConfig;
use crate::error::RemoteError;
use crate::item::{NewTodo, TodoItem, TodoPatch};

/// Client for the `/api/todos` routes
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ClearCompletedResponse {
    deleted: usize,
}

impl HttpRemoteStore {
    /// Client with the HTTP stack's default timeouts
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client built from configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self, RemoteError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| RemoteError::RequestFailed {
            message: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos_url(&self) -> String {
        format!("{}/api/todos", self.base_url)
    }

    fn todo_url(&self, id: i64) -> String {
        format!("{}/api/todos/{}", self.base_url, id)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request.send().await.map_err(|e| RemoteError::RequestFailed {
            message: e.to_string(),
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(|e| RemoteError::ParseError {
            message: e.to_string(),
        })
    }
}

impl RemoteStore for HttpRemoteStore {
    async fn list(&self) -> Result<Vec<TodoItem>, RemoteError> {
        self.send(self.client.get(self.todos_url())).await
    }

    async fn create(&self, todo: &NewTodo) -> Result<TodoItem, RemoteError> {
        self.send(self.client.post(self.todos_url()).json(todo)).await
    }

    async fn update(&self, id: i64, patch: &TodoPatch) -> Result<TodoItem, RemoteError> {
        self.send(self.client.put(self.todo_url(id)).json(patch)).await
    }

    async fn toggle(&self, id: i64) -> Result<TodoItem, RemoteError> {
        let url = format!("{}/toggle", self.todo_url(id));
        self.send(self.client.patch(url)).await
    }

    async fn delete(&self, id: i64) -> Result<(), RemoteError> {
        let _ack: serde_json::Value = self.send(self.client.delete(self.todo_url(id))).await?;
        Ok(())
    }

    async fn clear_completed(&self) -> Result<usize, RemoteError> {
        let url = format!("{}/clear-completed", self.todos_url());
        let response: ClearCompletedResponse = self.send(self.client.delete(url)).await?;
        Ok(response.deleted)
    }
}
