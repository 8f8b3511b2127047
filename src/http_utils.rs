use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;

use crate::cli_utils;

/// A non-success response from the agro API.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    /// The HTTP status the server answered with.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

impl Error for HttpError {}

/// Thin JSON client for the agro HTTP API.
pub struct AgroClient {
    client: Client,
    base_url: String,
}

impl AgroClient {
    /// Creates a client for the server at `base_url`, e.g. `http://localhost:8080`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Constructs a full API URL from a path
    pub fn api_url(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/api/v1/{}", self.base_url, path)
    }

    /// Fetches the health document, which lives outside `/api/v1`.
    pub async fn health<T>(&self) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/health", self.base_url);
        self.send(self.client.get(&url)).await
    }

    /// Makes a GET request with query parameters and handles the response
    pub async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        let url = self.api_url(path);
        self.send(self.client.get(&url).query(query)).await
    }

    /// Makes a POST request with JSON body and handles the response
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, Box<dyn Error>>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let url = self.api_url(path);
        self.send(self.client.post(&url).json(body)).await
    }

    /// Makes a PATCH request with query parameters and a JSON body
    pub async fn patch<B, T>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T, Box<dyn Error>>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let url = self.api_url(path);
        self.send(self.client.patch(&url).query(query).json(body))
            .await
    }

    /// Makes a DELETE request with query parameters and handles the response
    pub async fn delete<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        let url = self.api_url(path);
        self.send(self.client.delete(&url).query(query)).await
    }

    async fn send<T>(&self, request: RequestBuilder) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Handles HTTP response, deserializing success or returning error
    async fn handle_response<T>(&self, response: Response) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let error = response.text().await.unwrap_or_default();
            let message = if error.is_empty() {
                "No error details".to_string()
            } else {
                error
            };
            Err(Box::new(HttpError { status, message }))
        }
    }
}

/// Execute an HTTP operation and exit on error with formatted message
pub async fn execute_or_exit<T, F, Fut>(operation: F, context: &str) -> T
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, Box<dyn Error>>>,
{
    match operation().await {
        Ok(result) => result,
        Err(e) => cli_utils::exit_with_error(&format!("{}: {}", context, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_paths() {
        let client = AgroClient::new("http://localhost:8080/".to_string());
        assert_eq!(
            client.api_url("farmers"),
            "http://localhost:8080/api/v1/farmers"
        );
        assert_eq!(
            client.api_url("/farmers"),
            "http://localhost:8080/api/v1/farmers"
        );
    }
}
