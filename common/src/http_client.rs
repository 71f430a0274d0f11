use crate::errors::AppError;
use reqwest::Client;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// HTTP client with retry logic and timeout
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_secs: u64, max_retries: u32) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            max_retries,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Fetch JSON from URL with retry and exponential backoff.
    ///
    /// 4xx answers are returned at once; only timeouts, network errors and
    /// 5xx answers are retried.
    #[instrument(skip(self, headers), fields(url = %url))]
    pub async fn get_json<T>(&self, url: &str, headers: HeaderMap) -> Result<T, AppError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match self.fetch_with_timeout(url, headers.clone()).await {
                Ok(response) => {
                    info!(url = %url, attempt = attempt + 1, "Request successful");
                    return Ok(response);
                }
                Err(e) if !is_retryable(&e) => return Err(e),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        let backoff = Duration::from_millis(2_u64.pow(attempt) * 100);
                        warn!(
                            url = %url,
                            attempt = attempt + 1,
                            backoff_ms = backoff.as_millis(),
                            "Request failed, retrying with exponential backoff"
                        );
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        error!(
            url = %url,
            attempts = self.max_retries + 1,
            "All retry attempts exhausted"
        );
        Err(last_error.unwrap_or_else(|| AppError::internal("Unknown error after retries")))
    }

    async fn fetch_with_timeout<T>(&self, url: &str, headers: HeaderMap) -> Result<T, AppError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = tokio::time::timeout(
            self.timeout,
            self.client.get(url).headers(headers).send(),
        )
        .await
        .map_err(|_| AppError::timeout(format!("Request to {} timed out", url)))?
        .map_err(|e| {
            if e.is_timeout() {
                AppError::timeout(format!("Request to {} timed out", url))
            } else {
                AppError::NetworkError(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::http(
                status.as_u16(),
                format!("HTTP error: {}", status),
            ));
        }

        let text = response.text().await.map_err(AppError::NetworkError)?;
        let json: T = serde_json::from_str(&text).map_err(AppError::ParseError)?;

        Ok(json)
    }
}

fn is_retryable(err: &AppError) -> bool {
    match err {
        AppError::HttpError { status, .. } => *status >= 500,
        AppError::TimeoutError(_) | AppError::NetworkError(_) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    #[tokio::test]
    async fn sends_headers_and_parses_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("apikey", "anon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(2, 0).expect("client");
        let mut headers = HeaderMap::new();
        headers.insert("apikey", "anon".parse().expect("header value"));

        let body: Value = client
            .get_json(&format!("{}/auth/v1/user", mock_server.uri()), headers)
            .await
            .expect("request should succeed");

        assert_eq!(body["id"], "u1");
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/denied"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(2, 2).expect("client");
        let result: Result<Value, _> = client
            .get_json(&format!("{}/denied", mock_server.uri()), HeaderMap::new())
            .await;

        assert!(matches!(result, Err(AppError::HttpError { status: 401, .. })));
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(2, 1).expect("client");
        let result: Result<Value, _> = client
            .get_json(&format!("{}/flaky", mock_server.uri()), HeaderMap::new())
            .await;

        assert!(matches!(result, Err(AppError::HttpError { status: 503, .. })));
    }
}
