//! HTTP client (C3): a thin, cancellable GET-only wrapper.
//!
//! Headers are fixed rather than configurable -- YouTube varies its response
//! shape by `Accept-Language` and `User-Agent`, so these are load-bearing,
//! not cosmetic.

use crate::error::RytError;
use tokio_util::sync::CancellationToken;

const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:70.0) Gecko/20100101 Firefox/70.0";

/// A GET-only HTTP helper used by every fetch in the pipeline (watch page,
/// embed page, legacy info endpoint, player script, DASH manifest).
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        let inner = reqwest::Client::builder()
            .build()
            .expect("reqwest client builder with no custom TLS config cannot fail");
        Self { inner }
    }

    /// GET `url`, returning the body as bytes. A non-2xx response is an
    /// error carrying the status code; the body is drained either way.
    /// Cancellable via `cancel`.
    pub async fn get_and_read_body(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, RytError> {
        let request = self
            .inner
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .header(reqwest::header::USER_AGENT, USER_AGENT);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RytError::Cancelled),
            result = request.send() => result?,
        };

        let status = response.status();
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RytError::Cancelled),
            result = response.bytes() => result?,
        };

        if !status.is_success() {
            return Err(RytError::UnexpectedStatus(status.as_u16()));
        }
        Ok(body.to_vec())
    }

    /// Convenience wrapper returning the body decoded as UTF-8 (lossy --
    /// YouTube's HTML/JS payloads are UTF-8 in practice but drift is a
    /// possibility the extractors must tolerate, not the client).
    pub async fn get_and_read_text(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, RytError> {
        let bytes = self.get_and_read_body(url, cancel).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// GET `url` and return the response for streaming consumption once its
    /// status has been checked. Used by media-download helpers that want to
    /// write the body straight into a caller-supplied sink instead of
    /// buffering it.
    pub async fn get_stream(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, RytError> {
        let request = self
            .inner
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .header(reqwest::header::USER_AGENT, USER_AGENT);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RytError::Cancelled),
            result = request.send() => result?,
        };

        if !response.status().is_success() {
            return Err(RytError::UnexpectedStatus(response.status().as_u16()));
        }
        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_and_read_body_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ok")
            .match_header("accept-language", ACCEPT_LANGUAGE)
            .match_header("user-agent", USER_AGENT)
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let client = HttpClient::new();
        let cancel = CancellationToken::new();
        let body = client
            .get_and_read_body(&format!("{}/ok", server.url()), &cancel)
            .await
            .unwrap();
        assert_eq!(body, b"hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_200_is_error() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/missing").with_status(404).create_async().await;

        let client = HttpClient::new();
        let cancel = CancellationToken::new();
        let err = client
            .get_and_read_body(&format!("{}/missing", server.url()), &cancel)
            .await
            .unwrap_err();
        match err {
            RytError::UnexpectedStatus(404) => {}
            other => panic!("expected UnexpectedStatus(404), got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_stream_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/bytes")
            .with_status(200)
            .with_body(b"binary-data".to_vec())
            .create_async()
            .await;

        let client = HttpClient::new();
        let cancel = CancellationToken::new();
        let response = client
            .get_stream(&format!("{}/bytes", server.url()), &cancel)
            .await
            .unwrap();
        let body = response.bytes().await.unwrap();
        assert_eq!(&body[..], b"binary-data");
    }

    #[tokio::test]
    async fn test_cancellation_aborts_fetch() {
        let server = mockito::Server::new_async().await;
        let client = HttpClient::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = client
            .get_and_read_body(&format!("{}/anything", server.url()), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, RytError::Cancelled));
    }
}
