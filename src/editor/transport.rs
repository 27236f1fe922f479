//! HTTP transport between the editor and the host application.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use scraper::{Html, Selector};

use crate::capture::Snapshot;
use crate::editor::session::SaveRequest;
use crate::error::EditorError;
use crate::server::CSRF_HEADER;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for one host application.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Shared connection pool.
    client: reqwest::Client,
    /// Host page URL; also the base of the endpoint URLs.
    host: Url,
    /// Mount point of the translator endpoints, without trailing `/`.
    prefix: String,
}

impl HttpTransport {
    /// What: Transport for the host page at `host_url` with endpoints under `prefix`.
    ///
    /// # Errors
    /// - `EditorError::Transport` when the URL does not parse or the client cannot be built
    pub fn new(host_url: &str, prefix: &str) -> Result<Self, EditorError> {
        let host = Url::parse(host_url)
            .map_err(|e| EditorError::Transport(format!("invalid host URL {host_url}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EditorError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            host,
            prefix: prefix.trim_end_matches('/').to_string(),
        })
    }

    /// What: The host page URL.
    #[must_use]
    pub const fn host(&self) -> &Url {
        &self.host
    }

    fn endpoint(&self, name: &str) -> Result<Url, EditorError> {
        self.host
            .join(&format!("{}/{name}", self.prefix))
            .map_err(|e| EditorError::Transport(format!("invalid endpoint {name}: {e}")))
    }

    /// What: Reload the host page, which runs a fresh capture pass.
    ///
    /// Output:
    /// - Page HTML
    ///
    /// # Errors
    /// - `EditorError::Transport` on network failure or a non-success status
    pub async fn reload(&self) -> Result<String, EditorError> {
        tracing::debug!(url = %self.host, "loading host page");
        let response = self
            .client
            .get(self.host.clone())
            .send()
            .await
            .map_err(|e| EditorError::Transport(format!("failed to load host page: {e}")))?;
        let response = check_status(response, "loading host page")?;
        response
            .text()
            .await
            .map_err(|e| EditorError::Transport(format!("failed to read host page: {e}")))
    }

    /// What: Load the host page and read its anti-forgery token.
    ///
    /// Output:
    /// - Token from the page, `None` when it carries none
    ///
    /// # Errors
    /// - `EditorError::Transport` when the page cannot be loaded
    pub async fn discover_csrf_token(&self) -> Result<Option<String>, EditorError> {
        let html = self.reload().await?;
        let token = extract_csrf_token(&html);
        if token.is_none() {
            tracing::warn!(url = %self.host, "host page carries no csrf-token meta element");
        }
        Ok(token)
    }

    /// What: Fetch the snapshot captured by the last page render.
    ///
    /// # Errors
    /// - `EditorError::Transport` on network failure, non-success status or an unparsable body
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, EditorError> {
        let url = self.endpoint("translations.json")?;
        tracing::debug!(%url, "fetching translations snapshot");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EditorError::Transport(format!("failed to fetch translations: {e}")))?;
        let response = check_status(response, "fetching translations")?;
        response
            .json::<Snapshot>()
            .await
            .map_err(|e| EditorError::Transport(format!("invalid translations snapshot: {e}")))
    }

    /// What: Submit the edits of a save request.
    ///
    /// Details:
    /// - Sent as `translations[locale][path]` form fields with the token in the
    ///   `X-CSRF-Token` header.
    ///
    /// # Errors
    /// - `EditorError::Transport` on network failure or a non-success status
    pub async fn post_submission(&self, request: &SaveRequest) -> Result<(), EditorError> {
        let url = self.endpoint("translate")?;
        let pairs = request.submission.to_form_pairs();
        tracing::info!(%url, fields = pairs.len(), "submitting translations");
        let response = self
            .client
            .post(url)
            .header(CSRF_HEADER, &request.token)
            .form(&pairs)
            .send()
            .await
            .map_err(|e| EditorError::Transport(format!("failed to submit translations: {e}")))?;
        check_status(response, "saving translations").map(|_| ())
    }
}

fn check_status(
    response: reqwest::Response,
    action: &str,
) -> Result<reqwest::Response, EditorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let reason = match status {
        StatusCode::FORBIDDEN => "forbidden (CSRF token rejected)".to_string(),
        other => other.to_string(),
    };
    Err(EditorError::Transport(format!("{action} failed: HTTP {reason}")))
}

/// What: Read the anti-forgery token from host page markup.
///
/// Output:
/// - The `content` of the single `<meta name="csrf-token">` element
///
/// Details:
/// - No element, several elements, or blank content all yield `None`.
#[must_use]
pub fn extract_csrf_token(html: &str) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="csrf-token"]"#).ok()?;
    let document = Html::parse_document(html);
    let mut matches = document.select(&selector);
    let element = matches.next()?;
    if matches.next().is_some() {
        tracing::warn!("host page carries several csrf-token meta elements");
        return None;
    }
    element
        .value()
        .attr("content")
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}
