//! HTTP client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port. It owns the concerns the
//! verification engine leaves to transport: resolving relative step URLs
//! against the base URL, applying default headers and the user agent, and
//! encoding JSON bodies.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use conform_application::ports::{HttpClient, HttpClientError};
use conform_domain::{Header, Headers, HttpMethod, HttpRequest, HttpResponse, RunSettings};
use reqwest::{Client, Method};
use tracing::trace;
use url::Url;

/// Redirects followed before a request fails.
pub const MAX_REDIRECTS: usize = 10;

/// User agent sent when the settings do not name one.
pub const DEFAULT_USER_AGENT: &str = concat!("conform/", env!("CARGO_PKG_VERSION"));

/// HTTP client backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    base_url: Option<Url>,
    default_headers: Headers,
    timeout: Duration,
}

impl ReqwestHttpClient {
    /// Creates a client with default settings and no base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, HttpClientError> {
        Self::from_settings(&RunSettings::default())
    }

    /// Creates a client configured from run settings.
    ///
    /// # Errors
    ///
    /// Returns `HttpClientError::InvalidUrl` if the base URL does not parse,
    /// or `HttpClientError::Other` if the client cannot be created.
    pub fn from_settings(settings: &RunSettings) -> Result<Self, HttpClientError> {
        let base_url = settings
            .base_url
            .as_deref()
            .map(parse_base_url)
            .transpose()?;

        let user_agent = settings.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            default_headers: Headers::from(&settings.headers),
            timeout: settings.timeout(),
        })
    }

    /// Resolves a step URL: absolute URLs pass through, relative ones are
    /// appended to the base URL path.
    ///
    /// # Errors
    ///
    /// Returns `HttpClientError::InvalidUrl` for a relative URL with no base
    /// URL configured, or for a result that does not parse.
    pub fn resolve_url(&self, url: &str) -> Result<Url, HttpClientError> {
        if let Ok(parsed) = Url::parse(url)
            && parsed.has_host()
        {
            return Ok(parsed);
        }

        let Some(base) = &self.base_url else {
            return Err(HttpClientError::InvalidUrl(format!(
                "relative URL '{url}' needs a base URL"
            )));
        };

        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            url.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {joined}")))
    }

    /// Default headers overlaid with the request's own, which win.
    fn merged_headers(&self, request: &HttpRequest) -> Headers {
        let mut headers = self.default_headers.clone();
        for header in request.headers.iter() {
            headers.set(header.name.clone(), header.value.clone());
        }
        if request.body.is_some() && !headers.contains("content-type") {
            headers.add(Header::new("Content-Type", "application/json"));
        }
        headers
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpClientError> {
        let url = self.resolve_url(&request.url)?;
        let timeout = request.timeout.unwrap_or(self.timeout);
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url.clone())
            .timeout(timeout);

        for header in self.merged_headers(request).iter() {
            builder = builder.header(header.name.as_str(), header.value.as_str());
        }

        if let Some(body) = &request.body {
            let encoded =
                serde_json::to_vec(body).map_err(|e| HttpClientError::InvalidBody(e.to_string()))?;
            builder = builder.body(encoded);
        }

        trace!(method = %request.method, %url, "Dispatching request");
        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                Header::new(
                    name.as_str(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response
            .text()
            .await
            .map_err(|e| HttpClientError::Other(format!("failed to read body: {}", describe(&e))))?;

        Ok(HttpResponse::new(status, headers, body, start.elapsed()))
    }
}

fn parse_base_url(base: &str) -> Result<Url, HttpClientError> {
    let url = Url::parse(base).map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {base}")))?;
    if url.has_host() {
        Ok(url)
    } else {
        Err(HttpClientError::InvalidUrl(format!(
            "base URL has no host: {base}"
        )))
    }
}

/// Maps reqwest errors to transport error categories.
///
/// reqwest's own message is terse, so classification looks at the whole
/// source chain.
fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
    if error.is_timeout() {
        return HttpClientError::Timeout { timeout_ms };
    }

    let message = describe(error);
    let lower = message.to_lowercase();
    let host = error
        .url()
        .and_then(Url::host_str)
        .unwrap_or("unknown")
        .to_string();

    if error.is_connect() {
        if lower.contains("dns") || lower.contains("resolve") || lower.contains("lookup") {
            return HttpClientError::DnsError { host, message };
        }
        if lower.contains("refused") {
            let port = error
                .url()
                .and_then(Url::port_or_known_default)
                .unwrap_or(80);
            return HttpClientError::ConnectionRefused { host, port };
        }
        if lower.contains("certificate") || lower.contains("tls") {
            return HttpClientError::Tls(message);
        }
        return HttpClientError::ConnectionFailed(message);
    }

    if error.is_redirect() {
        return HttpClientError::TooManyRedirects { max: MAX_REDIRECTS };
    }
    if error.is_builder() {
        return HttpClientError::InvalidUrl(message);
    }

    HttpClientError::Other(message)
}

fn describe(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
