use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Method};
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// URL of the last hop once redirects have been followed.
    pub final_url: String,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Human-readable name of the client
    fn name(&self) -> &'static str;

    /// Issue a HEAD request, following redirects. The body is always empty.
    async fn head(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Issue a GET request, following redirects, and read the whole body.
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse>;
}

pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::limited(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    async fn send(&self, method: Method, request: HttpRequest) -> Result<HttpResponse> {
        let url = if request.query.is_empty() {
            Url::parse(&request.url)
        } else {
            Url::parse_with_params(&request.url, &request.query)
        }
        .with_context(|| format!("Invalid request URL {}", request.url))?;

        debug!("{} {}", method, url);

        let mut builder = self.client.request(method.clone(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let body = if method == Method::HEAD {
            Vec::new()
        } else {
            response
                .bytes()
                .await
                .context("Failed to read response body")?
                .to_vec()
        };

        Ok(HttpResponse {
            status,
            final_url,
            body,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    async fn head(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.send(Method::HEAD, request).await
    }

    async fn get(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.send(Method::GET, request).await
    }
}
