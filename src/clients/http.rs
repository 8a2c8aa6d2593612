#![allow(async_fn_in_trait)]

use std::fmt::Display;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
#[cfg(test)]
use mockall::automock;
use tokio::process::Command;
use tracing::debug;

// -----------------------------------------------------------------------------
// Types

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
        })
    }
}

/// A fully built API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status code and raw body of a response.
///
/// Error statuses are not turned into errors here; GitHub explains them in the
/// body and the caller decodes that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

// -----------------------------------------------------------------------------
// HttpTransport trait

/// Sends requests to the provider API.
#[cfg_attr(test, automock)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

// -----------------------------------------------------------------------------
// CurlTransport

/// HTTP transport using curl for making GitHub API requests
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlTransport;

impl CurlTransport {
    fn curl_args(request: &HttpRequest) -> Vec<String> {
        let mut args = vec![
            "-s".to_string(),
            "-w".to_string(),
            "\n%{http_code}".to_string(),
            "-X".to_string(),
            request.method.to_string(),
        ];
        for (name, value) in &request.headers {
            args.push("-H".to_string());
            args.push(format!("{name}: {value}"));
        }
        if let Some(body) = &request.body {
            args.push("-d".to_string());
            args.push(body.clone());
        }
        args.push(request.url.clone());
        args
    }

    /// Parse curl response with status code appended
    fn parse_response(stdout: Vec<u8>) -> Result<HttpResponse> {
        let output_str = String::from_utf8(stdout)?;
        let Some((body, status_code)) = output_str.rsplit_once('\n') else {
            bail!("curl output carries no status code: {output_str}");
        };
        let status = status_code
            .trim()
            .parse::<u16>()
            .with_context(|| format!("Invalid HTTP status code from curl: {status_code}"))?;

        Ok(HttpResponse {
            status,
            body: body.to_string(),
        })
    }
}

impl HttpTransport for CurlTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let output = Command::new("curl")
            .args(Self::curl_args(&request))
            .output()
            .await
            .context("Failed to execute curl command")?;

        if !output.status.success() {
            bail!(
                "curl command failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let response = Self::parse_response(output.stdout)?;
        debug!(status = response.status, url = %request.url, "received response");
        Ok(response)
    }
}
