//! Publishing the dataset as a file in a GitHub repository.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{IddaaError, Result};

const API_URL: &str = "https://api.github.com";
const API_ACCEPT: &str = "application/vnd.github+json";
const RAW_ACCEPT: &str = "application/vnd.github.raw";
const CLIENT_NAME: &str = concat!("iddaa-scraper/", env!("CARGO_PKG_VERSION"));

/// A file as currently stored in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub sha: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PublishOutcome {
    Created,
    Updated,
}

#[derive(Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

#[derive(Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// Reads and writes one repository's files through the GitHub contents API.
pub struct GithubPublisher {
    http: reqwest::Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GithubPublisher {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: API_URL.to_owned(),
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// The file at `path`, or `None` if the repository has no such file.
    #[instrument(skip(self))]
    pub async fn read_file(&self, path: &str) -> Result<Option<RemoteFile>> {
        let url = self.contents_url(path);
        let response = send(self.request(self.http.get(&url)), &url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("remote file does not exist");
            return Ok(None);
        }
        let response = check_status(response, &url)?;
        let body = response
            .text()
            .await
            .map_err(|e| IddaaError::ResponseBody {
                url: url.clone(),
                source: e,
            })?;
        let contents = parse_contents(&body)?;

        // Files over 1 MB come back without inline content.
        let content = if contents.encoding == "base64" {
            decode_content(&contents.content)?
        } else {
            self.read_raw(&url).await?
        };

        Ok(Some(RemoteFile {
            sha: contents.sha,
            content,
        }))
    }

    /// Create or update the file at `path` with `content`.
    #[instrument(skip(self, content))]
    pub async fn put_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<PublishOutcome> {
        let existing = self.read_file(path).await?;
        let body = PutContents {
            message,
            content: BASE64.encode(content),
            sha: existing.as_ref().map(|file| file.sha.as_str()),
        };

        let url = self.contents_url(path);
        let response = send(self.request(self.http.put(&url)).json(&body), &url).await?;
        check_status(response, &url)?;

        let outcome = match existing {
            Some(_) => PublishOutcome::Updated,
            None => PublishOutcome::Created,
        };
        info!(path, %outcome, "published file");
        Ok(outcome)
    }

    async fn read_raw(&self, url: &str) -> Result<String> {
        let request = self.request(self.http.get(url)).header(ACCEPT, RAW_ACCEPT);
        let response = check_status(send(request, url).await?, url)?;
        response.text().await.map_err(|e| IddaaError::ResponseBody {
            url: url.to_owned(),
            source: e,
        })
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url,
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        )
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(USER_AGENT, CLIENT_NAME)
            .header(ACCEPT, API_ACCEPT)
    }
}

async fn send(request: RequestBuilder, url: &str) -> Result<reqwest::Response> {
    request.send().await.map_err(|e| IddaaError::Http {
        url: url.to_owned(),
        source: e,
    })
}

fn check_status(response: reqwest::Response, url: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(IddaaError::UnexpectedStatus {
            url: url.to_owned(),
            status,
        })
    }
}

fn parse_contents(body: &str) -> Result<ContentsResponse> {
    Ok(serde_json::from_str(body)?)
}

/// Decode the line-wrapped base64 the contents API returns.
pub(crate) fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded.split_whitespace().collect();
    let bytes = BASE64.decode(compact)?;
    Ok(String::from_utf8(bytes)?)
}
