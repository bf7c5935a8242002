//! `reqwest`-backed GitHub REST client.

use std::path::Path;

use async_trait::async_trait;
use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use pipeline::{
    ApiToken, AssetName, CommitRecord, GithubConfig, HostError, Issue, IssueNumber,
    IssueTracker, NewRelease, ProgressObserver, PublishError, PullRequest, PullRequestManager,
    PullRequestNumber, PullRequestState, Release, ReleaseId, ReleaseManager,
    RepositoryVariables, UploadProgress, UploadedAsset, VariableName,
};

use crate::wire::{
    AssetDto, CommentDto, CommitDto, CreateReleaseDto, IssueDto, PullRequestDto, ReleaseDto,
    UpdateVariableDto, VariableDto,
};

/// API version pinned on every request.
pub const API_VERSION: &str = "2022-11-28";

/// Number of pull requests scanned by a lookup (one page).
pub const PULL_REQUEST_PAGE_SIZE: u32 = 50;

const COMMIT_PAGE_SIZE: u32 = 100;
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// GitHub client bound to one repository.
///
/// Implements every source-hosting port in [`pipeline::ports`].
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    uploads_url: String,
    owner: String,
    repository: String,
    token: ApiToken,
}

impl GithubClient {
    /// Builds a client from configuration.
    ///
    /// Fails with [`PublishError::Configuration`] when no token is configured
    /// or the HTTP client cannot be constructed.
    pub fn new(config: &GithubConfig) -> Result<Self, PublishError> {
        let token = config
            .token
            .clone()
            .ok_or_else(|| PublishError::Configuration {
                message: "no API token; set GH_TOKEN".to_string(),
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(API_VERSION),
        );

        let http = reqwest::Client::builder()
            .user_agent(concat!("release-publisher/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| PublishError::Configuration {
                message: format!("cannot build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            uploads_url: config.uploads_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repository: config.repository.clone(),
            token,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url, self.owner, self.repository, path
        )
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, HostError> {
        let response = request
            .bearer_auth(self.token.expose())
            .send()
            .await
            .map_err(|e| HostError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "github response");
        if status.is_success() {
            return Ok(response);
        }

        // Best effort: the body usually carries GitHub's error message.
        let body = response.text().await.unwrap_or_default();
        Err(HostError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, HostError> {
    response
        .json::<T>()
        .await
        .map_err(|e| HostError::Decode(e.to_string()))
}

/// Reads `file` in fixed-size chunks, reporting cumulative progress after each.
fn progress_stream(
    file: tokio::fs::File,
    asset: AssetName,
    total: u64,
    observer: Option<ProgressObserver>,
) -> impl Stream<Item = std::io::Result<Vec<u8>>> + Send + 'static {
    futures::stream::try_unfold((file, 0u64), move |(mut file, sent)| {
        let asset = asset.clone();
        let observer = observer.clone();
        async move {
            let mut chunk = vec![0u8; UPLOAD_CHUNK_SIZE];
            let read = file.read(&mut chunk).await?;
            if read == 0 {
                return Ok::<_, std::io::Error>(None);
            }
            chunk.truncate(read);
            let sent = sent + read as u64;
            if let Some(observer) = &observer {
                observer(&UploadProgress { asset, sent, total });
            }
            Ok::<_, std::io::Error>(Some((chunk, (file, sent))))
        }
    })
}

// ---------------------------------------------------------------------------
// Port implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl RepositoryVariables for GithubClient {
    async fn get_variable(&self, name: &VariableName) -> Result<String, HostError> {
        let url = self.repo_url(&format!("actions/variables/{name}"));
        let response = self.send(self.http.get(url)).await?;
        let variable: VariableDto = decode(response).await?;
        Ok(variable.value)
    }

    async fn update_variable(&self, name: &VariableName, value: &str) -> Result<(), HostError> {
        let url = self.repo_url(&format!("actions/variables/{name}"));
        let payload = UpdateVariableDto {
            name: name.as_str(),
            value,
        };
        self.send(self.http.patch(url).json(&payload)).await?;
        Ok(())
    }
}

#[async_trait]
impl IssueTracker for GithubClient {
    async fn get_issue(&self, number: IssueNumber) -> Result<Issue, HostError> {
        let url = self.repo_url(&format!("issues/{number}"));
        let response = self.send(self.http.get(url)).await?;
        let issue: IssueDto = decode(response).await?;
        Ok(issue.into())
    }

    async fn create_comment(&self, number: IssueNumber, body: &str) -> Result<(), HostError> {
        let url = self.repo_url(&format!("issues/{number}/comments"));
        self.send(self.http.post(url).json(&CommentDto { body }))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PullRequestManager for GithubClient {
    async fn list_pull_requests(
        &self,
        state: PullRequestState,
    ) -> Result<Vec<PullRequest>, HostError> {
        let url = self.repo_url("pulls");
        let request = self.http.get(url).query(&[
            ("state", state.as_str().to_string()),
            ("per_page", PULL_REQUEST_PAGE_SIZE.to_string()),
        ]);
        let response = self.send(request).await?;
        let pulls: Vec<PullRequestDto> = decode(response).await?;
        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }

    async fn list_commits(
        &self,
        number: PullRequestNumber,
    ) -> Result<Vec<CommitRecord>, HostError> {
        let url = self.repo_url(&format!("pulls/{number}/commits"));
        let request = self
            .http
            .get(url)
            .query(&[("per_page", COMMIT_PAGE_SIZE.to_string())]);
        let response = self.send(request).await?;
        let commits: Vec<CommitDto> = decode(response).await?;
        commits.into_iter().map(CommitRecord::try_from).collect()
    }
}

#[async_trait]
impl ReleaseManager for GithubClient {
    async fn create_release(&self, release: &NewRelease) -> Result<Release, HostError> {
        let url = self.repo_url("releases");
        let payload = CreateReleaseDto {
            tag_name: release.tag.as_str(),
            target_commitish: release.target.as_str(),
            name: &release.name,
            body: &release.body,
            draft: false,
            prerelease: release.prerelease,
            generate_release_notes: false,
        };
        let response = self.send(self.http.post(url).json(&payload)).await?;
        let created: ReleaseDto = decode(response).await?;
        Ok(created.into())
    }

    async fn get_release(&self, id: ReleaseId) -> Result<Release, HostError> {
        let url = self.repo_url(&format!("releases/{id}"));
        let response = self.send(self.http.get(url)).await?;
        let release: ReleaseDto = decode(response).await?;
        Ok(release.into())
    }

    async fn upload_asset(
        &self,
        id: ReleaseId,
        path: &Path,
        name: &AssetName,
        progress: Option<ProgressObserver>,
    ) -> Result<UploadedAsset, HostError> {
        let local = |e: std::io::Error| HostError::LocalFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        let file = tokio::fs::File::open(path).await.map_err(local)?;
        let total = file.metadata().await.map_err(local)?.len();
        info!(asset = %name, bytes = total, release_id = %id, "uploading asset");

        let url = format!(
            "{}/repos/{}/{}/releases/{}/assets",
            self.uploads_url, self.owner, self.repository, id
        );
        let body = reqwest::Body::wrap_stream(progress_stream(file, name.clone(), total, progress));
        let request = self
            .http
            .post(url)
            .query(&[("name", name.as_str())])
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, total)
            .body(body);

        let response = self.send(request).await?;
        let asset: AssetDto = decode(response).await?;
        UploadedAsset::try_from(asset)
    }
}
