//! GitHub REST wire formats and their conversion into domain records.

use serde::{Deserialize, Serialize};

use pipeline::{
    AssetId, AssetName, CommitRecord, CommitSha, HostError, Issue, IssueNumber, PullRequest,
    PullRequestNumber, Release, ReleaseId, UploadedAsset,
};

#[derive(Debug, Deserialize)]
pub(crate) struct VariableDto {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateVariableDto<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestDto {
    number: u64,
    #[serde(default)]
    title: String,
    body: Option<String>,
    #[serde(default)]
    html_url: String,
}

impl From<PullRequestDto> for PullRequest {
    fn from(dto: PullRequestDto) -> Self {
        PullRequest {
            number: PullRequestNumber::new(dto.number),
            title: dto.title,
            body: dto.body.filter(|b| !b.is_empty()),
            html_url: dto.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueDto {
    number: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    html_url: String,
}

impl From<IssueDto> for Issue {
    fn from(dto: IssueDto) -> Self {
        Issue {
            number: IssueNumber::new(dto.number),
            title: dto.title,
            html_url: dto.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitDto {
    sha: String,
    commit: CommitDetailDto,
}

#[derive(Debug, Deserialize)]
struct CommitDetailDto {
    message: String,
}

impl TryFrom<CommitDto> for CommitRecord {
    type Error = HostError;

    fn try_from(dto: CommitDto) -> Result<Self, Self::Error> {
        let id = CommitSha::new(dto.sha)
            .ok_or_else(|| HostError::Decode("commit with empty sha".to_string()))?;
        Ok(CommitRecord {
            id,
            message: dto.commit.message,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateReleaseDto<'a> {
    pub tag_name: &'a str,
    pub target_commitish: &'a str,
    pub name: &'a str,
    pub body: &'a str,
    pub draft: bool,
    pub prerelease: bool,
    pub generate_release_notes: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReleaseDto {
    id: u64,
    tag_name: String,
    #[serde(default)]
    html_url: String,
}

impl From<ReleaseDto> for Release {
    fn from(dto: ReleaseDto) -> Self {
        Release {
            id: ReleaseId::new(dto.id),
            tag_name: dto.tag_name,
            html_url: dto.html_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CommentDto<'a> {
    pub body: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssetDto {
    id: u64,
    name: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    browser_download_url: String,
}

impl TryFrom<AssetDto> for UploadedAsset {
    type Error = HostError;

    fn try_from(dto: AssetDto) -> Result<Self, Self::Error> {
        let name = AssetName::new(dto.name)
            .ok_or_else(|| HostError::Decode("asset with empty name".to_string()))?;
        Ok(UploadedAsset {
            id: AssetId::new(dto.id),
            name,
            state: dto.state,
            download_url: dto.browser_download_url,
        })
    }
}
