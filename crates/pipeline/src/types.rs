//! Shared value types for the publisher domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values with invariants (a version name is always a dotted triple, a release
//! tag is always `"{name}-{code}"`) and participate in domain computations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AssetName, CommitSha};

// ---------------------------------------------------------------------------
// Versioning
// ---------------------------------------------------------------------------

/// Error returned when a string is not a dotted triple of non-negative integers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a version of the form MAJOR.MINOR.PATCH")]
pub struct ParseVersionNameError {
    /// The rejected input.
    pub input: String,
}

/// Human-readable application version, e.g. `2.3.1`.
///
/// Always exactly three dot-separated non-negative integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionName {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
}

impl VersionName {
    /// Creates a [`VersionName`] from its three components.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::str::FromStr for VersionName {
    type Err = ParseVersionNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionNameError {
            input: s.to_string(),
        };
        let mut parts = s.split('.');
        let mut next = || -> Result<u64, ParseVersionNameError> {
            let part = parts.next().ok_or_else(err)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            part.parse().map_err(|_| err())
        };
        let major = next()?;
        let minor = next()?;
        let patch = next()?;
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self::new(major, minor, patch))
    }
}

impl std::fmt::Display for VersionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for VersionName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------

/// Machine-readable build counter (Android `versionCode`).
///
/// Increases by exactly one per successful run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VersionCode(u64);

impl VersionCode {
    /// Creates a [`VersionCode`] from a raw integer.
    pub fn new(code: u64) -> Self {
        Self(code)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// The code that follows this one.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl std::fmt::Display for VersionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for VersionCode {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

// ---------------------------------------------------------------------------

/// The pair of version identifiers held in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDescriptor {
    /// Human-readable version name.
    pub name: VersionName,
    /// Monotonic build counter.
    pub code: VersionCode,
}

impl VersionDescriptor {
    /// Creates a new descriptor.
    pub fn new(name: VersionName, code: VersionCode) -> Self {
        Self { name, code }
    }

    /// The release tag derived from this descriptor.
    pub fn tag(&self) -> ReleaseTag {
        ReleaseTag::new(self.name, self.code)
    }
}

// ---------------------------------------------------------------------------

/// Unique identifier of a published build: `"{name}-{code}"`.
///
/// Only constructible from a name and a code, so the format cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReleaseTag(String);

impl ReleaseTag {
    /// Derives the tag for `name` and `code`.
    pub fn new(name: VersionName, code: VersionCode) -> Self {
        Self(format!("{name}-{code}"))
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

/// One commit on a pull request, as used in release notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Commit SHA.
    pub id: CommitSha,
    /// Full commit message.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Builds
// ---------------------------------------------------------------------------

/// Which set of Gradle tasks a build runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildType {
    /// Release APK only (pre-release builds).
    Assemble,
    /// Release APK plus the App Bundle (final releases).
    AssembleAndBundle,
}

impl BuildType {
    /// The task arguments passed to the build tool, in order.
    pub fn tasks(self) -> &'static [&'static str] {
        match self {
            BuildType::Assemble => &["clean", "generateGitProperties", "assembleRelease"],
            BuildType::AssembleAndBundle => &[
                "clean",
                "generateGitProperties",
                "bundleRelease",
                "assembleRelease",
            ],
        }
    }

    /// The artifacts this build produces, in upload order.
    pub fn artifacts(self) -> &'static [ArtifactKind] {
        match self {
            BuildType::Assemble => &[ArtifactKind::Apk],
            BuildType::AssembleAndBundle => &[ArtifactKind::Apk, ArtifactKind::Bundle],
        }
    }
}

/// Terminal result of a build process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutcome {
    /// Process exit code; `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    /// Whether the process exited successfully.
    pub succeeded: bool,
}

impl BuildOutcome {
    /// Builds an outcome from a raw exit code.
    pub fn from_exit_code(exit_code: i32) -> Self {
        Self {
            exit_code,
            succeeded: exit_code == 0,
        }
    }
}

/// Which output stream a line of build output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

/// One line of child-process output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    /// Originating stream.
    pub stream: OutputStream,
    /// Line text without the trailing newline.
    pub text: String,
}

/// Advisory callback receiving build output as it arrives.
pub type OutputObserver = Arc<dyn Fn(&OutputLine) + Send + Sync>;

// ---------------------------------------------------------------------------
// Artifacts and uploads
// ---------------------------------------------------------------------------

/// Kind of binary produced by the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Installable package (`.apk`).
    Apk,
    /// Distribution bundle (`.aab`).
    Bundle,
}

impl ArtifactKind {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Apk => "apk",
            ArtifactKind::Bundle => "aab",
        }
    }
}

/// Snapshot of an in-flight asset upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    /// Asset being uploaded.
    pub asset: AssetName,
    /// Bytes handed to the transport so far.
    pub sent: u64,
    /// Total size of the asset in bytes.
    pub total: u64,
}

impl UploadProgress {
    /// Percentage of the asset sent, in `0..=100`.
    ///
    /// An empty asset reports 100.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let pct = self.sent.min(self.total).saturating_mul(100) / self.total;
        pct as u8
    }
}

/// Advisory callback receiving upload progress.
pub type ProgressObserver = Arc<dyn Fn(&UploadProgress) + Send + Sync>;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
