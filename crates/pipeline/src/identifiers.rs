//! Newtype domain identifiers.
//!
//! Every GitHub-assigned number and every configured name is represented as a
//! distinct newtype wrapping a primitive. This prevents accidentally passing an
//! [`IssueNumber`] where a [`PullRequestNumber`] is expected even though both
//! are `u64` under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (GitHub-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display, FromStr.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            /// Accepts a bare number or one prefixed with `#` (`"42"`, `"#42"`).
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s.trim().trim_start_matches('#');
                digits.parse::<u64>().map(Self)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — GitHub-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// A GitHub Issue number. The pre-release flow is keyed on one of these.
    IssueNumber
}

u64_id! {
    /// A GitHub Pull Request number.
    ///
    /// Pull requests share the issue number space, so a [`PullRequestNumber`]
    /// can be converted into an [`IssueNumber`] for commenting.
    PullRequestNumber
}

u64_id! {
    /// The numeric id GitHub assigns to a release record (not the tag).
    ReleaseId
}

u64_id! {
    /// The numeric id GitHub assigns to an uploaded release asset.
    AssetId
}

impl From<PullRequestNumber> for IssueNumber {
    fn from(value: PullRequestNumber) -> Self {
        IssueNumber(value.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single publisher run (one CLI invocation).
///
/// Generated fresh for every invocation; recorded on the root tracing span so
/// all activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed (configuration / Git names)
// ---------------------------------------------------------------------------

string_id! {
    /// A Git branch name (e.g. `"release"`). Used as the release target.
    BranchName
}

string_id! {
    /// A Git commit SHA as reported by GitHub.
    CommitSha
}

string_id! {
    /// Name of a repository-scoped GitHub Actions variable (e.g. `"VERSION_CODE"`).
    VariableName
}

string_id! {
    /// The name a release asset is uploaded under (e.g. `"towbook-2.3.1-41.apk"`).
    AssetName
}
