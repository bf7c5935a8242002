//! Version-field extraction and in-place patching of manifest text.
//!
//! This is deliberately a text patch, not a structured rewrite: the two fields
//! are located by pattern and only the bytes of their *values* are replaced.
//! Everything else in the document, including the whitespace around `=`, is
//! preserved byte-for-byte. The contract is therefore narrow: each field must
//! appear in the shape its [`ManifestFormat`] expects, and only the first
//! occurrence of each is read or rewritten.
//!
//! Alternate manifest syntaxes are supported by implementing
//! [`ManifestFormat`] rather than by duplicating the editing code.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{ManifestError, VersionCode, VersionDescriptor, VersionName};

/// Reads and patches the version fields of one manifest syntax.
pub trait ManifestFormat: Send + Sync {
    /// Extracts the version descriptor from `text`.
    fn parse(&self, text: &str) -> Result<VersionDescriptor, ManifestError>;

    /// Returns `text` with both field values replaced by `descriptor`.
    fn patch(&self, text: &str, descriptor: &VersionDescriptor) -> Result<String, ManifestError>;
}

// ---------------------------------------------------------------------------
// Pattern-based format
// ---------------------------------------------------------------------------

static ANDROID_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"versionName\s*=\s*"(\d+(?:\.\d+)*)""#).expect("static pattern")
});
static ANDROID_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"versionCode\s*=\s*"(\d+)""#).expect("static pattern"));
static GRADLE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bversionName\s*=?\s*"(\d+(?:\.\d+)*)""#).expect("static pattern")
});
static GRADLE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bversionCode\s*=?\s*(\d+)\b").expect("static pattern"));

/// A [`ManifestFormat`] driven by two regular expressions whose first capture
/// group is the field value.
#[derive(Debug, Clone)]
pub struct PatternFormat {
    name: Regex,
    code: Regex,
}

impl PatternFormat {
    /// `AndroidManifest.xml` attributes: `versionName="2.3.1"`, `versionCode="41"`
    /// (optionally namespaced, e.g. `android:versionCode`).
    pub fn android_manifest() -> Self {
        Self {
            name: ANDROID_NAME.clone(),
            code: ANDROID_CODE.clone(),
        }
    }

    /// Gradle module scripts: `versionName "2.3.1"` / `versionCode 41`
    /// (Groovy) or `versionName = "2.3.1"` / `versionCode = 41` (Kotlin DSL).
    pub fn gradle_script() -> Self {
        Self {
            name: GRADLE_NAME.clone(),
            code: GRADLE_CODE.clone(),
        }
    }

    fn value_range(
        pattern: &Regex,
        text: &str,
        field: &'static str,
    ) -> Result<Range<usize>, ManifestError> {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.range())
            .ok_or(ManifestError::FieldMissing { field })
    }
}

impl ManifestFormat for PatternFormat {
    fn parse(&self, text: &str) -> Result<VersionDescriptor, ManifestError> {
        let name_range = Self::value_range(&self.name, text, "versionName")?;
        let code_range = Self::value_range(&self.code, text, "versionCode")?;

        let name = text[name_range].parse::<VersionName>()?;
        let raw_code = &text[code_range];
        let code = raw_code
            .parse::<VersionCode>()
            .map_err(|_| ManifestError::InvalidVersionCode {
                value: raw_code.to_string(),
            })?;

        Ok(VersionDescriptor::new(name, code))
    }

    fn patch(&self, text: &str, descriptor: &VersionDescriptor) -> Result<String, ManifestError> {
        let mut edits = [
            (
                Self::value_range(&self.name, text, "versionName")?,
                descriptor.name.to_string(),
            ),
            (
                Self::value_range(&self.code, text, "versionCode")?,
                descriptor.code.to_string(),
            ),
        ];
        // Splice back to front so earlier ranges stay valid.
        edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));

        let mut out = text.to_string();
        for (range, value) in edits {
            out.replace_range(range, &value);
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------

/// Manifest syntax selector used in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestSyntax {
    /// `AndroidManifest.xml` attributes.
    #[default]
    AndroidManifest,
    /// `build.gradle` / `build.gradle.kts` properties.
    GradleScript,
}

impl ManifestSyntax {
    /// The format implementation for this syntax.
    pub fn format(self) -> PatternFormat {
        match self {
            ManifestSyntax::AndroidManifest => PatternFormat::android_manifest(),
            ManifestSyntax::GradleScript => PatternFormat::gradle_script(),
        }
    }
}
