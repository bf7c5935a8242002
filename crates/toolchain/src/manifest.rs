//! File-backed manifest editor.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use pipeline::{
    ManifestEditor, ManifestFormat, ManifestSyntax, PublishError, VersionDescriptor,
};

/// Reads and patches a manifest file on disk through a [`ManifestFormat`].
pub struct FileManifestEditor {
    format: Box<dyn ManifestFormat>,
}

impl FileManifestEditor {
    /// Creates an editor for an arbitrary format.
    pub fn new(format: impl ManifestFormat + 'static) -> Self {
        Self {
            format: Box::new(format),
        }
    }

    /// Creates an editor for one of the built-in syntaxes.
    pub fn for_syntax(syntax: ManifestSyntax) -> Self {
        Self::new(syntax.format())
    }

    fn load(path: &Path) -> Result<String, PublishError> {
        fs::read_to_string(path)
            .map_err(|e| PublishError::io(format!("cannot read manifest {}", path.display()), e))
    }
}

impl ManifestEditor for FileManifestEditor {
    fn read(&self, path: &Path) -> Result<VersionDescriptor, PublishError> {
        info!(path = %path.display(), "reading manifest");
        let text = Self::load(path)?;
        let descriptor = self
            .format
            .parse(&text)
            .map_err(|source| PublishError::ManifestParse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            version_name = %descriptor.name,
            version_code = %descriptor.code,
            "manifest version"
        );
        Ok(descriptor)
    }

    fn write(&self, path: &Path, descriptor: &VersionDescriptor) -> Result<(), PublishError> {
        let text = Self::load(path)?;
        let patched = self
            .format
            .patch(&text, descriptor)
            .map_err(|source| PublishError::ManifestParse {
                path: path.to_path_buf(),
                source,
            })?;

        make_owner_writable(path).map_err(|e| {
            PublishError::io(format!("cannot change mode of {}", path.display()), e)
        })?;
        fs::write(path, patched)
            .map_err(|e| PublishError::io(format!("cannot write manifest {}", path.display()), e))?;

        debug!(path = %path.display(), tag = %descriptor.tag(), "manifest updated");
        Ok(())
    }
}

#[cfg(unix)]
fn make_owner_writable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn make_owner_writable(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    permissions.set_readonly(false);
    fs::set_permissions(path, permissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::{ManifestError, VersionCode, VersionName};

    const MANIFEST: &str = "<manifest\n    android:versionCode=\"40\"\n    android:versionName=\"2.3.1\">\n</manifest>\n";

    fn write_manifest(dir: &tempfile::TempDir, text: &str) -> std::path::PathBuf {
        let path = dir.path().join("AndroidManifest.xml");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn read_returns_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(&dir, MANIFEST);
        let editor = FileManifestEditor::for_syntax(ManifestSyntax::AndroidManifest);

        let d = editor.read(&path).unwrap();
        assert_eq!(d.name, VersionName::new(2, 3, 1));
        assert_eq!(d.code, VersionCode::new(40));
    }

    #[test]
    fn write_rewrites_only_field_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(&dir, MANIFEST);
        let editor = FileManifestEditor::for_syntax(ManifestSyntax::AndroidManifest);

        let mut d = editor.read(&path).unwrap();
        d.code = VersionCode::new(41);
        editor.write(&path, &d).unwrap();

        let after = fs::read_to_string(&path).unwrap();
        assert_eq!(after, MANIFEST.replace("\"40\"", "\"41\""));
    }

    #[cfg(unix)]
    #[test]
    fn write_makes_read_only_file_owner_writable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(&dir, MANIFEST);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();

        let editor = FileManifestEditor::for_syntax(ManifestSyntax::AndroidManifest);
        let d = VersionDescriptor::new(VersionName::new(2, 3, 1), VersionCode::new(41));
        editor.write(&path, &d).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn read_reports_missing_field_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(&dir, "<manifest android:versionName=\"1.0.0\"/>");
        let editor = FileManifestEditor::for_syntax(ManifestSyntax::AndroidManifest);

        match editor.read(&path).unwrap_err() {
            PublishError::ManifestParse { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(
                    source,
                    ManifestError::FieldMissing {
                        field: "versionCode"
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let editor = FileManifestEditor::for_syntax(ManifestSyntax::AndroidManifest);
        let err = editor.read(&dir.path().join("nope.xml")).unwrap_err();
        assert!(matches!(err, PublishError::Io { .. }));
    }

    #[test]
    fn failed_patch_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let original = "<manifest android:versionName=\"1.0.0\"/>";
        let path = write_manifest(&dir, original);
        let editor = FileManifestEditor::for_syntax(ManifestSyntax::AndroidManifest);

        let d = VersionDescriptor::new(VersionName::new(1, 0, 0), VersionCode::new(2));
        assert!(editor.write(&path, &d).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }
}
