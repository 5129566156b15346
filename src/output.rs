//! Artifact output
//!
//! Generated artifacts are handed to an `ArtifactWriter` only after the whole
//! pipeline has succeeded.

use crate::error::Result;
use crate::manifest::{generate, Artifact, DeploymentRequest, GeneratedArtifacts, GeneratorOptions};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

#[cfg_attr(test, mockall::automock)]
pub trait ArtifactWriter {
    fn write_artifact(&self, path: &Path, contents: &str, executable: bool) -> Result<()>;
}

/// Writes whole files, creating parent directories as needed
#[derive(Debug, Default, Clone, Copy)]
pub struct FsWriter;

impl ArtifactWriter for FsWriter {
    fn write_artifact(&self, path: &Path, contents: &str, executable: bool) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;

        #[cfg(unix)]
        if executable {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
        }
        #[cfg(not(unix))]
        let _ = executable;

        debug!(path = %path.display(), bytes = contents.len(), "Wrote artifact");
        Ok(())
    }
}

/// Prints artifacts to stdout instead of writing files
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutWriter;

impl ArtifactWriter for StdoutWriter {
    fn write_artifact(&self, path: &Path, contents: &str, _executable: bool) -> Result<()> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "# Source: {}", path.display())?;
        handle.write_all(contents.as_bytes())?;
        if !contents.ends_with('\n') {
            writeln!(handle)?;
        }
        Ok(())
    }
}

/// Hand every artifact to the writer, manifest first
pub fn write_artifacts(artifacts: &GeneratedArtifacts, writer: &dyn ArtifactWriter) -> Result<Vec<Artifact>> {
    let mut written = Vec::new();
    for artifact in artifacts.iter() {
        writer.write_artifact(&artifact.path, &artifact.contents, artifact.executable)?;
        written.push(artifact.clone());
    }
    info!(count = written.len(), "Artifacts written");
    Ok(written)
}

/// Run the pipeline and write its artifacts. The writer is untouched when
/// any stage fails.
pub fn generate_and_write(
    request: &DeploymentRequest,
    options: &GeneratorOptions,
    writer: &dyn ArtifactWriter,
) -> Result<GeneratedArtifacts> {
    let artifacts = generate(request, options)?;
    write_artifacts(&artifacts, writer)?;
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LokigenError;
    use mockall::predicate::*;
    use tempfile::TempDir;

    fn full_request(dir: &Path) -> DeploymentRequest {
        DeploymentRequest {
            storage_account: Some("acct1".to_string()),
            client_id: Some("cid-123".to_string()),
            subscription_id: Some("sub".to_string()),
            resource_group: Some("rg-obs".to_string()),
            mode: Some("dist".to_string()),
            output_path: Some(dir.join("nested").join("loki.yaml")),
        }
    }

    #[test]
    fn test_fs_writer_writes_manifest_and_script() {
        let temp = TempDir::new().unwrap();
        let artifacts = generate(&full_request(temp.path()), &GeneratorOptions::default()).unwrap();
        let written = write_artifacts(&artifacts, &FsWriter).unwrap();
        assert_eq!(written.len(), 2);

        let manifest = fs::read_to_string(temp.path().join("nested/loki.yaml")).unwrap();
        assert!(manifest.contains("acct1"));

        let script_path = temp.path().join("nested/loki-provision.sh");
        let script = fs::read_to_string(&script_path).unwrap();
        assert!(script.contains("rg-obs"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&script_path).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn test_manifest_written_before_script() {
        let temp = TempDir::new().unwrap();
        let artifacts = generate(&full_request(temp.path()), &GeneratorOptions::default()).unwrap();

        let mut seq = mockall::Sequence::new();
        let mut writer = MockArtifactWriter::new();
        writer
            .expect_write_artifact()
            .with(always(), always(), eq(false))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        writer
            .expect_write_artifact()
            .with(always(), always(), eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        write_artifacts(&artifacts, &writer).unwrap();
    }

    #[test]
    fn test_write_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let artifacts = generate(&full_request(temp.path()), &GeneratorOptions::default()).unwrap();

        let mut writer = MockArtifactWriter::new();
        writer
            .expect_write_artifact()
            .times(1)
            .returning(|_, _, _| Err(LokigenError::config("disk full")));

        assert!(write_artifacts(&artifacts, &writer).is_err());
    }

    #[test]
    fn test_writer_untouched_when_validation_fails() {
        let temp = TempDir::new().unwrap();
        let mut writer = MockArtifactWriter::new();
        writer.expect_write_artifact().times(0);

        let missing_client = DeploymentRequest {
            client_id: None,
            ..full_request(temp.path())
        };
        let err = generate_and_write(&missing_client, &GeneratorOptions::default(), &writer).unwrap_err();
        assert!(matches!(err, LokigenError::MissingRequiredField { ref field } if field == "clientId"));

        let bad_mode = DeploymentRequest {
            mode: Some("hybrid".to_string()),
            ..full_request(temp.path())
        };
        let err = generate_and_write(&bad_mode, &GeneratorOptions::default(), &writer).unwrap_err();
        assert!(matches!(err, LokigenError::InvalidMode { .. }));
    }

    #[test]
    fn test_generate_and_write_hands_over_every_artifact() {
        let temp = TempDir::new().unwrap();
        let mut writer = MockArtifactWriter::new();
        writer.expect_write_artifact().times(2).returning(|_, _, _| Ok(()));

        let artifacts = generate_and_write(&full_request(temp.path()), &GeneratorOptions::default(), &writer).unwrap();
        assert!(artifacts.provisioning_script.is_some());
    }
}
