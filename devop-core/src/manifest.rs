//! Manifest parsing
//!
//! Manifests are plain-text files listing one job per line, with fields
//! separated by whitespace:
//! - Build manifests: `<buildConfigId> [branch]`
//! - Deploy manifests: `<project> <version>`
//!
//! Blank lines and lines starting with `#` are ignored.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::job::JobDescriptor;
use crate::domain::release::ReleaseItem;

/// Errors raised while reading a manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read
    #[error("Failed to read manifest {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line does not have the expected shape
    #[error("Malformed manifest line {line_number} `{line}`: {reason}")]
    MalformedLine {
        line_number: usize,
        line: String,
        reason: String,
    },
}

/// Parse build manifest content into job descriptors
pub fn parse_build_manifest(content: &str) -> Result<Vec<JobDescriptor>, ManifestError> {
    significant_lines(content)
        .map(|(line_number, line)| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [id] => Ok(JobDescriptor::new(*id, "")),
                [id, branch] => Ok(JobDescriptor::new(*id, *branch)),
                _ => Err(malformed(
                    line_number,
                    line,
                    "expected `<build id> [branch]`",
                )),
            }
        })
        .collect()
}

/// Parse deploy manifest content into release items
pub fn parse_deploy_manifest(content: &str) -> Result<Vec<ReleaseItem>, ManifestError> {
    significant_lines(content)
        .map(|(line_number, line)| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [project, version] => Ok(ReleaseItem::new(*project, *version)),
                _ => Err(malformed(
                    line_number,
                    line,
                    "you must specify project and version",
                )),
            }
        })
        .collect()
}

/// Read and parse a build manifest file
pub fn read_build_manifest(path: impl AsRef<Path>) -> Result<Vec<JobDescriptor>, ManifestError> {
    parse_build_manifest(&read(path.as_ref())?)
}

/// Read and parse a deploy manifest file
pub fn read_deploy_manifest(path: impl AsRef<Path>) -> Result<Vec<ReleaseItem>, ManifestError> {
    parse_deploy_manifest(&read(path.as_ref())?)
}

fn read(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Non-blank, non-comment lines with their 1-based line numbers
fn significant_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn malformed(line_number: usize, line: &str, reason: &str) -> ManifestError {
    ManifestError::MalformedLine {
        line_number,
        line: line.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_build_manifest_branch_is_optional() {
        let descriptors = parse_build_manifest("svc-a main\nsvc-b\n").unwrap();
        assert_eq!(
            descriptors,
            vec![
                JobDescriptor::new("svc-a", "main"),
                JobDescriptor::new("svc-b", ""),
            ]
        );
    }

    #[test]
    fn test_build_manifest_skips_blank_and_comment_lines() {
        let descriptors = parse_build_manifest("# nightly\n\nsvc-a\r\n   \nsvc-b dev\n").unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[1].parameter, "dev");
    }

    #[test]
    fn test_build_manifest_rejects_extra_fields() {
        let err = parse_build_manifest("svc-a\nsvc-b main extra\n").unwrap_err();
        match err {
            ManifestError::MalformedLine { line_number, .. } => assert_eq!(line_number, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_deploy_manifest_line() {
        let items = parse_deploy_manifest("payments 2.3.1").unwrap();
        assert_eq!(items, vec![ReleaseItem::new("payments", "2.3.1")]);
    }

    #[test]
    fn test_deploy_manifest_requires_two_fields() {
        assert!(parse_deploy_manifest("payments").is_err());
        assert!(parse_deploy_manifest("payments 2.3.1 staging").is_err());
    }

    #[test]
    fn test_parsing_file_twice_is_identical() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "svc-a main").unwrap();
        writeln!(file, "svc-b").unwrap();

        let first = read_build_manifest(file.path()).unwrap();
        let second = read_build_manifest(file.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_deploy_manifest("/nonexistent/deploy.txt").unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/deploy.txt"));
    }
}
