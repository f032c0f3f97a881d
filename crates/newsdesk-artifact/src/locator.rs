use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::ArtifactError;

/// Where a remote artifact lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactLocator {
    /// `s3://bucket/key`
    S3 { bucket: String, key: String },
    /// `http://…` or `https://…`
    Http(String),
    /// `file://path` or a bare filesystem path.
    Local(PathBuf),
}

impl FromStr for ArtifactLocator {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ArtifactError::InvalidLocator {
            locator: s.to_string(),
            reason,
        };

        if let Some(rest) = s.strip_prefix("s3://") {
            let (bucket, key) = rest.split_once('/').ok_or_else(|| invalid("missing object key"))?;
            if bucket.is_empty() {
                return Err(invalid("missing bucket name"));
            }
            if key.is_empty() {
                return Err(invalid("missing object key"));
            }
            return Ok(Self::S3 {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(Self::Http(s.to_string()));
        }
        let path = s.strip_prefix("file://").unwrap_or(s);
        if path.is_empty() {
            return Err(invalid("empty path"));
        }
        Ok(Self::Local(PathBuf::from(path)))
    }
}

impl fmt::Display for ArtifactLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S3 { bucket, key } => write!(f, "s3://{bucket}/{key}"),
            Self::Http(url) => f.write_str(url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}
