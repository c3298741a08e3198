use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::{AuditError, Result};
use crate::audit::write_json;
use super::hash::HashEngine;

/// Provenance record binding a dataset and a model artifact by content hash.
///
/// Contains no timestamps or host details: two manifests built over
/// byte-identical files from the same paths serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityManifest {
    pub data_path: String,
    pub data_sha256: String,
    pub model_path: String,
    pub model_sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDigest {
    pub path: String,
    pub sha256: String,
}

impl IntegrityManifest {
    pub fn artifacts(&self) -> BTreeMap<&'static str, ArtifactDigest> {
        let mut artifacts = BTreeMap::new();
        artifacts.insert("data", ArtifactDigest {
            path: self.data_path.clone(),
            sha256: self.data_sha256.clone(),
        });
        artifacts.insert("model", ArtifactDigest {
            path: self.model_path.clone(),
            sha256: self.model_sha256.clone(),
        });
        artifacts
    }

    /// Tags for stamping onto tracked run metadata.
    pub fn tags(&self) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        tags.insert("data_sha256".to_string(), self.data_sha256.clone());
        tags.insert("model_sha256".to_string(), self.model_sha256.clone());
        tags
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, output: impl AsRef<Path>) -> Result<()> {
        write_json(output, self)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AuditError::not_found("Manifest", path),
            _ => AuditError::Io(e),
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Re-hashes each artifact. Absent files are reported as `Missing`; any
    /// other read failure is returned as an error.
    pub fn verify(&self) -> Result<VerificationReport> {
        let mut entries = Vec::new();

        for (name, digest) in self.artifacts() {
            let (status, actual) = match HashEngine::hash_file(&digest.path) {
                Ok(actual) if actual == digest.sha256 => (ArtifactStatus::Match, Some(actual)),
                Ok(actual) => (ArtifactStatus::Mismatch, Some(actual)),
                Err(AuditError::NotFound { .. }) => (ArtifactStatus::Missing, None),
                Err(e) => return Err(e),
            };
            entries.push(ArtifactCheck {
                name: name.to_string(),
                path: digest.path,
                expected: digest.sha256,
                actual,
                status,
            });
        }

        Ok(VerificationReport { entries })
    }
}

pub struct ManifestBuilder;

impl ManifestBuilder {
    pub fn build(data_path: impl AsRef<Path>, model_path: impl AsRef<Path>) -> Result<IntegrityManifest> {
        let data_path = data_path.as_ref();
        let model_path = model_path.as_ref();

        if !data_path.exists() {
            return Err(AuditError::not_found("Dataset", data_path));
        }
        if !model_path.exists() {
            return Err(AuditError::not_found("Model artifact", model_path));
        }

        let data_sha256 = HashEngine::hash_file(data_path)?;
        let model_sha256 = HashEngine::hash_file(model_path)?;
        debug!("Hashed {} -> {}", data_path.display(), data_sha256);
        debug!("Hashed {} -> {}", model_path.display(), model_sha256);

        Ok(IntegrityManifest {
            data_path: data_path.display().to_string(),
            data_sha256,
            model_path: model_path.display().to_string(),
            model_sha256,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStatus {
    Match,
    Mismatch,
    Missing,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactStatus::Match => "match",
            ArtifactStatus::Mismatch => "mismatch",
            ArtifactStatus::Missing => "missing",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactCheck {
    pub name: String,
    pub path: String,
    pub expected: String,
    pub actual: Option<String>,
    pub status: ArtifactStatus,
}

#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub entries: Vec<ArtifactCheck>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.entries.iter().all(|e| e.status == ArtifactStatus::Match)
    }

    pub fn failures(&self) -> Vec<&ArtifactCheck> {
        self.entries.iter().filter(|e| e.status != ArtifactStatus::Match).collect()
    }
}
