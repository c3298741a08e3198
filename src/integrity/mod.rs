mod hash;
mod manifest;

pub use hash::{HashEngine, CHUNK_SIZE};
pub use manifest::{
    IntegrityManifest, ArtifactDigest, ManifestBuilder,
    ArtifactStatus, ArtifactCheck, VerificationReport,
};
