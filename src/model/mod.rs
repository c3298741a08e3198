mod predictor;
mod artifact;

pub use predictor::Predictor;
pub use artifact::ModelArtifact;
