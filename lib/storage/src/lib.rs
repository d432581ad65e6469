pub mod artifact;
pub mod manager;

pub use artifact::{
    ArtifactManifest, ArtifactStore, FORMAT_VERSION, MANIFEST_FILENAME, MODEL_FILENAME,
};
pub use manager::{ModelManager, ModelOrigin};
