// Model artifact persistence: one self-verifying bincode file plus an
// informational JSON manifest
use anyhow::{anyhow, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use toolrec_core::RecommenderModel;
use tracing::{info, warn};

pub const MODEL_FILENAME: &str = "recommender_model.bin";
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Bumped whenever the serialized model layout changes
pub const FORMAT_VERSION: u32 = 1;

/// On-disk envelope. `payload` is the bincode-encoded model and
/// `checksum` its sha256, so the model file verifies itself.
#[derive(Debug, Serialize, Deserialize)]
struct ModelArtifact {
    format_version: u32,
    checksum: String,
    payload: Vec<u8>,
}

/// Metadata written next to the model file
///
/// Only the model file decides what gets loaded. A manifest that does not
/// describe the current model (left over from an interrupted save) is
/// reported and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub tool_count: usize,
    pub feature_dim: usize,
    pub vocabulary_size: usize,
    pub size: u64,
    pub checksum: String,
}

pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILENAME)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILENAME)
    }

    /// Presence of the model file means "load, skip build"
    pub fn exists(&self) -> bool {
        self.model_path().is_file()
    }

    /// Serialize the model and write it atomically, then the manifest
    pub fn save(&self, model: &RecommenderModel) -> Result<ArtifactManifest> {
        fs::create_dir_all(&self.dir)?;

        let payload =
            bincode::serialize(model).map_err(|e| anyhow!("Serialization error: {}", e))?;
        let artifact = ModelArtifact {
            format_version: FORMAT_VERSION,
            checksum: checksum(&payload),
            payload,
        };
        let data = bincode::serialize(&artifact)
            .map_err(|e| anyhow!("Serialization error: {}", e))?;

        AtomicFile::new(self.model_path(), OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(&data))?;

        let manifest = ArtifactManifest {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            tool_count: model.catalog().len(),
            feature_dim: model.feature_dim(),
            vocabulary_size: model.vectorizer().vocabulary_size(),
            size: data.len() as u64,
            checksum: artifact.checksum,
        };
        let manifest_json = serde_json::to_vec_pretty(&manifest)?;
        AtomicFile::new(self.manifest_path(), OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(&manifest_json))?;

        info!(
            "Model saved to {:?} ({} bytes, sha256 {})",
            self.model_path(),
            manifest.size,
            manifest.checksum
        );
        Ok(manifest)
    }

    pub fn load_manifest(&self) -> Result<Option<ArtifactManifest>> {
        let path = self.manifest_path();
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&data)?))
    }

    /// Load the persisted model without refitting anything
    ///
    /// The embedded checksum is always verified. Returns `Ok(None)` when
    /// no model file exists.
    pub fn load(&self) -> Result<Option<RecommenderModel>> {
        if !self.exists() {
            return Ok(None);
        }

        let data = fs::read(self.model_path())?;
        let artifact: ModelArtifact = bincode::deserialize(&data)
            .map_err(|e| anyhow!("Deserialization error: {}", e))?;
        if artifact.format_version != FORMAT_VERSION {
            return Err(anyhow!(
                "Unsupported artifact format version {} (expected {})",
                artifact.format_version,
                FORMAT_VERSION
            ));
        }

        let actual = checksum(&artifact.payload);
        if actual != artifact.checksum {
            return Err(anyhow!(
                "Checksum mismatch: expected {}, got {}",
                artifact.checksum,
                actual
            ));
        }
        self.check_manifest(&artifact.checksum);

        let model: RecommenderModel = bincode::deserialize(&artifact.payload)
            .map_err(|e| anyhow!("Deserialization error: {}", e))?;
        model.validate()?;

        info!(
            "Model loaded from {:?}: {} tools",
            self.model_path(),
            model.catalog().len()
        );
        Ok(Some(model))
    }

    fn check_manifest(&self, expected: &str) {
        match self.load_manifest() {
            Ok(Some(manifest)) if manifest.checksum == expected => {}
            Ok(Some(manifest)) => warn!(
                "Stale manifest {:?} (sha256 {}), model file has sha256 {}",
                self.manifest_path(),
                manifest.checksum,
                expected
            ),
            Ok(None) => warn!("No manifest next to {:?}", self.model_path()),
            Err(e) => warn!("Unreadable manifest {:?}: {}", self.manifest_path(), e),
        }
    }
}

fn checksum(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
