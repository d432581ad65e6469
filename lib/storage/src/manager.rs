use crate::artifact::{ArtifactManifest, ArtifactStore};
use std::path::{Path, PathBuf};
use toolrec_core::{BuildConfig, Catalog, Error, RecommenderModel, Result};
use tracing::info;

/// Where the served model came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOrigin {
    Loaded,
    Built,
}

/// Owns the data directory and decides between loading and building
pub struct ModelManager {
    data_dir: PathBuf,
    store: ArtifactStore,
    config: BuildConfig,
}

impl ModelManager {
    pub fn new<P: AsRef<Path>>(data_dir: P, config: BuildConfig) -> Result<Self> {
        config.validate()?;
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| Error::Storage(format!("{:?}: {}", data_dir, e)))?;

        Ok(Self {
            store: ArtifactStore::new(&data_dir),
            data_dir,
            config,
        })
    }

    #[inline]
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[inline]
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    #[inline]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn artifact_exists(&self) -> bool {
        self.store.exists()
    }

    /// Read the catalog, fit a model and persist it
    pub fn build<P: AsRef<Path>>(&self, catalog_path: P) -> Result<RecommenderModel> {
        let catalog = Catalog::from_path(catalog_path)?;
        let model = RecommenderModel::build(catalog, self.config.clone())?;
        self.save(&model)?;
        Ok(model)
    }

    pub fn save(&self, model: &RecommenderModel) -> Result<ArtifactManifest> {
        self.store
            .save(model)
            .map_err(|e| Error::Persistence(e.to_string()))
    }

    /// Load the persisted model, if any
    pub fn load(&self) -> Result<Option<RecommenderModel>> {
        self.store
            .load()
            .map_err(|e| Error::CorruptArtifact(e.to_string()))
    }

    /// Load the artifact when present, otherwise build from the catalog.
    /// `rebuild` forces a fresh build even if an artifact exists.
    pub fn load_or_build<P: AsRef<Path>>(
        &self,
        catalog_path: P,
        rebuild: bool,
    ) -> Result<(RecommenderModel, ModelOrigin)> {
        if !rebuild {
            if let Some(model) = self.load()? {
                return Ok((model, ModelOrigin::Loaded));
            }
            info!("No model artifact in {:?}, building", self.data_dir);
        } else {
            info!("Rebuild requested, ignoring any existing artifact");
        }

        let model = self.build(catalog_path)?;
        Ok((model, ModelOrigin::Built))
    }
}
