//! The artifact bundle: classifier, encoding registry and normalizer saved
//! and loaded as one unit.
//!
//! The classifier's input space is defined entirely by the registry that
//! produced the codes and the normalizer that scaled them, so the three are
//! never persisted or restored separately. A bundle is immutable after it is
//! built; re-training produces a new bundle which replaces the old file
//! wholesale.
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::encoding::EncodingRegistry;
use crate::error::{PipelineError, Result};
use crate::features::{feature_names, FEATURE_COUNT};
use crate::models::GBDTClassifier;
use crate::preprocessing::Normalizer;
use crate::schema::attribute_names;

/// Version of the on-disk bundle layout.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Metadata stored in front of the fitted components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleHeader {
    pub format_version: u32,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// Attribute names in base vector order.
    pub attributes: Vec<String>,
    /// Feature names in synthesized vector order.
    pub features: Vec<String>,
}

impl BundleHeader {
    fn current() -> Self {
        BundleHeader {
            format_version: BUNDLE_FORMAT_VERSION,
            created_at: chrono::Utc::now().to_rfc3339(),
            attributes: attribute_names(),
            features: feature_names(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArtifactBundle {
    header: BundleHeader,
    registry: EncodingRegistry,
    normalizer: Normalizer,
    classifier: GBDTClassifier,
}

impl ArtifactBundle {
    /// Assemble a bundle from components fitted in the same training run.
    ///
    /// Fails with [`PipelineError::SchemaMismatch`] when the components do
    /// not agree with the compiled schema or with each other.
    pub fn new(classifier: GBDTClassifier, registry: EncodingRegistry, normalizer: Normalizer) -> Result<Self> {
        let bundle = ArtifactBundle {
            header: BundleHeader::current(),
            registry,
            normalizer,
            classifier,
        };
        bundle.check_consistency().map_err(PipelineError::SchemaMismatch)?;
        Ok(bundle)
    }

    pub fn header(&self) -> &BundleHeader {
        &self.header
    }

    pub fn registry(&self) -> &EncodingRegistry {
        &self.registry
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn classifier(&self) -> &GBDTClassifier {
        &self.classifier
    }

    fn check_consistency(&self) -> std::result::Result<(), String> {
        if self.header.format_version != BUNDLE_FORMAT_VERSION {
            return Err(format!(
                "bundle format version {} is not supported (expected {})",
                self.header.format_version, BUNDLE_FORMAT_VERSION
            ));
        }
        if self.header.attributes != attribute_names() {
            return Err(format!(
                "bundle was trained on attributes {:?}, which differ from the current schema",
                self.header.attributes
            ));
        }
        if self.header.features != feature_names() {
            return Err(format!(
                "bundle was trained on {} features {:?}, which differ from the current {} features",
                self.header.features.len(),
                self.header.features,
                FEATURE_COUNT
            ));
        }
        self.registry.check_schema()?;
        self.normalizer.check_width(FEATURE_COUNT)?;
        if !self.classifier.is_fitted() {
            return Err("bundle holds an unfitted classifier".to_string());
        }
        if self.classifier.feature_size() != FEATURE_COUNT {
            return Err(format!(
                "classifier was fitted on {} features, expected {}",
                self.classifier.feature_size(),
                FEATURE_COUNT
            ));
        }
        Ok(())
    }

    /// Serialize the bundle to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize and validate a bundle; `source` only labels errors.
    pub fn from_bytes(bytes: &[u8], source: &Path) -> Result<Self> {
        let bundle: ArtifactBundle = serde_json::from_slice(bytes)
            .map_err(|e| PipelineError::artifact_load(source, format!("corrupt or truncated bundle: {}", e)))?;
        bundle
            .check_consistency()
            .map_err(|reason| PipelineError::artifact_load(source, format!("incompatible bundle: {}", reason)))?;
        Ok(bundle)
    }

    /// Atomically write the bundle to `destination`.
    ///
    /// The JSON goes to a temporary file in the destination directory, is
    /// synced, and is then renamed over `destination`. Readers see either the
    /// previous bundle or the new one, never a partial write.
    pub fn save<P: AsRef<Path>>(&self, destination: P) -> Result<()> {
        let destination = destination.as_ref();
        let save_err = |source: std::io::Error| PipelineError::ArtifactSave {
            path: destination.to_path_buf(),
            source,
        };

        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(save_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(save_err)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, self)?;
            writer.flush().map_err(save_err)?;
        }
        tmp.as_file().sync_all().map_err(save_err)?;
        tmp.persist(destination).map_err(|e| save_err(e.error))?;

        log::info!("Saved artifact bundle to {}", destination.display());
        Ok(())
    }

    /// Load and validate a bundle written by [`ArtifactBundle::save`].
    pub fn load<P: AsRef<Path>>(source: P) -> Result<Self> {
        let source = source.as_ref();
        let bytes = fs::read(source).map_err(|e| PipelineError::artifact_load(source, e.to_string()))?;
        let bundle = Self::from_bytes(&bytes, source)?;
        log::info!(
            "Loaded artifact bundle from {} (created {})",
            source.display(),
            bundle.header.created_at
        );
        Ok(bundle)
    }
}

/// Bundle the three fitted components and persist them atomically.
pub fn save<P: AsRef<Path>>(
    classifier: GBDTClassifier,
    registry: EncodingRegistry,
    normalizer: Normalizer,
    destination: P,
) -> Result<ArtifactBundle> {
    let bundle = ArtifactBundle::new(classifier, registry, normalizer)?;
    bundle.save(destination)?;
    Ok(bundle)
}

pub fn load<P: AsRef<Path>>(source: P) -> Result<ArtifactBundle> {
    ArtifactBundle::load(source)
}
