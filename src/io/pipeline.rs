//! Byte-handle pipeline (§4.6, §6.2 `byteHandlePipeline`): an ordered,
//! configurable sequence of transforms applied to a page's bytes before
//! it is written, and inverted on read. Compression runs before
//! encryption so the compressor sees plaintext structure.

use super::compression;
use super::encryption::{self, EncryptionError, ResourceKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineComponent {
    Compression,
    Encryption,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("compression stage failed: {0}")]
    Compression(#[from] std::io::Error),
    #[error("encryption stage failed: {0}")]
    Encryption(#[from] EncryptionError),
}

/// An ordered list of pipeline components, per resource configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BytePipeline {
    pub components: Vec<PipelineComponent>,
}

impl BytePipeline {
    #[must_use]
    pub const fn none() -> Self {
        Self { components: Vec::new() }
    }

    #[must_use]
    pub fn compression_only() -> Self {
        Self { components: vec![PipelineComponent::Compression] }
    }

    #[must_use]
    pub fn compression_then_encryption() -> Self {
        Self { components: vec![PipelineComponent::Compression, PipelineComponent::Encryption] }
    }

    /// Applies each component in configured order.
    ///
    /// # Errors
    /// Propagates the first stage's failure.
    pub fn encode(&self, bytes: &[u8], key: Option<&ResourceKey>) -> Result<Vec<u8>, PipelineError> {
        let mut out = bytes.to_vec();
        for component in &self.components {
            out = match component {
                PipelineComponent::Compression => compression::compress(&out)?,
                PipelineComponent::Encryption => {
                    let key = key.expect("encryption component requires a resource key");
                    encryption::encrypt(key, &out)?
                }
            };
        }
        Ok(out)
    }

    /// Applies each component in reverse order.
    ///
    /// # Errors
    /// Propagates the first stage's failure.
    pub fn decode(&self, bytes: &[u8], key: Option<&ResourceKey>) -> Result<Vec<u8>, PipelineError> {
        let mut out = bytes.to_vec();
        for component in self.components.iter().rev() {
            out = match component {
                PipelineComponent::Compression => compression::decompress(&out)?,
                PipelineComponent::Encryption => {
                    let key = key.expect("encryption component requires a resource key");
                    encryption::decrypt(key, &out)?
                }
            };
        }
        Ok(out)
    }
}
