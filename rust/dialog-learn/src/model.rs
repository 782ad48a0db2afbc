//! Opaque model blobs.
//!
//! Models are encoded as DAG-CBOR. Floats travel as 64-bit values, so every
//! `f32` weight decodes to exactly the value that was encoded.

use serde::{Serialize, de::DeserializeOwned};

use crate::LearnError;

/// Encodes `value` into a model blob.
pub fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, LearnError> {
    serde_ipld_dagcbor::to_vec(value)
        .map_err(|e| LearnError::Codec(format!("Failed to encode model: {}", e)))
}

/// Decodes a model blob produced by [`to_bytes`].
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LearnError> {
    serde_ipld_dagcbor::from_slice(bytes)
        .map_err(|e| LearnError::Codec(format!("Failed to decode model: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FeatureMap, LabelMap};

    #[test]
    fn vocabularies_survive_a_round_trip() -> anyhow::Result<()> {
        let mut features = FeatureMap::new(1);
        features.add(0, "the");
        features.add(0, "the");
        features.add(2, "dog");

        let labels: LabelMap = ["NN", "VB", "DT"].into_iter().collect();

        let restored: FeatureMap = from_bytes(&to_bytes(&features)?)?;
        assert_eq!(restored, features);
        assert_eq!(restored.index(0, "the"), Some(1));

        let restored: LabelMap = from_bytes(&to_bytes(&labels)?)?;
        assert_eq!(restored, labels);
        Ok(())
    }

    #[test]
    fn garbage_is_a_codec_error() {
        let result: Result<LabelMap, _> = from_bytes(&[0xff, 0x00, 0x13]);
        assert!(matches!(result, Err(LearnError::Codec(_))));
    }
}
