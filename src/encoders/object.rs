use serde::Serialize;
use std::fs;
use std::path::Path;

use super::EncodingError;

/// Object-safe view of a serializable value, encoded with bincode.
pub trait Persist {
    fn to_bytes(&self) -> bincode::Result<Vec<u8>>;
}

impl<T: Serialize> Persist for T {
    fn to_bytes(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }
}

pub fn encode(value: &dyn Persist, destination: &Path) -> Result<(), EncodingError> {
    let bytes = value.to_bytes()?;
    fs::write(destination, bytes).map_err(|e| EncodingError::io(destination, e))
}
