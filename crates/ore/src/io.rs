//! Reading and writing artifacts.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::MifeError;

/// Writes `artifact` to `path`.
pub fn write_artifact<T: Serialize>(
    path: impl AsRef<Path>,
    artifact: &T,
) -> Result<(), MifeError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, artifact)?;
    writer.flush()?;

    debug!(path = %path.display(), "wrote artifact");

    Ok(())
}

/// Reads an artifact from `path`.
pub fn read_artifact<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, MifeError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let artifact = bincode::deserialize_from(reader)?;

    debug!(path = %path.display(), "read artifact");

    Ok(artifact)
}

/// Serializes `artifact` to bytes.
pub fn to_bytes<T: Serialize>(artifact: &T) -> Result<Vec<u8>, MifeError> {
    Ok(bincode::serialize(artifact)?)
}

/// Deserializes an artifact from bytes.
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, MifeError> {
    Ok(bincode::deserialize(bytes)?)
}
