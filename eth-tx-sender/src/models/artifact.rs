use alloy::{json_abi::JsonAbi, primitives::Bytes};
use serde::{Deserialize, Deserializer};
use std::{fs, path::Path};

/// Compiled contract artifact
///
/// Accepts the JSON emitted by Truffle and Hardhat (`"bytecode": "0x..."`) as
/// well as Foundry (`"bytecode": {"object": "0x..."}`). Other fields in the
/// file are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractArtifact {
    /// Contract ABI
    pub abi: JsonAbi,

    /// Creation bytecode
    #[serde(deserialize_with = "deserialize_bytecode")]
    pub bytecode: Bytes,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Raw(Bytes),
    Object { object: Bytes },
}

fn deserialize_bytecode<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match BytecodeField::deserialize(deserializer)? {
        BytecodeField::Raw(bytes) => bytes,
        BytecodeField::Object { object } => object,
    })
}

impl ContractArtifact {
    /// Parse an artifact from its JSON text
    pub fn from_json(json: &str) -> eyre::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse an artifact file
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read artifact {}: {e}", path.display()))?;
        Self::from_json(&json)
    }
}
