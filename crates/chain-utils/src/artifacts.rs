//! Contract artifacts keyed by contract kind. Kinds are the contract names
//! Foundry uses, e.g. `YieldVault` for `out/YieldVault.sol/YieldVault.json`.
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use ethers::{
    abi::Abi,
    types::{Bytes, H256},
    utils::{hex, keccak256},
};
use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use tracing::{debug, warn};

/// The ABI and creation bytecode of a contract.
#[derive(Clone, Debug, PartialEq)]
pub struct Artifact {
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn new(abi: Abi, bytecode: Bytes) -> Self {
        Self { abi, bytecode }
    }

    /// The keccak hash of the creation bytecode.
    pub fn bytecode_hash(&self) -> H256 {
        H256::from(keccak256(&self.bytecode))
    }
}

#[derive(Deserialize)]
struct ForgeArtifact {
    abi: Abi,
    bytecode: ForgeBytecode,
}

#[derive(Deserialize)]
struct ForgeBytecode {
    object: String,
}

#[derive(Clone, Debug, Default)]
pub struct ArtifactRegistry {
    artifacts: BTreeMap<String, Artifact>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every deployable artifact in a Foundry output directory.
    /// Interfaces, abstract contracts and contracts with unlinked libraries
    /// have no usable creation bytecode and are skipped. Build metadata and
    /// other JSON files that aren't artifacts are skipped too.
    pub fn load_forge(out_dir: impl AsRef<Path>) -> Result<Self> {
        let out_dir = out_dir.as_ref();
        let mut paths = Vec::new();
        collect_json_files(out_dir, &mut paths)
            .wrap_err_with(|| format!("couldn't read artifacts in {}", out_dir.display()))?;
        paths.sort();

        let mut registry = Self::new();
        for path in paths {
            let Some(kind) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let contents = fs::read_to_string(&path)
                .wrap_err_with(|| format!("couldn't read {}", path.display()))?;
            let Ok(artifact) = serde_json::from_str::<ForgeArtifact>(&contents) else {
                continue;
            };
            let object = artifact.bytecode.object.trim_start_matches("0x");
            if object.is_empty() {
                continue;
            }
            let Ok(bytecode) = hex::decode(object) else {
                debug!(path = %path.display(), "skipping artifact with unlinked bytecode");
                continue;
            };

            // Foundry writes a contract name once per source file that
            // declares it, so the same name can show up twice.
            if registry.contains(kind) {
                warn!(
                    contract_kind = kind,
                    path = %path.display(),
                    "ignoring duplicate artifact"
                );
                continue;
            }
            registry.insert(kind, Artifact::new(artifact.abi, bytecode.into()));
        }
        debug!(
            out_dir = %out_dir.display(),
            artifacts = registry.len(),
            "loaded artifacts"
        );

        Ok(registry)
    }

    pub fn insert(&mut self, contract_kind: impl Into<String>, artifact: Artifact) {
        self.artifacts.insert(contract_kind.into(), artifact);
    }

    pub fn get(&self, contract_kind: &str) -> Result<&Artifact> {
        self.artifacts
            .get(contract_kind)
            .ok_or_else(|| eyre!("no artifact for contract kind {:?}", contract_kind))
    }

    pub fn contains(&self, contract_kind: &str) -> bool {
        self.artifacts.contains_key(contract_kind)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

fn collect_json_files(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(&path, paths)?;
        } else if path.extension().is_some_and(|extension| extension == "json") {
            paths.push(path);
        }
    }
    Ok(())
}
