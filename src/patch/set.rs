use super::Patch;
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// An ordered collection of patches, stored as one JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchSet {
    pub name: String,
    patches: Vec<Patch>,
}

impl PatchSet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            patches: Vec::new(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read patch file {}", path.display()))?;
        let set: PatchSet =
            serde_json::from_str(&content).context("Failed to parse patch JSON")?;

        for patch in &set.patches {
            if !patch.params.chain_params.is_consistent() {
                warn!(
                    "Patch '{}' has positional chain fields that disagree with its position list",
                    patch.name
                );
            }
        }

        debug!("Loaded {} patches from {:?}", set.patches.len(), path);
        Ok(set)
    }

    pub fn store<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create output directory")?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize patches")?;
        fs::write(path, json).context("Failed to write patch file")?;

        debug!("Saved {} patches to {:?}", self.patches.len(), path);
        Ok(())
    }

    pub fn add_patch(&mut self, patch: Patch) {
        self.patches.push(patch);
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn get_patch_by_name(&self, name: &str) -> Option<&Patch> {
        self.patches.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}
