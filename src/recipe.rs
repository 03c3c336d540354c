use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The slice of a catalog recipe that cook mode and serving scaling read.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub servings: Option<u32>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

impl Recipe {
    pub fn load(path: &Path) -> Result<Self, String> {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read recipe {}: {}", path.display(), e))?;
        serde_json::from_str(&raw).map_err(|e| format!("Failed to parse recipe: {}", e))
    }
}
