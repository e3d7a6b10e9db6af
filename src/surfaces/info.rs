use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::{AssetKind, AssetScope, ResolvedAsset};

/// 클라이언트 UI에 내려주는 JSON 정보 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub folder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    pub assets: Vec<AssetEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub kind: AssetKind,
    pub scope: AssetScope,
    pub preview: bool,
    pub path: String,
    pub size_bytes: u64,
    pub extension: String,
    pub mime_type: String,
}

impl From<&ResolvedAsset> for AssetEntry {
    fn from(asset: &ResolvedAsset) -> Self {
        Self {
            kind: asset.kind,
            scope: asset.scope,
            preview: asset.preview,
            path: asset.absolute_path.display().to_string(),
            size_bytes: asset.size_bytes,
            extension: asset.extension.clone(),
            mime_type: asset.mime_type().to_string(),
        }
    }
}

impl AssetInfo {
    pub fn new(folder: &Path, track: Option<&Path>, assets: &[ResolvedAsset]) -> Self {
        Self {
            folder: folder.display().to_string(),
            track: track.map(|t| t.display().to_string()),
            assets: assets.iter().map(AssetEntry::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
