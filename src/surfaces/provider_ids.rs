use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::models::{AssetKind, ResolvedAsset};

/// 메타데이터 항목에 붙이는 provider id 키/값 묶음.
/// 해석되지 않은 종류는 키를 하나도 남기지 않는다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProviderIds(BTreeMap<String, String>);

impl ProviderIds {
    pub fn from_assets(assets: &[ResolvedAsset]) -> Self {
        let mut ids = BTreeMap::new();
        for asset in assets {
            let key = asset.kind.provider_key();
            let path = asset.absolute_path.display().to_string();
            if asset.preview {
                ids.insert(format!("{}PreviewPath", key), path);
            } else {
                ids.insert(key.to_string(), "true".to_string());
                ids.insert(format!("{}Path", key), path);
                ids.insert(format!("{}Scope", key), asset.scope.label().to_string());
            }
        }
        Self(ids)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn has(&self, kind: AssetKind) -> bool {
        self.get(kind.provider_key()) == Some("true")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 키/값을 평평한 JSON 객체로 직렬화한다.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetScope;
    use std::path::PathBuf;

    fn asset(kind: AssetKind, scope: AssetScope, path: &str, preview: bool) -> ResolvedAsset {
        ResolvedAsset {
            kind,
            scope,
            absolute_path: PathBuf::from(path),
            size_bytes: 1,
            extension: ".gif".to_string(),
            preview,
        }
    }

    #[test]
    fn test_from_assets() {
        let ids = ProviderIds::from_assets(&[
            asset(AssetKind::Cover, AssetScope::Album, "/a/cover-animated.gif", false),
            asset(AssetKind::Cover, AssetScope::Album, "/a/cover-animated-preview.jpg", true),
            asset(
                AssetKind::VerticalBackground,
                AssetScope::Track,
                "/a/vertical-background-x.mp4",
                false,
            ),
        ]);

        assert!(ids.has(AssetKind::Cover));
        assert!(ids.has(AssetKind::VerticalBackground));
        assert!(!ids.has(AssetKind::CoverTall));
        assert_eq!(ids.get("AnimatedCoverPath"), Some("/a/cover-animated.gif"));
        assert_eq!(ids.get("AnimatedCoverScope"), Some("album"));
        assert_eq!(
            ids.get("AnimatedCoverPreviewPath"),
            Some("/a/cover-animated-preview.jpg")
        );
        assert_eq!(ids.get("VerticalBackgroundScope"), Some("track"));
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn test_json_is_flat_object() {
        let ids = ProviderIds::from_assets(&[asset(
            AssetKind::Cover,
            AssetScope::Track,
            "/a/cover-animated-x.gif",
            false,
        )]);
        let value: serde_json::Value = serde_json::from_str(&ids.to_json().unwrap()).unwrap();

        assert_eq!(value["AnimatedCover"], "true");
        assert_eq!(value["AnimatedCoverPath"], "/a/cover-animated-x.gif");
        assert_eq!(value["AnimatedCoverScope"], "track");
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_empty() {
        let ids = ProviderIds::from_assets(&[]);
        assert!(ids.is_empty());
        assert!(!ids.has(AssetKind::Cover));
    }
}
