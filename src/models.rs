use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 앨범 폴더 옆에 놓이는 애니메이션 에셋의 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Cover,
    CoverTall,
    VerticalBackground,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [
        AssetKind::Cover,
        AssetKind::CoverTall,
        AssetKind::VerticalBackground,
    ];

    /// 설정에 base name이 없을 때 쓰는 기본 파일명 stem.
    pub fn default_base_name(self) -> &'static str {
        match self {
            AssetKind::Cover => "cover-animated",
            AssetKind::CoverTall => "cover-animated-tall",
            AssetKind::VerticalBackground => "vertical-background",
        }
    }

    /// 메타데이터 provider id 키 접두어.
    pub fn provider_key(self) -> &'static str {
        match self {
            AssetKind::Cover => "AnimatedCover",
            AssetKind::CoverTall => "AnimatedCoverTall",
            AssetKind::VerticalBackground => "VerticalBackground",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Cover => "cover",
            AssetKind::CoverTall => "cover-tall",
            AssetKind::VerticalBackground => "vertical-background",
        }
    }

    /// CLI 인자 등에서 받은 문자열을 파싱한다 (대소문자, `-`/`_` 무시).
    pub fn parse(s: &str) -> Option<AssetKind> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        AssetKind::ALL
            .into_iter()
            .find(|kind| kind.label() == normalized)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 실제로 찾은 에셋이 앨범 단위인지 트랙 전용인지.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetScope {
    Album,
    Track,
}

impl AssetScope {
    pub fn label(self) -> &'static str {
        match self {
            AssetScope::Album => "album",
            AssetScope::Track => "track",
        }
    }
}

impl fmt::Display for AssetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 해석이 끝난 에셋 파일 하나. 호출마다 새로 만들어지며 캐시하지 않는다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub kind: AssetKind,
    pub scope: AssetScope,
    pub absolute_path: PathBuf,
    pub size_bytes: u64,
    /// 소문자, 점 포함 (예: `.gif`).
    pub extension: String,
    /// 정적 첫 프레임 이미지(preview)이면 true.
    pub preview: bool,
}

impl ResolvedAsset {
    pub fn filename(&self) -> &str {
        self.absolute_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
    }

    pub fn mime_type(&self) -> &'static str {
        crate::core::mime::mime_for_extension(&self.extension)
    }

    pub fn summary(&self) -> String {
        let role = if self.preview { " preview" } else { "" };
        format!(
            "{}{} [{}] {} ({})",
            self.kind,
            role,
            self.scope,
            self.filename(),
            human_size(self.size_bytes)
        )
    }
}

/// 바이트 수를 사람이 읽기 쉬운 단위로 표시한다.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(AssetKind::parse("cover"), Some(AssetKind::Cover));
        assert_eq!(AssetKind::parse("Cover_Tall"), Some(AssetKind::CoverTall));
        assert_eq!(
            AssetKind::parse("vertical-background"),
            Some(AssetKind::VerticalBackground)
        );
        assert_eq!(AssetKind::parse("backdrop"), None);
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2 * 1024 * 1024), "2.0 MB");
    }

    #[test]
    fn test_summary() {
        let asset = ResolvedAsset {
            kind: AssetKind::Cover,
            scope: AssetScope::Album,
            absolute_path: PathBuf::from("/music/a/cover-animated.gif"),
            size_bytes: 2048,
            extension: ".gif".to_string(),
            preview: false,
        };
        assert_eq!(asset.summary(), "cover [album] cover-animated.gif (2.0 KB)");
        assert_eq!(asset.mime_type(), "image/gif");
    }
}
