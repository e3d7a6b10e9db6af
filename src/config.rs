use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::AssetKind;

/// 기본 최대 파일 크기: 50 MB.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

const DEFAULT_EXTENSIONS: [&str; 5] = [".gif", ".mp4", ".webm", ".mov", ".avi"];
const DEFAULT_PREVIEW_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// 리졸버 호출 한 번 동안 변하지 않는 설정 값.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub enabled_kinds: BTreeSet<AssetKind>,
    pub max_file_size_bytes: u64,
    pub supported_extensions: BTreeSet<String>,
    pub preview_extensions: BTreeSet<String>,
    pub previews_enabled: bool,
    /// 같은 stem에 확장자만 다른 파일이 여럿일 때의 우선순위.
    /// 비어 있으면 디렉토리 열거 순서(플랫폼 의존)를 따른다.
    pub extension_priority: Vec<String>,
    pub base_names: BaseNames,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseNames {
    pub cover: String,
    pub cover_tall: String,
    pub vertical_background: String,
}

impl Default for BaseNames {
    fn default() -> Self {
        Self {
            cover: AssetKind::Cover.default_base_name().to_string(),
            cover_tall: AssetKind::CoverTall.default_base_name().to_string(),
            vertical_background: AssetKind::VerticalBackground
                .default_base_name()
                .to_string(),
        }
    }
}

impl BaseNames {
    pub fn get(&self, kind: AssetKind) -> &str {
        match kind {
            AssetKind::Cover => &self.cover,
            AssetKind::CoverTall => &self.cover_tall,
            AssetKind::VerticalBackground => &self.vertical_background,
        }
    }

    pub fn set(&mut self, kind: AssetKind, name: String) {
        match kind {
            AssetKind::Cover => self.cover = name,
            AssetKind::CoverTall => self.cover_tall = name,
            AssetKind::VerticalBackground => self.vertical_background = name,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            enabled_kinds: [AssetKind::Cover, AssetKind::VerticalBackground]
                .into_iter()
                .collect(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            supported_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            preview_extensions: DEFAULT_PREVIEW_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            previews_enabled: false,
            extension_priority: Vec::new(),
            base_names: BaseNames::default(),
        }
    }
}

impl ResolverConfig {
    pub fn is_enabled(&self, kind: AssetKind) -> bool {
        self.enabled_kinds.contains(&kind)
    }

    /// 설정 파일에서 읽은 base name. 비어 있으면 기본값을 쓴다.
    pub fn base_name(&self, kind: AssetKind) -> &str {
        let name = self.base_names.get(kind).trim();
        if name.is_empty() {
            kind.default_base_name()
        } else {
            name
        }
    }

    pub fn accepts_extension(&self, ext: &str) -> bool {
        contains_extension(&self.supported_extensions, ext)
    }

    pub fn accepts_preview_extension(&self, ext: &str) -> bool {
        contains_extension(&self.preview_extensions, ext)
    }

    /// `extension_priority` 안에서의 순위. 목록에 없으면 맨 뒤.
    pub fn extension_rank(&self, ext: &str) -> usize {
        let ext = normalize_extension(ext);
        self.extension_priority
            .iter()
            .position(|p| normalize_extension(p) == ext)
            .unwrap_or(self.extension_priority.len())
    }

    /// 확장자 표기를 `.ext` 소문자 형태로 통일한다.
    pub fn normalized(mut self) -> Self {
        self.supported_extensions = normalize_set(&self.supported_extensions);
        self.preview_extensions = normalize_set(&self.preview_extensions);
        self.extension_priority = self
            .extension_priority
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| e.len() > 1)
            .collect();
        self
    }
}

/// `"GIF"`, `".gif"`, `" .Gif "`를 모두 `".gif"`로 만든다.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
    format!(".{}", ext)
}

/// 쉼표로 구분된 확장자 목록을 파싱한다 (대화형 설정 편집용).
pub fn parse_extension_list(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(normalize_extension)
        .filter(|e| e.len() > 1)
        .collect()
}

/// `"1000"`, `"512 KB"`, `"50MB"`, `"1gb"` 같은 크기 입력을 바이트로 변환한다.
/// 단위는 1024 배수이며 범위를 넘으면 에러를 반환한다.
pub fn parse_size(input: &str) -> Result<u64> {
    let input = input.trim();
    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, unit) = input.split_at(split);
    if digits.is_empty() {
        bail!("크기는 숫자로 시작해야 합니다: {:?}", input);
    }
    let value: u64 = digits
        .parse()
        .with_context(|| format!("크기가 너무 큽니다: {}", input))?;

    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" => 1024,
        "m" | "mb" => 1024 * 1024,
        "g" | "gb" => 1024 * 1024 * 1024,
        other => bail!("알 수 없는 크기 단위: {}", other),
    };
    match value.checked_mul(multiplier) {
        Some(bytes) => Ok(bytes),
        None => bail!("크기가 너무 큽니다: {}", input),
    }
}

fn normalize_set(set: &BTreeSet<String>) -> BTreeSet<String> {
    set.iter()
        .map(|e| normalize_extension(e))
        .filter(|e| e.len() > 1)
        .collect()
}

fn contains_extension(set: &BTreeSet<String>, ext: &str) -> bool {
    let ext = normalize_extension(ext);
    set.iter().any(|e| normalize_extension(e) == ext)
}

pub fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("animcover")
        .join("config.toml")
}

pub fn load_config() -> Config {
    load_config_from(&config_path())
}

/// 파일이 없거나 파싱에 실패하면 기본 설정을 반환한다.
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    let mut config = match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str::<Config>(&content).unwrap_or_else(|e| {
            log::warn!("설정 파일을 해석할 수 없어 기본값을 사용합니다: {}: {}", path.display(), e);
            Config::default()
        }),
        Err(e) => {
            log::warn!("설정 파일을 읽을 수 없습니다: {}: {}", path.display(), e);
            Config::default()
        }
    };
    config.resolver = config.resolver.normalized();
    config
}

pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(&config_path(), config)
}

pub fn save_config_to(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("설정 디렉토리를 만들 수 없습니다: {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("설정 파일을 쓸 수 없습니다: {}", path.display()))?;
    Ok(())
}

/// 설정 파일을 기본값으로 되돌린다.
pub fn reset_config_at(path: &Path) -> Result<Config> {
    let config = Config::default();
    save_config_to(path, &config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let cfg = ResolverConfig::default();
        assert!(cfg.is_enabled(AssetKind::Cover));
        assert!(cfg.is_enabled(AssetKind::VerticalBackground));
        assert!(!cfg.is_enabled(AssetKind::CoverTall));
        assert_eq!(cfg.max_file_size_bytes, 52_428_800);
        assert_eq!(cfg.base_name(AssetKind::Cover), "cover-animated");
        assert_eq!(cfg.base_name(AssetKind::CoverTall), "cover-animated-tall");
        assert!(cfg.accepts_extension("GIF"));
        assert!(cfg.accepts_extension(".Mp4"));
        assert!(!cfg.accepts_extension(".png"));
        assert!(cfg.accepts_preview_extension(".png"));
    }

    #[test]
    fn test_blank_base_name_falls_back() {
        let mut cfg = ResolverConfig::default();
        cfg.base_names.set(AssetKind::Cover, "  ".to_string());
        assert_eq!(cfg.base_name(AssetKind::Cover), "cover-animated");
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("GIF"), ".gif");
        assert_eq!(normalize_extension(" .WebM "), ".webm");
        let parsed = parse_extension_list("gif, .MP4,, webm");
        assert_eq!(parsed.len(), 3);
        assert!(parsed.contains(".mp4"));
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1000").unwrap(), 1000);
        assert_eq!(parse_size("512 KB").unwrap(), 512 * 1024);
        assert_eq!(parse_size("50MB").unwrap(), DEFAULT_MAX_FILE_SIZE_BYTES);
        assert_eq!(parse_size(" 1gb ").unwrap(), 1024 * 1024 * 1024);
    }

    #[test]
    fn test_parse_size_rejects_bad_input() {
        assert!(parse_size("").is_err());
        assert!(parse_size("MB").is_err());
        assert!(parse_size("10 TB").is_err());
        assert!(parse_size("18446744073709551615 MB").is_err());
        assert!(parse_size("99999999999999999999999").is_err());
    }

    #[test]
    fn test_extension_rank() {
        let cfg = ResolverConfig {
            extension_priority: vec![".webm".to_string(), "MP4".to_string()],
            ..Default::default()
        };
        assert_eq!(cfg.extension_rank(".webm"), 0);
        assert_eq!(cfg.extension_rank(".mp4"), 1);
        assert_eq!(cfg.extension_rank(".gif"), 2);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[resolver]\nmax_file_size_bytes = 1024\nsupported_extensions = [\"GIF\"]\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).resolver;
        assert_eq!(cfg.max_file_size_bytes, 1024);
        assert!(cfg.supported_extensions.contains(".gif"));
        assert_eq!(cfg.base_name(AssetKind::VerticalBackground), "vertical-background");
        assert!(cfg.is_enabled(AssetKind::Cover));
    }

    #[test]
    fn test_save_load_and_reset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.resolver.enabled_kinds.remove(&AssetKind::Cover);
        cfg.resolver.previews_enabled = true;
        save_config_to(&path, &cfg).unwrap();

        let loaded = load_config_from(&path);
        assert!(!loaded.resolver.is_enabled(AssetKind::Cover));
        assert!(loaded.resolver.previews_enabled);

        reset_config_at(&path).unwrap();
        assert_eq!(load_config_from(&path).resolver, ResolverConfig::default());
    }

    #[test]
    fn test_broken_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        assert_eq!(load_config_from(&path).resolver, ResolverConfig::default());
    }
}
