use std::fs::{DirEntry, ReadDir};
use std::path::{Path, PathBuf};

use crate::config::{normalize_extension, ResolverConfig};
use crate::error::{ResolveError, Result};
use crate::models::{AssetKind, AssetScope, ResolvedAsset};

const PREVIEW_SUFFIX: &str = "preview";

/// 폴더 하나에서 찾을 파일의 조건.
struct Lookup {
    kind: AssetKind,
    scope: AssetScope,
    /// 소문자로 정규화한 확장자 없는 파일명.
    stem: String,
    preview: bool,
}

impl Lookup {
    fn album(kind: AssetKind, config: &ResolverConfig, preview: bool) -> Self {
        let mut stem = config.base_name(kind).to_string();
        if preview {
            stem = format!("{}-{}", stem, PREVIEW_SUFFIX);
        }
        Self {
            kind,
            scope: AssetScope::Album,
            stem: stem.to_lowercase(),
            preview,
        }
    }

    fn track(kind: AssetKind, config: &ResolverConfig, track_stem: &str, preview: bool) -> Self {
        let mut stem = format!("{}-{}", config.base_name(kind), track_stem);
        if preview {
            stem = format!("{}-{}", stem, PREVIEW_SUFFIX);
        }
        Self {
            kind,
            scope: AssetScope::Track,
            stem: stem.to_lowercase(),
            preview,
        }
    }
}

/// 앨범 폴더에서 `kind`의 앨범 단위 에셋을 찾는다.
///
/// 폴더가 없거나 읽을 수 없으면 `None`이다. 하위 폴더는 탐색하지 않는다.
/// 같은 stem의 파일이 여럿이면 `extension_priority`가 비어 있을 때
/// 디렉토리 열거 순서(플랫폼 의존)상 첫 번째 파일을 반환한다.
pub fn resolve_album_asset(
    album_folder: &Path,
    kind: AssetKind,
    config: &ResolverConfig,
) -> Option<ResolvedAsset> {
    if !config.is_enabled(kind) {
        return None;
    }
    find_asset(album_folder, Lookup::album(kind, config, false), config)
}

/// 트랙 전용 에셋(`{base}-{트랙 파일명}`)을 먼저 찾고, 없으면 앨범 단위 에셋으로 대체한다.
///
/// 트랙 전용 파일은 트랙 파일이 있는 폴더에서 찾는다. 앨범 에셋과 합쳐지지 않는다.
pub fn resolve_track_asset(
    track_file: &Path,
    album_folder: &Path,
    kind: AssetKind,
    config: &ResolverConfig,
) -> Result<Option<ResolvedAsset>> {
    let track_stem = track_stem(track_file)?;
    if !config.is_enabled(kind) {
        return Ok(None);
    }

    let lookup = Lookup::track(kind, config, &track_stem, false);
    if let Some(asset) = find_asset(&track_folder(track_file), lookup, config) {
        log::debug!("트랙 전용 에셋 사용: {}", asset.absolute_path.display());
        return Ok(Some(asset));
    }

    Ok(resolve_album_asset(album_folder, kind, config))
}

/// 경로 없이 존재 여부만 확인한다. 첫 번째로 조건을 만족하는 파일에서 멈춘다.
pub fn has_any_asset(folder: &Path, kind: AssetKind, config: &ResolverConfig) -> bool {
    if !config.is_enabled(kind) {
        return false;
    }
    candidates(folder, Lookup::album(kind, config, false), config)
        .next()
        .is_some()
}

/// `has_any_asset`의 트랙 버전. 트랙 전용 또는 앨범 단위 에셋 중 하나라도 있으면 true.
pub fn has_track_asset(
    track_file: &Path,
    album_folder: &Path,
    kind: AssetKind,
    config: &ResolverConfig,
) -> Result<bool> {
    let track_stem = track_stem(track_file)?;
    if !config.is_enabled(kind) {
        return Ok(false);
    }
    let lookup = Lookup::track(kind, config, &track_stem, false);
    if candidates(&track_folder(track_file), lookup, config)
        .next()
        .is_some()
    {
        return Ok(true);
    }
    Ok(has_any_asset(album_folder, kind, config))
}

/// 정적 첫 프레임 이미지(`{stem}-preview`)를 찾는다.
/// 트랙이 주어지면 `resolve_track_asset`과 같은 방식으로 앨범 단위로 대체한다.
pub fn resolve_preview(
    album_folder: &Path,
    kind: AssetKind,
    track_file: Option<&Path>,
    config: &ResolverConfig,
) -> Result<Option<ResolvedAsset>> {
    let stem = track_file.map(track_stem).transpose()?;
    if !config.previews_enabled || !config.is_enabled(kind) {
        return Ok(None);
    }

    if let (Some(track_file), Some(stem)) = (track_file, stem) {
        let lookup = Lookup::track(kind, config, &stem, true);
        if let Some(asset) = find_asset(&track_folder(track_file), lookup, config) {
            return Ok(Some(asset));
        }
    }

    Ok(find_asset(
        album_folder,
        Lookup::album(kind, config, true),
        config,
    ))
}

/// 활성화된 모든 종류를 `AssetKind` 선언 순서대로 해석한다.
/// 프리뷰가 켜져 있으면 각 종류의 애니메이션 에셋 뒤에 프리뷰가 붙는다.
pub fn resolve_all(
    album_folder: &Path,
    track_file: Option<&Path>,
    config: &ResolverConfig,
) -> Result<Vec<ResolvedAsset>> {
    let mut assets = Vec::new();
    for kind in AssetKind::ALL {
        let asset = match track_file {
            Some(track) => resolve_track_asset(track, album_folder, kind, config)?,
            None => resolve_album_asset(album_folder, kind, config),
        };
        assets.extend(asset);
        assets.extend(resolve_preview(album_folder, kind, track_file, config)?);
    }
    Ok(assets)
}

/// 트랙 파일 경로를 검증하고 확장자 없는 파일명을 반환한다.
fn track_stem(track_file: &Path) -> Result<String> {
    if track_file.as_os_str().is_empty() {
        return Err(ResolveError::EmptyTrackPath);
    }
    let stem = track_file
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ResolveError::InvalidTrackName(track_file.to_path_buf()))?;
    if !track_file.is_file() {
        return Err(ResolveError::TrackNotFound(track_file.to_path_buf()));
    }
    Ok(stem.to_string())
}

fn track_folder(track_file: &Path) -> PathBuf {
    match track_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn find_asset(folder: &Path, lookup: Lookup, config: &ResolverConfig) -> Option<ResolvedAsset> {
    let mut found = candidates(folder, lookup, config);
    if config.extension_priority.is_empty() {
        found.next()
    } else {
        found.min_by_key(|asset| config.extension_rank(&asset.extension))
    }
}

/// 폴더의 직계 자식 중 조건을 만족하는 파일을 디렉토리 순서대로 돌려준다.
/// 파일시스템 에러는 로그만 남기고 건너뛴다.
fn candidates<'a>(
    folder: &Path,
    lookup: Lookup,
    config: &'a ResolverConfig,
) -> impl Iterator<Item = ResolvedAsset> + 'a {
    read_folder(folder)
        .into_iter()
        .flatten()
        .filter_map(move |entry| match entry {
            Ok(entry) => check_entry(&entry, &lookup, config),
            Err(e) => {
                log::debug!("디렉토리 항목을 읽을 수 없습니다: {}", e);
                None
            }
        })
}

fn read_folder(folder: &Path) -> Option<ReadDir> {
    if folder.as_os_str().is_empty() {
        return None;
    }
    match std::fs::read_dir(folder) {
        Ok(entries) => Some(entries),
        Err(e) => {
            log::debug!("폴더를 읽을 수 없습니다: {}: {}", folder.display(), e);
            None
        }
    }
}

fn check_entry(
    entry: &DirEntry,
    lookup: &Lookup,
    config: &ResolverConfig,
) -> Option<ResolvedAsset> {
    let path = entry.path();

    let stem = path.file_stem()?.to_str()?;
    if stem.to_lowercase() != lookup.stem {
        return None;
    }

    let extension = normalize_extension(path.extension()?.to_str()?);
    let allowed = if lookup.preview {
        config.accepts_preview_extension(&extension)
    } else {
        config.accepts_extension(&extension)
    };
    if !allowed {
        log::debug!("허용되지 않은 확장자: {}", path.display());
        return None;
    }

    // 심볼릭 링크는 대상 파일 기준으로 판단한다.
    let metadata = match std::fs::metadata(&path) {
        Ok(m) => m,
        Err(e) => {
            log::debug!("파일 정보를 읽을 수 없습니다: {}: {}", path.display(), e);
            return None;
        }
    };
    if !metadata.is_file() {
        return None;
    }
    if metadata.len() > config.max_file_size_bytes {
        log::debug!(
            "최대 크기({} bytes) 초과: {} ({} bytes)",
            config.max_file_size_bytes,
            path.display(),
            metadata.len()
        );
        return None;
    }

    Some(ResolvedAsset {
        kind: lookup.kind,
        scope: lookup.scope,
        absolute_path: std::path::absolute(&path).unwrap_or(path),
        size_bytes: metadata.len(),
        extension,
        preview: lookup.preview,
    })
}
