use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::ResolverConfig;
use crate::core::resolver;
use crate::models::{AssetKind, AssetScope, ResolvedAsset};

const AUDIO_EXTENSIONS: [&str; 10] = [
    "mp3", "flac", "m4a", "ogg", "opus", "wav", "aac", "wma", "aiff", "ape",
];

/// 오디오 파일이 하나 이상 들어 있는 폴더 하나의 스캔 결과.
#[derive(Debug, Clone)]
pub struct AlbumReport {
    pub folder: PathBuf,
    pub tracks: Vec<PathBuf>,
    pub album_assets: Vec<ResolvedAsset>,
    /// 앨범 에셋을 가리는 트랙 전용 에셋만 담는다.
    pub track_assets: Vec<TrackAssets>,
}

#[derive(Debug, Clone)]
pub struct TrackAssets {
    pub track: PathBuf,
    pub assets: Vec<ResolvedAsset>,
}

#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub albums: Vec<AlbumReport>,
}

impl AlbumReport {
    pub fn has_album_asset(&self, kind: AssetKind) -> bool {
        self.album_assets
            .iter()
            .any(|a| a.kind == kind && !a.preview)
    }

    pub fn track_override_count(&self, kind: AssetKind) -> usize {
        self.track_assets
            .iter()
            .filter(|t| t.assets.iter().any(|a| a.kind == kind && !a.preview))
            .count()
    }

    /// 표에 표시할 종류별 상태: `album`, `album+N tracks`, `N tracks`, `-`.
    pub fn status(&self, kind: AssetKind) -> String {
        let album = self.has_album_asset(kind);
        let tracks = self.track_override_count(kind);
        match (album, tracks) {
            (true, 0) => "album".to_string(),
            (true, n) => format!("album+{} tracks", n),
            (false, 0) => "-".to_string(),
            (false, n) => format!("{} tracks", n),
        }
    }

    pub fn folder_name(&self) -> &str {
        self.folder
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
    }
}

impl ScanReport {
    pub fn albums_with(&self, kind: AssetKind) -> usize {
        self.albums
            .iter()
            .filter(|a| a.has_album_asset(kind) || a.track_override_count(kind) > 0)
            .count()
    }
}

/// 라이브러리 루트를 재귀 탐색하여 앨범 폴더마다 애니메이션 에셋을 해석한다.
pub fn scan_library(root: &Path, config: &ResolverConfig) -> Result<ScanReport> {
    if !root.is_dir() {
        anyhow::bail!("{}은(는) 디렉토리가 아닙니다", root.display());
    }

    let mut folders = Vec::new();
    let mut visited = HashSet::new();
    collect_album_folders(root, &mut folders, &mut visited);
    folders.sort();

    let mut report = ScanReport::default();
    for (folder, tracks) in folders_with_tracks(folders) {
        report.albums.push(scan_album(folder, tracks, config)?);
    }
    log::info!("앨범 폴더 {}개 스캔 완료: {}", report.albums.len(), root.display());
    Ok(report)
}

fn folders_with_tracks(folders: Vec<PathBuf>) -> Vec<(PathBuf, Vec<PathBuf>)> {
    folders
        .into_iter()
        .filter_map(|folder| {
            let tracks = list_tracks(&folder);
            (!tracks.is_empty()).then_some((folder, tracks))
        })
        .collect()
}

fn scan_album(
    folder: PathBuf,
    tracks: Vec<PathBuf>,
    config: &ResolverConfig,
) -> Result<AlbumReport> {
    let album_assets = resolver::resolve_all(&folder, None, config)?;

    let mut track_assets = Vec::new();
    for track in &tracks {
        let assets = match resolver::resolve_all(&folder, Some(track), config) {
            Ok(assets) => assets,
            Err(e) => {
                log::warn!("트랙을 건너뜁니다: {}", e);
                continue;
            }
        };
        let overrides: Vec<_> = assets
            .into_iter()
            .filter(|a| a.scope == AssetScope::Track)
            .collect();
        if !overrides.is_empty() {
            track_assets.push(TrackAssets {
                track: track.clone(),
                assets: overrides,
            });
        }
    }

    Ok(AlbumReport {
        folder,
        tracks,
        album_assets,
        track_assets,
    })
}

/// 디렉토리를 재귀 순회하며 모든 폴더를 수집한다.
/// 읽을 수 없는 하위 폴더는 경고만 남기고 건너뛴다.
/// 심볼릭 링크로 이미 방문한 실제 폴더에 다시 도달하면 건너뛴다.
fn collect_album_folders(
    dir: &Path,
    folders: &mut Vec<PathBuf>,
    visited: &mut HashSet<PathBuf>,
) {
    match std::fs::canonicalize(dir) {
        Ok(real) => {
            if !visited.insert(real) {
                log::debug!("이미 방문한 폴더입니다: {}", dir.display());
                return;
            }
        }
        Err(e) => {
            log::warn!("폴더 경로를 확인할 수 없어 건너뜁니다: {}: {}", dir.display(), e);
            return;
        }
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("폴더를 읽을 수 없어 건너뜁니다: {}: {}", dir.display(), e);
            return;
        }
    };
    folders.push(dir.to_path_buf());

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_album_folders(&path, folders, visited);
        }
    }
}

/// 폴더 바로 아래의 오디오 파일 목록 (경로순 정렬).
fn list_tracks(folder: &Path) -> Vec<PathBuf> {
    let mut tracks: Vec<PathBuf> = match std::fs::read_dir(folder) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_audio(p))
            .collect(),
        Err(_) => Vec::new(),
    };
    tracks.sort();
    tracks
}

/// 오디오 확장자인지 확인한다 (대소문자 무시).
fn is_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap().set_len(16).unwrap();
    }

    fn library() -> TempDir {
        let root = TempDir::new().unwrap();

        let a = root.path().join("Artist").join("Album A");
        std::fs::create_dir_all(&a).unwrap();
        touch(&a, "01 - One.mp3");
        touch(&a, "02 - Two.FLAC");
        touch(&a, "cover-animated.gif");
        touch(&a, "vertical-background-02 - Two.mp4");

        let b = root.path().join("Artist").join("Album B");
        std::fs::create_dir_all(&b).unwrap();
        touch(&b, "track.ogg");
        touch(&b, "cover.jpg");

        root
    }

    #[test]
    fn test_is_audio() {
        assert!(is_audio(Path::new("a.MP3")));
        assert!(is_audio(Path::new("a.flac")));
        assert!(!is_audio(Path::new("cover-animated.gif")));
        assert!(!is_audio(Path::new("noext")));
    }

    #[test]
    fn test_scan_library() {
        let root = library();
        let cfg = ResolverConfig::default();
        let report = scan_library(root.path(), &cfg).unwrap();

        // Artist 폴더 자체는 오디오가 없으므로 앨범이 아니다
        assert_eq!(report.albums.len(), 2);

        let a = &report.albums[0];
        assert_eq!(a.folder_name(), "Album A");
        assert_eq!(a.tracks.len(), 2);
        assert_eq!(a.status(AssetKind::Cover), "album");
        assert_eq!(a.status(AssetKind::VerticalBackground), "1 tracks");
        assert_eq!(a.track_assets.len(), 1);
        assert!(a.track_assets[0].track.ends_with("02 - Two.FLAC"));

        let b = &report.albums[1];
        assert_eq!(b.status(AssetKind::Cover), "-");

        assert_eq!(report.albums_with(AssetKind::Cover), 1);
        assert_eq!(report.albums_with(AssetKind::VerticalBackground), 1);
    }

    #[test]
    fn test_album_and_track_status() {
        let root = library();
        let a = root.path().join("Artist").join("Album A");
        touch(&a, "vertical-background.webm");

        let report = scan_library(root.path(), &ResolverConfig::default()).unwrap();
        assert_eq!(
            report.albums[0].status(AssetKind::VerticalBackground),
            "album+1 tracks"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_reported_once() {
        let root = TempDir::new().unwrap();
        let album = root.path().join("Album");
        std::fs::create_dir(&album).unwrap();
        touch(&album, "01.mp3");
        touch(&album, "cover-animated.gif");
        std::os::unix::fs::symlink(&album, album.join("loop")).unwrap();

        let report = scan_library(root.path(), &ResolverConfig::default()).unwrap();
        assert_eq!(report.albums.len(), 1);
        assert_eq!(report.albums[0].folder, album);
        assert_eq!(report.albums[0].status(AssetKind::Cover), "album");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_album_outside_root_is_scanned() {
        let outside = TempDir::new().unwrap();
        touch(outside.path(), "01.mp3");
        let root = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), root.path().join("Linked")).unwrap();

        let report = scan_library(root.path(), &ResolverConfig::default()).unwrap();
        assert_eq!(report.albums.len(), 1);
        assert_eq!(report.albums[0].folder_name(), "Linked");
    }

    #[test]
    fn test_root_must_be_directory() {
        let root = TempDir::new().unwrap();
        touch(root.path(), "file.mp3");
        assert!(scan_library(&root.path().join("file.mp3"), &ResolverConfig::default()).is_err());
        assert!(scan_library(&root.path().join("missing"), &ResolverConfig::default()).is_err());
    }
}
