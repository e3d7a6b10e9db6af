use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use dialoguer::{Confirm, Input, MultiSelect};

use animcover::config::{self, ResolverConfig};
use animcover::core::{resolver, scanner};
use animcover::models::{human_size, AssetKind, ResolvedAsset};
use animcover::surfaces::file::open_asset;
use animcover::surfaces::info::AssetInfo;
use animcover::surfaces::provider_ids::ProviderIds;

#[derive(Parser)]
#[command(name = "animcover", about = "앨범 폴더의 애니메이션 커버/세로 배경 탐색기")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 라이브러리를 스캔하여 앨범별 애니메이션 에셋 현황 표시
    Scan {
        /// 라이브러리 루트 디렉토리
        root: PathBuf,
    },
    /// 앨범 폴더(또는 트랙)의 애니메이션 에셋 해석
    Resolve {
        /// 앨범 폴더
        folder: PathBuf,
        /// 트랙 전용 에셋을 먼저 찾을 오디오 파일
        #[arg(long)]
        track: Option<PathBuf>,
        /// cover, cover-tall, vertical-background
        #[arg(long, value_parser = parse_kind)]
        kind: Option<AssetKind>,
        /// JSON으로 출력 (--ids와 함께 쓰면 provider id 맵)
        #[arg(long)]
        json: bool,
        /// provider id 키/값으로 출력
        #[arg(long)]
        ids: bool,
    },
    /// 해석된 에셋 파일 내용을 표준 출력으로 전송
    Cat {
        folder: PathBuf,
        #[arg(long, value_parser = parse_kind)]
        kind: AssetKind,
        #[arg(long)]
        track: Option<PathBuf>,
    },
    /// 설정 조회/편집/초기화
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// 현재 설정 표시
    Show,
    /// 대화형으로 설정 편집
    Edit,
    /// 기본값으로 초기화
    Reset,
}

fn parse_kind(s: &str) -> Result<AssetKind, String> {
    AssetKind::parse(s).ok_or_else(|| {
        format!(
            "알 수 없는 종류: {} (cover, cover-tall, vertical-background 중 하나)",
            s
        )
    })
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Scan { root } => cmd_scan(&root),
        Commands::Resolve {
            folder,
            track,
            kind,
            json,
            ids,
        } => cmd_resolve(&folder, track.as_deref(), kind, json, ids),
        Commands::Cat {
            folder,
            kind,
            track,
        } => cmd_cat(&folder, kind, track.as_deref()),
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => cmd_config_show(),
            ConfigAction::Edit => cmd_config_edit(),
            ConfigAction::Reset => cmd_config_reset(),
        },
    }
}

fn cmd_scan(root: &Path) -> Result<()> {
    let cfg = config::load_config().resolver;
    let report = scanner::scan_library(root, &cfg)?;

    if report.albums.is_empty() {
        println!("{}에서 앨범 폴더를 찾을 수 없습니다", root.display());
        return Ok(());
    }

    let kinds: Vec<AssetKind> = AssetKind::ALL
        .into_iter()
        .filter(|k| cfg.is_enabled(*k))
        .collect();

    let mut table = Table::new();
    let mut header = vec!["앨범".to_string(), "트랙".to_string()];
    header.extend(kinds.iter().map(|k| k.to_string()));
    table.set_header(header);

    for album in &report.albums {
        let mut row = vec![
            Cell::new(album.folder.display()),
            Cell::new(album.tracks.len()),
        ];
        row.extend(kinds.iter().map(|k| Cell::new(album.status(*k))));
        table.add_row(row);
    }

    println!("{table}");
    let totals: Vec<String> = kinds
        .iter()
        .map(|k| format!("{}: {}", k, report.albums_with(*k)))
        .collect();
    println!(
        "\n총 {} 앨범 ({})",
        report.albums.len(),
        totals.join(", ")
    );

    Ok(())
}

/// `kind`가 있으면 그 종류 하나만, 없으면 활성화된 전부를 해석한다.
fn resolve(
    folder: &Path,
    track: Option<&Path>,
    kind: Option<AssetKind>,
    cfg: &ResolverConfig,
) -> Result<Vec<ResolvedAsset>> {
    let Some(kind) = kind else {
        return Ok(resolver::resolve_all(folder, track, cfg)?);
    };

    let mut assets = Vec::new();
    let asset = match track {
        Some(track) => resolver::resolve_track_asset(track, folder, kind, cfg)?,
        None => resolver::resolve_album_asset(folder, kind, cfg),
    };
    assets.extend(asset);
    assets.extend(resolver::resolve_preview(folder, kind, track, cfg)?);
    Ok(assets)
}

fn cmd_resolve(
    folder: &Path,
    track: Option<&Path>,
    kind: Option<AssetKind>,
    json: bool,
    ids: bool,
) -> Result<()> {
    let cfg = config::load_config().resolver;
    if let Some(kind) = kind {
        if !cfg.is_enabled(kind) {
            eprintln!("'{}' 종류가 설정에서 비활성화되어 있습니다", kind);
        }
    }

    let assets = resolve(folder, track, kind, &cfg)?;

    if ids {
        let ids = ProviderIds::from_assets(&assets);
        if json {
            println!("{}", ids.to_json()?);
        } else {
            for (key, value) in ids.iter() {
                println!("{}={}", key, value);
            }
        }
        return Ok(());
    }

    if json {
        println!("{}", AssetInfo::new(folder, track, &assets).to_json()?);
        return Ok(());
    }

    if assets.is_empty() {
        println!("애니메이션 에셋을 찾을 수 없습니다: {}", folder.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["종류", "범위", "파일", "크기", "MIME"]);
    for asset in &assets {
        let kind = if asset.preview {
            format!("{} (preview)", asset.kind)
        } else {
            asset.kind.to_string()
        };
        table.add_row(vec![
            Cell::new(kind),
            Cell::new(asset.scope),
            Cell::new(asset.filename()),
            Cell::new(human_size(asset.size_bytes)),
            Cell::new(asset.mime_type()),
        ]);
    }
    println!("{table}");

    Ok(())
}

fn cmd_cat(folder: &Path, kind: AssetKind, track: Option<&Path>) -> Result<()> {
    let cfg = config::load_config().resolver;
    let asset = match track {
        Some(track) => resolver::resolve_track_asset(track, folder, kind, &cfg)?,
        None => resolver::resolve_album_asset(folder, kind, &cfg),
    };
    let Some(asset) = asset else {
        bail!("'{}' 에셋을 찾을 수 없습니다: {}", kind, folder.display());
    };

    let Some(mut file) = open_asset(&asset)
        .with_context(|| format!("파일을 열 수 없습니다: {}", asset.absolute_path.display()))?
    else {
        bail!("파일이 사라졌습니다: {}", asset.absolute_path.display());
    };

    eprintln!("{} ({} bytes)", file.mime_type, file.length);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    file.copy_to(&mut out).context("파일 전송에 실패했습니다")?;
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let cfg = config::load_config().resolver;

    let kinds: Vec<String> = cfg.enabled_kinds.iter().map(|k| k.to_string()).collect();

    let mut table = Table::new();
    table.set_header(vec!["항목", "값"]);
    table.add_row(vec!["활성화된 종류".to_string(), kinds.join(", ")]);
    table.add_row(vec![
        "최대 크기".to_string(),
        format!(
            "{} ({} bytes)",
            human_size(cfg.max_file_size_bytes),
            cfg.max_file_size_bytes
        ),
    ]);
    table.add_row(vec!["확장자".to_string(), join_set(&cfg.supported_extensions)]);
    table.add_row(vec!["프리뷰 확장자".to_string(), join_set(&cfg.preview_extensions)]);
    table.add_row(vec![
        "프리뷰 사용".to_string(),
        if cfg.previews_enabled { "예" } else { "아니오" }.to_string(),
    ]);
    table.add_row(vec![
        "확장자 우선순위".to_string(),
        if cfg.extension_priority.is_empty() {
            "(디렉토리 순서)".to_string()
        } else {
            cfg.extension_priority.join(", ")
        },
    ]);
    for kind in AssetKind::ALL {
        table.add_row(vec![
            format!("파일명: {}", kind),
            cfg.base_name(kind).to_string(),
        ]);
    }

    println!("설정 파일: {}", config::config_path().display());
    println!("{table}");
    Ok(())
}

fn cmd_config_edit() -> Result<()> {
    let mut cfg = config::load_config();
    let rc = &mut cfg.resolver;

    println!("애니메이션 에셋 설정\n");

    let labels: Vec<&str> = AssetKind::ALL.iter().map(|k| k.label()).collect();
    let defaults: Vec<bool> = AssetKind::ALL
        .iter()
        .map(|k| rc.is_enabled(*k))
        .collect();
    let selected = MultiSelect::new()
        .with_prompt("활성화할 종류 (스페이스로 선택)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;
    rc.enabled_kinds = selected.into_iter().map(|i| AssetKind::ALL[i]).collect();

    let max_size: String = Input::new()
        .with_prompt("최대 파일 크기 (바이트, 또는 KB/MB/GB 단위)")
        .with_initial_text(rc.max_file_size_bytes.to_string())
        .validate_with(|input: &String| -> Result<(), String> {
            config::parse_size(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()?;
    rc.max_file_size_bytes = config::parse_size(&max_size)?;

    let extensions: String = Input::new()
        .with_prompt("지원 확장자 (쉼표 구분)")
        .with_initial_text(join_set(&rc.supported_extensions))
        .interact_text()?;
    rc.supported_extensions = config::parse_extension_list(&extensions);

    rc.previews_enabled = Confirm::new()
        .with_prompt("프리뷰 이미지 사용")
        .default(rc.previews_enabled)
        .interact()?;

    if rc.previews_enabled {
        let previews: String = Input::new()
            .with_prompt("프리뷰 확장자 (쉼표 구분)")
            .with_initial_text(join_set(&rc.preview_extensions))
            .interact_text()?;
        rc.preview_extensions = config::parse_extension_list(&previews);
    }

    let priority: String = Input::new()
        .with_prompt("확장자 우선순위 (쉼표 구분, 비우면 디렉토리 순서)")
        .with_initial_text(rc.extension_priority.join(", "))
        .allow_empty(true)
        .interact_text()?;
    rc.extension_priority = priority
        .split(',')
        .map(config::normalize_extension)
        .filter(|e| e.len() > 1)
        .collect();

    for kind in AssetKind::ALL {
        let name: String = Input::new()
            .with_prompt(format!("{} 파일명", kind))
            .with_initial_text(rc.base_name(kind).to_string())
            .interact_text()?;
        rc.base_names.set(kind, name.trim().to_string());
    }

    config::save_config(&cfg)?;
    println!("\n설정이 저장되었습니다!");
    Ok(())
}

fn cmd_config_reset() -> Result<()> {
    let path = config::config_path();
    config::reset_config_at(&path)?;
    println!("설정을 기본값으로 되돌렸습니다: {}", path.display());
    Ok(())
}

fn join_set(set: &std::collections::BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}
