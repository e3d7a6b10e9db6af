use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::models::ResolvedAsset;

/// HTTP 파일 응답에 해당하는 열린 에셋 파일.
#[derive(Debug)]
pub struct AssetFile {
    pub path: PathBuf,
    pub file: File,
    pub mime_type: &'static str,
    pub length: u64,
}

/// 해석된 에셋을 읽기용으로 연다.
///
/// 해석 이후 파일이 사라졌으면 `Ok(None)`을 반환한다. 그 밖의 I/O 에러는 전파한다.
pub fn open_asset(asset: &ResolvedAsset) -> io::Result<Option<AssetFile>> {
    let file = match File::open(&asset.absolute_path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("해석 이후 파일이 사라졌습니다: {}", asset.absolute_path.display());
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    let length = file.metadata()?.len();

    Ok(Some(AssetFile {
        path: asset.absolute_path.clone(),
        file,
        mime_type: asset.mime_type(),
        length,
    }))
}

impl AssetFile {
    /// 파일 내용을 그대로 `out`에 복사한다.
    pub fn copy_to<W: Write>(&mut self, out: &mut W) -> io::Result<u64> {
        io::copy(&mut self.file, out)
    }
}
