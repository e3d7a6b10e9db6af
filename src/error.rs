use std::path::PathBuf;

use thiserror::Error;

/// 호출자가 잘못된 식별자를 넘겼을 때의 에러.
/// 에셋이 없는 경우나 폴더를 읽을 수 없는 경우는 에러가 아니라 `None`이다.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("트랙 경로가 비어 있습니다")]
    EmptyTrackPath,
    #[error("트랙 파일명을 해석할 수 없습니다: {0}")]
    InvalidTrackName(PathBuf),
    #[error("트랙 파일을 찾을 수 없습니다: {0}")]
    TrackNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
