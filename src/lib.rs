//! 앨범 폴더 옆에 놓인 애니메이션 커버/세로 배경 파일을 찾아 주는 라이브러리.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod surfaces;
