//! 리졸버 결과를 호스트가 쓰는 형태로 바꾸는 어댑터들.

pub mod file;
pub mod info;
pub mod provider_ids;
