//! pkgscan 공통 크레이트
//!
//! 워크스페이스의 모든 크레이트가 공유하는 최상위 에러 타입, `pkgscan.toml` 설정,
//! 메트릭 이름 상수를 정의합니다.
//!
//! - [`error`]: 최상위 에러 (`PkgscanError`) 및 도메인별 에러
//! - [`config`]: 설정 파일 파싱 및 환경변수 오버라이드 (`PkgscanConfig`)
//! - [`metrics`]: 메트릭 이름 및 레이블 상수

pub mod config;
pub mod error;
pub mod metrics;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, PkgscanError, ScaError};

// 설정
pub use config::{GeneralConfig, PkgscanConfig, ScaConfig};
