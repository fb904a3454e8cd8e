//! 설정 관리 -- pkgscan.toml 파싱 및 런타임 설정
//!
//! [`PkgscanConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`PKGSCAN_SCA_API_URL=https://...` 형식)
//! 3. 설정 파일 (`pkgscan.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), pkgscan_core::error::PkgscanError> {
//! use pkgscan_core::config::PkgscanConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = PkgscanConfig::load("pkgscan.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = PkgscanConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, PkgscanError};

/// pkgscan 통합 설정
///
/// `pkgscan.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PkgscanConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 취약점 스캔 서비스 설정
    #[serde(default)]
    pub sca: ScaConfig,
}

impl PkgscanConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PkgscanError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, PkgscanError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PkgscanError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                PkgscanError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, PkgscanError> {
        toml::from_str(toml_str).map_err(|e| {
            PkgscanError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `PKGSCAN_{SECTION}_{FIELD}`
    /// 예: `PKGSCAN_SCA_MAX_WAIT_SECS=120`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "PKGSCAN_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "PKGSCAN_GENERAL_LOG_FORMAT");

        // SCA
        override_string(&mut self.sca.api_url, "PKGSCAN_SCA_API_URL");
        override_string(&mut self.sca.api_key, "PKGSCAN_SCA_API_KEY");
        override_u64(
            &mut self.sca.poll_interval_secs,
            "PKGSCAN_SCA_POLL_INTERVAL_SECS",
        );
        override_u64(&mut self.sca.max_wait_secs, "PKGSCAN_SCA_MAX_WAIT_SECS");
        override_string(
            &mut self.sca.execution_mode,
            "PKGSCAN_SCA_EXECUTION_MODE",
        );
        override_usize(&mut self.sca.max_workers, "PKGSCAN_SCA_MAX_WORKERS");
        override_u64(
            &mut self.sca.request_timeout_secs,
            "PKGSCAN_SCA_REQUEST_TIMEOUT_SECS",
        );
        override_usize(&mut self.sca.max_file_size, "PKGSCAN_SCA_MAX_FILE_SIZE");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), PkgscanError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if !self.sca.api_url.starts_with("http://") && !self.sca.api_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "sca.api_url".to_owned(),
                reason: "must start with http:// or https://".to_owned(),
            }
            .into());
        }

        let valid_modes = ["parallel", "sequential"];
        if !valid_modes.contains(&self.sca.execution_mode.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "sca.execution_mode".to_owned(),
                reason: format!("must be one of: {}", valid_modes.join(", ")),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 취약점 스캔 서비스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaConfig {
    /// 스캔 서비스 base URL
    pub api_url: String,
    /// API 키 (Authorization 헤더 값)
    pub api_key: String,
    /// 상태 조회 간격 (초)
    pub poll_interval_secs: u64,
    /// 최대 대기 시간 (초). 누적 대기가 이 값을 넘으면 타임아웃
    pub max_wait_secs: u64,
    /// 실행 모드 (parallel, sequential)
    pub execution_mode: String,
    /// 병렬 워커 수. 0이면 사용 가능한 CPU 수
    pub max_workers: usize,
    /// 단일 HTTP 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 매니페스트 파일 최대 크기 (바이트)
    pub max_file_size: usize,
}

impl Default for ScaConfig {
    fn default() -> Self {
        Self {
            api_url: "https://www.bridgecrew.cloud".to_owned(),
            api_key: String::new(),
            poll_interval_secs: 2,
            max_wait_secs: 60,
            execution_mode: "parallel".to_owned(),
            max_workers: 0,
            request_timeout_secs: 30,
            max_file_size: 10 * 1024 * 1024, // 10 MB
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
