//! SCA 클라이언트 설정
//!
//! [`ScaClientConfig`]는 core의 [`ScaConfig`](pkgscan_core::config::ScaConfig)를
//! 타입이 지정된 값(실행 모드 등)으로 변환하고 범위 검증을 추가합니다.
//!
//! # 사용 예시
//!
//! ```
//! use pkgscan_sca_client::{ExecutionMode, ScaClientConfig, ScaClientConfigBuilder};
//!
//! // 기본값으로 생성
//! let config = ScaClientConfig::default();
//! config.validate().unwrap();
//!
//! // 빌더로 생성
//! let config = ScaClientConfigBuilder::new()
//!     .api_url("http://localhost:8080")
//!     .execution_mode(ExecutionMode::Sequential)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ScaClientError;

/// 순차 실행을 강제하는 환경변수
///
/// 값이 `"1"`이면 설정과 관계없이 [`ExecutionMode::Sequential`]로 실행합니다.
/// 프로세스 수준 병렬 실행이 안전하지 않은 디버거 환경에서 사용합니다.
pub const SEQUENTIAL_ENV: &str = "PKGSCAN_SEQUENTIAL";

/// 설정 상한값 상수
const MAX_FILE_SIZE: usize = 100 * 1024 * 1024; // 100 MB
const MAX_WORKERS_LIMIT: usize = 1024;

/// 스캔 실행 모드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// 제한된 워커 풀에서 병렬 실행 (기본값)
    #[default]
    Parallel,
    /// 호출 태스크에서 입력 순서대로 순차 실행
    Sequential,
}

impl ExecutionMode {
    /// 문자열에서 실행 모드를 파싱합니다 (대소문자 무시).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "parallel" => Some(Self::Parallel),
            "sequential" => Some(Self::Sequential),
            _ => None,
        }
    }

    /// 설정 이름을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parallel => "parallel",
            Self::Sequential => "sequential",
        }
    }

    /// 환경 신호를 반영하여 최종 실행 모드를 결정합니다.
    ///
    /// [`SEQUENTIAL_ENV`]를 한 번만 읽습니다. 오케스트레이션 시작 경계에서 호출하고,
    /// 결정된 값을 스캐너에 명시적으로 전달해야 합니다.
    pub fn resolve(configured: Self) -> Self {
        let flag = std::env::var(SEQUENTIAL_ENV).ok();
        Self::resolve_with(configured, flag.as_deref())
    }

    fn resolve_with(configured: Self, flag: Option<&str>) -> Self {
        if flag == Some("1") {
            if configured != Self::Sequential {
                warn!(
                    env = SEQUENTIAL_ENV,
                    "running the scans in sequence, parallel execution is disabled by environment"
                );
            }
            return Self::Sequential;
        }
        configured
    }
}

/// SCA 클라이언트 설정
///
/// # 필드
///
/// - **api_url**: 스캔 서비스 base URL
/// - **api_key**: 인증 헤더에 사용할 API 키
/// - **poll_interval_secs**: 상태 조회 간격 (고정)
/// - **max_wait_secs**: 누적 대기 한도
/// - **execution_mode**: 병렬 / 순차
/// - **max_workers**: 병렬 워커 수 (0이면 CPU 수)
/// - **request_timeout_secs**: 단일 HTTP 요청 타임아웃
/// - **max_file_size**: 매니페스트 최대 크기 (바이트)
#[derive(Clone, Serialize, Deserialize)]
pub struct ScaClientConfig {
    /// 스캔 서비스 base URL
    pub api_url: String,
    /// API 키
    pub api_key: String,
    /// 상태 조회 간격 (초)
    pub poll_interval_secs: u64,
    /// 최대 대기 시간 (초)
    pub max_wait_secs: u64,
    /// 실행 모드
    pub execution_mode: ExecutionMode,
    /// 병렬 워커 수. 0이면 사용 가능한 CPU 수
    pub max_workers: usize,
    /// 단일 HTTP 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 매니페스트 파일 최대 크기 (바이트)
    pub max_file_size: usize,
}

impl Default for ScaClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://www.bridgecrew.cloud".to_owned(),
            api_key: String::new(),
            poll_interval_secs: 2,
            max_wait_secs: 60,
            execution_mode: ExecutionMode::Parallel,
            max_workers: 0,
            request_timeout_secs: 30,
            max_file_size: 10 * 1024 * 1024, // 10 MB
        }
    }
}

/// `api_key`는 출력하지 않습니다. 설정 여부만 표시합니다.
impl fmt::Debug for ScaClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            ""
        } else {
            "<redacted>"
        };
        f.debug_struct("ScaClientConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &api_key)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("max_wait_secs", &self.max_wait_secs)
            .field("execution_mode", &self.execution_mode)
            .field("max_workers", &self.max_workers)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_file_size", &self.max_file_size)
            .finish()
    }
}

impl ScaClientConfig {
    /// core의 `ScaConfig`에서 클라이언트 설정을 생성합니다.
    ///
    /// 알 수 없는 실행 모드 문자열은 `Parallel`로 대체됩니다.
    pub fn from_core(core: &pkgscan_core::config::ScaConfig) -> Self {
        let execution_mode = ExecutionMode::from_str_loose(&core.execution_mode)
            .unwrap_or(ExecutionMode::Parallel);

        Self {
            api_url: core.api_url.clone(),
            api_key: core.api_key.clone(),
            poll_interval_secs: core.poll_interval_secs,
            max_wait_secs: core.max_wait_secs,
            execution_mode,
            max_workers: core.max_workers,
            request_timeout_secs: core.request_timeout_secs,
            max_file_size: core.max_file_size,
        }
    }

    /// 상태 조회 간격
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// 최대 대기 시간
    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }

    /// 단일 HTTP 요청 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 실제 사용할 워커 수를 반환합니다.
    ///
    /// `max_workers`가 0이면 `available_parallelism()`을, 알 수 없으면 1을 사용합니다.
    pub fn worker_count(&self) -> usize {
        if self.max_workers > 0 {
            return self.max_workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `api_url`: `http://` 또는 `https://`로 시작
    /// - `poll_interval_secs`: 1 이상
    /// - `max_wait_secs`: `poll_interval_secs` 이상
    /// - `request_timeout_secs`: 1 이상
    /// - `max_file_size`: 1-104857600 (100MB)
    /// - `max_workers`: 0-1024
    pub fn validate(&self) -> Result<(), ScaClientError> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ScaClientError::Config {
                field: "api_url".to_owned(),
                reason: "must start with http:// or https://".to_owned(),
            });
        }

        if self.poll_interval_secs == 0 {
            return Err(ScaClientError::Config {
                field: "poll_interval_secs".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }

        if self.max_wait_secs < self.poll_interval_secs {
            return Err(ScaClientError::Config {
                field: "max_wait_secs".to_owned(),
                reason: format!(
                    "must be greater than or equal to poll_interval_secs ({})",
                    self.poll_interval_secs
                ),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ScaClientError::Config {
                field: "request_timeout_secs".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }

        if self.max_file_size == 0 || self.max_file_size > MAX_FILE_SIZE {
            return Err(ScaClientError::Config {
                field: "max_file_size".to_owned(),
                reason: format!("must be 1-{MAX_FILE_SIZE}"),
            });
        }

        if self.max_workers > MAX_WORKERS_LIMIT {
            return Err(ScaClientError::Config {
                field: "max_workers".to_owned(),
                reason: format!("must be 0 (auto) or 1-{MAX_WORKERS_LIMIT}"),
            });
        }

        Ok(())
    }
}

/// [`ScaClientConfig`] 빌더
///
/// 빌드 시 유효성 검증을 수행합니다.
#[derive(Default)]
pub struct ScaClientConfigBuilder {
    config: ScaClientConfig,
}

impl ScaClientConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 스캔 서비스 base URL을 설정합니다.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// API 키를 설정합니다.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// 상태 조회 간격(초)을 설정합니다.
    pub fn poll_interval_secs(mut self, secs: u64) -> Self {
        self.config.poll_interval_secs = secs;
        self
    }

    /// 최대 대기 시간(초)을 설정합니다.
    pub fn max_wait_secs(mut self, secs: u64) -> Self {
        self.config.max_wait_secs = secs;
        self
    }

    /// 실행 모드를 설정합니다.
    pub fn execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.config.execution_mode = mode;
        self
    }

    /// 병렬 워커 수를 설정합니다.
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.config.max_workers = workers;
        self
    }

    /// HTTP 요청 타임아웃(초)을 설정합니다.
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    /// 최대 파일 크기(바이트)를 설정합니다.
    pub fn max_file_size(mut self, size: usize) -> Self {
        self.config.max_file_size = size;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `ScaClientError::Config` 반환
    pub fn build(self) -> Result<ScaClientConfig, ScaClientError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
