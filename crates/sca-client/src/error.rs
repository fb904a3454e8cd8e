//! SCA 클라이언트 에러 타입
//!
//! [`ScaClientError`]는 스캔 클라이언트 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<ScaClientError> for PkgscanError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **HTTP 교환**: `Transport`, `MalformedResponse`
//! - **서버 보고 에러**: `Service`
//! - **로컬 대기 한도 초과**: `Timeout`
//! - **페이로드**: `Encode` (제출 본문), `Decode` (결과)
//! - **입력 파일**: `Io`, `FileTooBig`
//! - **설정**: `Config`
//!
//! `Service`와 `Timeout`은 폴링 내부에서 빈 결과로 해소되며 호출자에게 전파되지 않습니다.

use pkgscan_core::error::{ConfigError, PkgscanError, ScaError};

/// SCA 클라이언트 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScaClientError {
    /// HTTP 요청 실패 또는 비정상 상태 코드
    #[error("transport error: {url}: {reason}")]
    Transport {
        /// 요청 URL
        url: String,
        /// 실패 사유
        reason: String,
    },

    /// 서버가 스캔 작업의 Error 상태를 보고함
    #[error("scan service reported an error: {0}")]
    Service(String),

    /// 최대 대기 시간 초과
    #[error("timed out after waiting {elapsed_secs}s for scan result")]
    Timeout {
        /// 누적 대기 시간 (초)
        elapsed_secs: u64,
    },

    /// 제출 본문 압축 실패
    #[error("payload encode error: {0}")]
    Encode(String),

    /// 결과 페이로드 디코딩 실패 (base64, gzip, JSON)
    #[error("payload decode error: {0}")]
    Decode(String),

    /// 응답에 필수 필드가 없거나 형식이 잘못됨
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 파일 크기 초과
    #[error("file too large: {path}: {size} bytes (max: {max})")]
    FileTooBig {
        /// 파일 경로
        path: String,
        /// 실제 파일 크기 (바이트)
        size: usize,
        /// 최대 허용 크기 (바이트)
        max: usize,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<ScaClientError> for PkgscanError {
    fn from(err: ScaClientError) -> Self {
        match err {
            ScaClientError::Transport { url, reason } => {
                PkgscanError::Sca(ScaError::Transport(format!("{url}: {reason}")))
            }
            ScaClientError::MalformedResponse(msg) => PkgscanError::Sca(ScaError::Transport(
                format!("malformed response: {msg}"),
            )),
            ScaClientError::Encode(msg) => PkgscanError::Sca(ScaError::ScanFailed(format!(
                "payload encode error: {msg}"
            ))),
            ScaClientError::Decode(msg) => PkgscanError::Sca(ScaError::Decode(msg)),
            ScaClientError::Service(msg) => PkgscanError::Sca(ScaError::ScanFailed(msg)),
            ScaClientError::Timeout { elapsed_secs } => PkgscanError::Sca(ScaError::ScanFailed(
                format!("timed out after {elapsed_secs}s"),
            )),
            ScaClientError::Io { path, source } => PkgscanError::Sca(ScaError::ScanFailed(
                format!("io error: {path}: {source}"),
            )),
            ScaClientError::FileTooBig { path, size, max } => {
                PkgscanError::Sca(ScaError::ScanFailed(format!(
                    "file too large: {path}: {size} bytes (max: {max})"
                )))
            }
            ScaClientError::Config { field, reason } => {
                PkgscanError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}
