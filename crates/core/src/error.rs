//! 에러 타입 -- 도메인별 에러 정의

/// pkgscan 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum PkgscanError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 취약점 스캔 서비스 연동 에러
    #[error("sca error: {0}")]
    Sca(#[from] ScaError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 스캔 서비스 연동 에러
#[derive(Debug, thiserror::Error)]
pub enum ScaError {
    /// HTTP 교환 실패
    #[error("transport failed: {0}")]
    Transport(String),

    /// 페이로드 디코딩 실패
    #[error("decode failed: {0}")]
    Decode(String),

    /// 스캔 수행 실패
    #[error("scan failed: {0}")]
    ScanFailed(String),
}
