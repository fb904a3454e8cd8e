//! 메트릭 이름 및 레이블 상수
//!
//! 모든 메트릭의 이름과 레이블을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더가 설치되지 않은 경우 `metrics` 파사드는 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `pkgscan_`
//! - 모듈명: `sca_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(pkgscan_core::metrics::SCA_SUBMISSIONS_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, service_error, timeout, failure)
pub const LABEL_RESULT: &str = "result";

// ─── 레이블 값 상수 ────────────────────────────────────────────────

/// 결과 레이블 값: 정상 결과 수신
pub const RESULT_SUCCESS: &str = "success";

/// 결과 레이블 값: 서버가 Error 상태를 보고
pub const RESULT_SERVICE_ERROR: &str = "service_error";

/// 결과 레이블 값: 로컬 대기 한도 초과
pub const RESULT_TIMEOUT: &str = "timeout";

/// 결과 레이블 값: 전송/디코딩 등 파일 단위 실패
pub const RESULT_FAILURE: &str = "failure";

// ─── SCA 클라이언트 메트릭 ──────────────────────────────────────────

/// SCA: 스캔 제출 요청 수 (counter)
pub const SCA_SUBMISSIONS_TOTAL: &str = "pkgscan_sca_submissions_total";

/// SCA: 캐시 히트로 즉시 반환된 결과 수 (counter)
pub const SCA_CACHE_HITS_TOTAL: &str = "pkgscan_sca_cache_hits_total";

/// SCA: 상태 조회 요청 수 (counter)
pub const SCA_STATUS_QUERIES_TOTAL: &str = "pkgscan_sca_status_queries_total";

/// SCA: 파일별 최종 결과 수 (counter, label: result)
pub const SCA_RESULTS_TOTAL: &str = "pkgscan_sca_results_total";

/// SCA: 단일 파일 스캔 소요 시간 (histogram, 초)
pub const SCA_SCAN_DURATION_SECONDS: &str = "pkgscan_sca_scan_duration_seconds";
