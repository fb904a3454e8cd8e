//! 패키지 매니페스트 원격 취약점 스캔 클라이언트
//!
//! 로컬 매니페스트 파일(`package.json`, `requirements.txt`, `pom.xml` 등)을
//! 원격 스캔 서비스에 제출하고, 비동기 스캔 작업을 완료될 때까지 추적하여
//! 파싱된 결과 문서를 입력 순서대로 반환합니다.
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`ScaClientError`)
//! - [`config`]: Client configuration (`ScaClientConfig`, builder, `ExecutionMode`)
//! - [`types`]: Domain types (`ScanRequest`, `SubmissionOutcome`, `PollState`, `ScanResult`)
//! - [`codec`]: gzip + base64 payload encoding/decoding
//! - [`auth`]: Authorization header factory (`AuthProvider`, `ApiKeyAuth`)
//! - [`transport`]: HTTP abstraction (`Transport`, `ReqwestTransport`)
//! - [`context`]: Shared read-only scan context (`ScanContext`, `Sleeper`)
//! - [`submission`]: Scan submission protocol
//! - [`polling`]: Fixed-interval status polling
//! - [`manifest`]: Package manifest detection (`ManifestDetector`)
//! - [`scanner`]: Main orchestrator (`ScaScanner`, `ScaScannerBuilder`)
//!
//! # Architecture
//!
//! ```text
//! input files --> ScaScanner (Sequential | Parallel worker pool)
//!                     |
//!                     +--> per file: ScanRequest (codec: gzip + base64)
//!                                        |
//!                                  POST /scan --------------------+
//!                                        |                        |
//!                              status == already_exist        pending id
//!                                        |                        |
//!                                  decode outputData     GET /scan-results/{id}
//!                                        |                (fixed interval, ceiling)
//!                                        |                        |
//!                                        +-----> ScanResult <-----+
//! ```

pub mod auth;
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod manifest;
pub mod polling;
pub mod scanner;
pub mod submission;
pub mod transport;
pub mod types;

// --- Public API Re-exports ---

// Scanner (main orchestrator)
pub use scanner::{ScaScanner, ScaScannerBuilder};

// Configuration
pub use config::{ExecutionMode, ScaClientConfig, ScaClientConfigBuilder};

// Error
pub use error::ScaClientError;

// Types
pub use types::{PollState, ScanRequest, ScanResult, SubmissionOutcome};

// Collaborators
pub use auth::{ApiKeyAuth, AuthProvider};
pub use context::{ScanContext, Sleeper, TokioSleeper};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

// Manifest detection
pub use manifest::{Ecosystem, ManifestDetector};
