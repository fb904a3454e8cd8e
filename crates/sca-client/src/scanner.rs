//! SCA 스캐너 오케스트레이터 -- 파일 목록 전체의 스캔 흐름 관리
//!
//! [`ScaScanner`]는 입력 파일마다 독립적인 파이프라인(제출, 폴링)을 실행하고
//! 결과를 입력 순서대로 모아 반환합니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! paths --> ScaScanner --+-- Sequential: for path in paths (호출 태스크)
//!                        |
//!                        +-- Parallel: JoinSet + Semaphore(max_workers)
//!                                 |
//!                        worker: ScanContext::scan_file(path)
//!                                 |
//!                        (index, ScanResult) --> results[index]
//! ```
//!
//! # 실패 격리
//!
//! 파일 하나의 실패(전송, 디코딩, 파일 읽기, 워커 패닉)는 다른 파일에 영향을 주지 않습니다.
//! 해당 파일의 결과는 빈 결과 센티널이 되며 `warn!` 로그가 남습니다.
//! 병렬 모드는 `JoinSet`이, 순차 모드는 `catch_unwind`가 패닉을 격리합니다.

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use pkgscan_core::metrics as m;

use crate::auth::ApiKeyAuth;
use crate::config::{ExecutionMode, ScaClientConfig};
use crate::context::{ScanContext, Sleeper, TokioSleeper};
use crate::error::ScaClientError;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::ScanResult;

/// SCA 스캐너 오케스트레이터
///
/// 실행 모드는 생성 시점에 결정되며 이후 바뀌지 않습니다.
/// 공유 상태는 읽기 전용 [`ScanContext`]와 통계 카운터뿐입니다.
pub struct ScaScanner<T: Transport, S: Sleeper = TokioSleeper> {
    /// 읽기 전용 공유 컨텍스트
    context: Arc<ScanContext<T, S>>,
    /// 실행 모드
    mode: ExecutionMode,
    /// 병렬 모드 동시 실행 상한
    max_workers: usize,
    /// 결과를 얻은 파일 수
    scans_completed: Arc<AtomicU64>,
    /// 센티널로 대체된 파일 수
    scans_failed: Arc<AtomicU64>,
}

impl<T: Transport, S: Sleeper> ScaScanner<T, S> {
    /// 컨텍스트와 실행 모드로 스캐너를 생성합니다.
    ///
    /// `max_workers`가 0이면 1로 취급합니다.
    pub fn new(context: ScanContext<T, S>, mode: ExecutionMode, max_workers: usize) -> Self {
        Self {
            context: Arc::new(context),
            mode,
            max_workers: max_workers.max(1),
            scans_completed: Arc::new(AtomicU64::new(0)),
            scans_failed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 실행 모드
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// 병렬 모드 동시 실행 상한
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// 공유 컨텍스트
    pub fn context(&self) -> &ScanContext<T, S> {
        &self.context
    }

    /// 결과를 얻은 파일 수를 반환합니다.
    pub fn scans_completed(&self) -> u64 {
        self.scans_completed.load(Ordering::Relaxed)
    }

    /// 실패하여 빈 결과로 대체된 파일 수를 반환합니다.
    pub fn scans_failed(&self) -> u64 {
        self.scans_failed.load(Ordering::Relaxed)
    }

    /// 모든 파일을 스캔하고 입력 순서대로 결과를 반환합니다.
    ///
    /// 반환 길이는 항상 `paths.len()`과 같습니다.
    /// 개별 파일의 실패는 해당 위치의 빈 결과로 나타나며, 이 호출 자체는 실패하지 않습니다.
    pub async fn scan(&self, paths: &[PathBuf]) -> Vec<ScanResult> {
        info!(
            files = paths.len(),
            mode = self.mode.as_str(),
            workers = self.max_workers,
            "starting package scan"
        );

        let results = match self.mode {
            ExecutionMode::Sequential => self.scan_sequential(paths).await,
            ExecutionMode::Parallel => self.scan_parallel(paths).await,
        };

        let with_result = results.iter().filter(|r| !r.is_empty()).count();
        info!(files = results.len(), with_result, "package scan finished");
        results
    }

    async fn scan_sequential(&self, paths: &[PathBuf]) -> Vec<ScanResult> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let outcome = AssertUnwindSafe(scan_isolated(
                &self.context,
                path,
                &self.scans_completed,
                &self.scans_failed,
            ))
            .catch_unwind()
            .await;

            let result = match outcome {
                Ok(result) => result,
                Err(_) => {
                    warn!(path = %path.display(), "scan worker terminated abnormally");
                    self.record_abnormal_exit();
                    ScanResult::empty()
                }
            };
            results.push(result);
        }
        results
    }

    async fn scan_parallel(&self, paths: &[PathBuf]) -> Vec<ScanResult> {
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for (index, path) in paths.iter().cloned().enumerate() {
            let context = Arc::clone(&self.context);
            let semaphore = Arc::clone(&semaphore);
            let completed = Arc::clone(&self.scans_completed);
            let failed = Arc::clone(&self.scans_failed);

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    warn!(path = %path.display(), "worker pool closed before scan started");
                    failed.fetch_add(1, Ordering::Relaxed);
                    return (index, ScanResult::empty());
                };
                let result = scan_isolated(&context, &path, &completed, &failed).await;
                (index, result)
            });
        }

        // 패닉한 워커의 자리는 센티널로 남음
        let mut results = vec![ScanResult::empty(); paths.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = result,
                Err(e) => {
                    warn!(error = %e, "scan worker terminated abnormally");
                    self.record_abnormal_exit();
                }
            }
        }
        results
    }

    fn record_abnormal_exit(&self) {
        self.scans_failed.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(m::SCA_RESULTS_TOTAL, m::LABEL_RESULT => m::RESULT_FAILURE).increment(1);
    }
}

/// 파일 하나를 스캔하고 실패를 빈 결과로 변환합니다.
async fn scan_isolated<T: Transport, S: Sleeper>(
    context: &ScanContext<T, S>,
    path: &Path,
    completed: &AtomicU64,
    failed: &AtomicU64,
) -> ScanResult {
    info!(path = %path.display(), "start to scan package file");

    match context.scan_file(path).await {
        Ok(result) => {
            completed.fetch_add(1, Ordering::Relaxed);
            result
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "package scan failed");
            failed.fetch_add(1, Ordering::Relaxed);
            metrics::counter!(m::SCA_RESULTS_TOTAL, m::LABEL_RESULT => m::RESULT_FAILURE)
                .increment(1);
            ScanResult::empty()
        }
    }
}

/// SCA 스캐너 빌더
///
/// 설정을 검증하고 프로덕션 전송(`reqwest`)과 API 키 인증으로 스캐너를 구성합니다.
/// 실행 모드는 설정 값을 그대로 사용하므로, 환경 신호는 호출자가
/// [`ExecutionMode::resolve`]로 미리 반영해야 합니다.
pub struct ScaScannerBuilder {
    config: ScaClientConfig,
}

impl ScaScannerBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: ScaClientConfig::default(),
        }
    }

    /// 스캐너 설정을 지정합니다.
    pub fn config(mut self, config: ScaClientConfig) -> Self {
        self.config = config;
        self
    }

    /// 실행 모드를 지정합니다.
    pub fn execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.config.execution_mode = mode;
        self
    }

    /// 스캐너를 빌드합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증 실패 또는 HTTP 클라이언트 초기화 실패 시 `ScaClientError::Config` 반환
    pub fn build(self) -> Result<ScaScanner<ReqwestTransport>, ScaClientError> {
        self.config.validate()?;

        let transport = ReqwestTransport::new(self.config.request_timeout())?;
        let auth = Arc::new(ApiKeyAuth::new(self.config.api_key.clone()));
        let context = ScanContext::from_config(&self.config, transport, auth);

        Ok(ScaScanner::new(
            context,
            self.config.execution_mode,
            self.config.worker_count(),
        ))
    }
}

impl Default for ScaScannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
