//! 공유 스캔 컨텍스트
//!
//! [`ScanContext`]는 모든 워커가 공유하는 읽기 전용 값입니다.
//! base URL, 전송, 인증 헤더 팩토리, 대기 정책을 담고 있으며
//! 생성 시점에 명시적으로 전달됩니다. 전역 상태를 읽지 않습니다.
//!
//! 파일 단위 파이프라인(제출, 폴링)은 `submission`, `polling` 모듈에서
//! 이 타입의 메서드로 구현됩니다.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use pkgscan_core::metrics as m;

use crate::auth::AuthProvider;
use crate::config::ScaClientConfig;
use crate::error::ScaClientError;
use crate::transport::Transport;
use crate::types::{ScanRequest, ScanResult, SubmissionOutcome};

const SCAN_PATH: &str = "api/v1/vulnerabilities/scan";
const SCAN_RESULTS_PATH: &str = "api/v1/vulnerabilities/scan-results";

/// 기본 상태 조회 간격
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// 기본 최대 대기 시간
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(60);
/// 기본 최대 파일 크기 (10 MB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// 대기 추상화
///
/// 폴링 루프의 대기를 분리하여 테스트에서 실제 시간 경과 없이
/// 대기 횟수와 길이를 검증할 수 있게 합니다.
pub trait Sleeper: Send + Sync + 'static {
    /// 지정된 시간만큼 대기합니다.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// `tokio::time::sleep` 기반 기본 구현
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

impl<S: Sleeper> Sleeper for Arc<S> {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.as_ref().sleep(duration)
    }
}

/// 읽기 전용 스캔 컨텍스트
pub struct ScanContext<T: Transport, S: Sleeper = TokioSleeper> {
    base_url: String,
    transport: T,
    auth: Arc<dyn AuthProvider>,
    sleeper: S,
    poll_interval: Duration,
    max_wait: Duration,
    max_file_size: usize,
}

impl<T: Transport> ScanContext<T, TokioSleeper> {
    /// 기본 대기 정책(2초 간격, 60초 한도)으로 컨텍스트를 생성합니다.
    pub fn new(base_url: impl Into<String>, transport: T, auth: Arc<dyn AuthProvider>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            base_url,
            transport,
            auth,
            sleeper: TokioSleeper,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// 클라이언트 설정에서 대기 정책을 가져와 컨텍스트를 생성합니다.
    pub fn from_config(config: &ScaClientConfig, transport: T, auth: Arc<dyn AuthProvider>) -> Self {
        Self::new(config.api_url.clone(), transport, auth)
            .with_poll_interval(config.poll_interval())
            .with_max_wait(config.max_wait())
            .with_max_file_size(config.max_file_size)
    }
}

impl<T: Transport, S: Sleeper> ScanContext<T, S> {
    /// 대기 구현을 교체합니다.
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> ScanContext<T, S2> {
        ScanContext {
            base_url: self.base_url,
            transport: self.transport,
            auth: self.auth,
            sleeper,
            poll_interval: self.poll_interval,
            max_wait: self.max_wait,
            max_file_size: self.max_file_size,
        }
    }

    /// 상태 조회 간격을 설정합니다.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// 최대 대기 시간을 설정합니다.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// 최대 파일 크기를 설정합니다.
    pub fn with_max_file_size(mut self, max_file_size: usize) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// 서비스 base URL (끝의 `/` 제거됨)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 상태 조회 간격
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// 최대 대기 시간
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// 전송 구현 참조
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn auth(&self) -> &dyn AuthProvider {
        self.auth.as_ref()
    }

    /// 대기 구현 참조
    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// 제출 엔드포인트 URL
    pub fn scan_url(&self) -> String {
        format!("{}/{SCAN_PATH}", self.base_url)
    }

    /// 스캔 작업 상태 조회 URL
    pub fn results_url(&self, job_id: &str) -> String {
        format!("{}/{SCAN_RESULTS_PATH}/{job_id}", self.base_url)
    }

    /// 파일 하나의 전체 파이프라인을 실행합니다.
    ///
    /// 파일 읽기 및 인코딩, 제출, 필요한 경우 폴링까지 수행합니다.
    /// 서버 에러와 타임아웃은 빈 결과로 해소되며, 그 외 실패는 에러로 반환됩니다.
    pub async fn scan_file(&self, path: &Path) -> Result<ScanResult, ScaClientError> {
        let started = Instant::now();
        let request = ScanRequest::from_file(path, self.max_file_size).await?;

        let result = match self.submit(&request).await? {
            SubmissionOutcome::CacheHit(result) => {
                debug!(file = %path.display(), "scan result served from cache");
                metrics::counter!(m::SCA_RESULTS_TOTAL, m::LABEL_RESULT => m::RESULT_SUCCESS)
                    .increment(1);
                result
            }
            SubmissionOutcome::Pending { job_id } => self.poll(&job_id).await?,
        };

        metrics::histogram!(m::SCA_SCAN_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        Ok(result)
    }
}

/// 테스트용 대기 기록기
///
/// 실제로 대기하지 않고 요청된 대기 시간만 기록합니다.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    sleeps: std::sync::Mutex<Vec<Duration>>,
}

#[cfg(test)]
impl RecordingSleeper {
    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ApiKeyAuth;
    use crate::codec;
    use crate::transport::{HttpResponse, MockTransport};
    use serde_json::json;

    const BASE: &str = "http://scan.test";

    fn context(mock: MockTransport) -> ScanContext<MockTransport, Arc<RecordingSleeper>> {
        ScanContext::new(BASE, mock, Arc::new(ApiKeyAuth::new("key")))
            .with_sleeper(Arc::new(RecordingSleeper::default()))
    }

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let ctx = ScanContext::new(
            "http://scan.test/",
            MockTransport::new(),
            Arc::new(ApiKeyAuth::new("")),
        );
        assert_eq!(ctx.base_url(), "http://scan.test");
        assert_eq!(ctx.scan_url(), "http://scan.test/api/v1/vulnerabilities/scan");
        assert_eq!(
            ctx.results_url("job-1"),
            "http://scan.test/api/v1/vulnerabilities/scan-results/job-1"
        );
    }

    #[test]
    fn default_wait_policy() {
        let ctx = ScanContext::new(BASE, MockTransport::new(), Arc::new(ApiKeyAuth::new("")));
        assert_eq!(ctx.poll_interval(), Duration::from_secs(2));
        assert_eq!(ctx.max_wait(), Duration::from_secs(60));
    }

    #[test]
    fn from_config_applies_wait_policy() {
        let config = ScaClientConfig {
            api_url: "https://scan.example/".to_owned(),
            poll_interval_secs: 5,
            max_wait_secs: 30,
            ..Default::default()
        };
        let ctx = ScanContext::from_config(&config, MockTransport::new(), Arc::new(ApiKeyAuth::new("")));
        assert_eq!(ctx.base_url(), "https://scan.example");
        assert_eq!(ctx.poll_interval(), Duration::from_secs(5));
        assert_eq!(ctx.max_wait(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn scan_file_cache_hit_skips_polling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, r#"{"name":"app"}"#).unwrap();

        let payload = codec::compress_gzip_base64(br#"{"packages":["lodash"]}"#).unwrap();
        let mock = MockTransport::new().with_responses(
            &format!("{BASE}/api/v1/vulnerabilities/scan"),
            vec![HttpResponse::ok(json!({"status": "already_exist", "outputData": payload}))],
        );
        let ctx = context(mock);

        let result = ctx.scan_file(&path).await.unwrap();
        assert_eq!(result.get("packages").unwrap()[0], "lodash");
        assert_eq!(ctx.transport().requests().len(), 1);
        assert!(ctx.sleeper().sleeps().is_empty());
    }

    #[tokio::test]
    async fn scan_file_pending_then_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        std::fs::write(&path, "flask==2.0.0\n").unwrap();

        let payload = codec::compress_gzip_base64(br#"{"vulnerabilities":[]}"#).unwrap();
        let mock = MockTransport::new()
            .with_responses(
                &format!("{BASE}/api/v1/vulnerabilities/scan"),
                vec![HttpResponse::ok(json!({"status": "created", "id": "job-7"}))],
            )
            .with_responses(
                &format!("{BASE}/api/v1/vulnerabilities/scan-results/job-7"),
                vec![
                    HttpResponse::ok(json!({"outputType": "Empty", "outputData": ""})),
                    HttpResponse::ok(json!({"outputType": "Result", "outputData": payload})),
                ],
            );
        let ctx = context(mock);

        let result = ctx.scan_file(&path).await.unwrap();
        assert!(result.get("vulnerabilities").is_some());
        assert_eq!(ctx.sleeper().sleeps(), vec![Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn scan_file_missing_file_fails_before_network() {
        let ctx = context(MockTransport::new());
        let err = ctx.scan_file(Path::new("/nonexistent/go.mod")).await.unwrap_err();
        assert!(matches!(err, ScaClientError::Io { .. }));
        assert!(ctx.transport().requests().is_empty());
    }
}
