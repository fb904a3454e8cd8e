//! 고정 간격 상태 폴링
//!
//! 스캔 작업이 종료 상태에 도달할 때까지 결과 엔드포인트를 조회합니다.
//!
//! ```text
//!            +-------------------------------+
//!            v                               |
//!  query -> outputType                       |
//!            |-- "Result" --> decode, return |
//!            |-- "Error"  --> log, sentinel  |
//!            +-- other    --> sleep(interval), elapsed += interval
//!                               |
//!                               +-- elapsed > max_wait --> log, sentinel
//! ```
//!
//! 간격은 고정이며 백오프나 지터가 없습니다. 기본값(2초, 60초)에서
//! 상태 조회는 최대 31회입니다.

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, error, info};

use pkgscan_core::metrics as m;

use crate::codec;
use crate::context::{ScanContext, Sleeper};
use crate::error::ScaClientError;
use crate::transport::{HttpRequest, Transport};
use crate::types::{PollState, ScanResult};

impl<T: Transport, S: Sleeper> ScanContext<T, S> {
    /// 스캔 작업을 완료될 때까지 폴링합니다.
    ///
    /// 서버가 보고한 에러와 대기 한도 초과는 로그를 남기고 빈 결과로 반환합니다.
    ///
    /// # Errors
    ///
    /// - `Transport`: 전송 실패 또는 비정상 상태 코드
    /// - `MalformedResponse`: 응답에 `outputType` 또는 결과의 `outputData`가 없음
    /// - `Decode`: 결과 페이로드 디코딩 실패
    pub async fn poll(&self, job_id: &str) -> Result<ScanResult, ScaClientError> {
        match self.wait_for_result(job_id).await {
            Ok(result) => {
                metrics::counter!(m::SCA_RESULTS_TOTAL, m::LABEL_RESULT => m::RESULT_SUCCESS)
                    .increment(1);
                Ok(result)
            }
            Err(ScaClientError::Service(details)) => {
                error!(job_id, details = %details, "scan service reported an error");
                metrics::counter!(m::SCA_RESULTS_TOTAL, m::LABEL_RESULT => m::RESULT_SERVICE_ERROR)
                    .increment(1);
                Ok(ScanResult::empty())
            }
            Err(ScaClientError::Timeout { elapsed_secs }) => {
                info!(job_id, elapsed_secs, "timed out waiting for scan result");
                metrics::counter!(m::SCA_RESULTS_TOTAL, m::LABEL_RESULT => m::RESULT_TIMEOUT)
                    .increment(1);
                Ok(ScanResult::empty())
            }
            Err(e) => Err(e),
        }
    }

    /// 폴링 루프 본체. 종료 상태를 에러 variant로 구분하여 반환합니다.
    async fn wait_for_result(&self, job_id: &str) -> Result<ScanResult, ScaClientError> {
        let url = self.results_url(job_id);
        let interval = self.poll_interval();
        let mut elapsed = Duration::ZERO;
        let mut queries: u32 = 0;

        loop {
            let headers = self.auth().headers(&Method::GET)?;
            let response = self
                .transport()
                .send(HttpRequest::get(&url, headers))
                .await?;
            queries += 1;
            metrics::counter!(m::SCA_STATUS_QUERIES_TOTAL).increment(1);

            if !response.is_success() {
                return Err(ScaClientError::Transport {
                    url,
                    reason: format!("unexpected status {}", response.status),
                });
            }

            let output_type = response
                .body
                .get("outputType")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ScaClientError::MalformedResponse(format!(
                        "status response for job {job_id} has no outputType"
                    ))
                })?;
            let state = PollState::from_output_type(output_type);
            debug!(job_id, queries, state = %state, "scan status received");

            match state {
                PollState::Result => {
                    let payload = response
                        .body
                        .get("outputData")
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            ScaClientError::MalformedResponse(format!(
                                "result for job {job_id} has no outputData"
                            ))
                        })?;
                    return codec::decode_payload(payload);
                }
                PollState::Error => {
                    let details = match response.body.get("outputData") {
                        Some(Value::String(s)) => s.clone(),
                        Some(other) => other.to_string(),
                        None => String::new(),
                    };
                    return Err(ScaClientError::Service(details));
                }
                PollState::TimedOut => {
                    return Err(ScaClientError::Timeout {
                        elapsed_secs: elapsed.as_secs(),
                    });
                }
                PollState::Empty => {
                    self.sleeper().sleep(interval).await;
                    elapsed += interval;

                    if elapsed > self.max_wait() {
                        debug!(job_id, queries, state = %PollState::TimedOut, "poll ceiling exceeded");
                        return Err(ScaClientError::Timeout {
                            elapsed_secs: elapsed.as_secs(),
                        });
                    }
                }
            }
        }
    }
}
