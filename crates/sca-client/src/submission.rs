//! 스캔 제출 프로토콜
//!
//! 파일 하나당 정확히 한 번 POST를 보내고 응답을 [`SubmissionOutcome`]으로 분류합니다.
//!
//! - `status == "already_exist"`: 응답의 `outputData`를 디코딩하여 즉시 결과 반환
//! - 그 외: 응답의 `id`로 새 스캔 작업을 추적
//!
//! 제출 요청은 POST이지만 헤더는 GET 범위로 생성합니다. 본문은 폼 인코딩입니다.

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use pkgscan_core::metrics as m;

use crate::codec;
use crate::context::{ScanContext, Sleeper};
use crate::error::ScaClientError;
use crate::transport::{HttpRequest, Transport};
use crate::types::{ScanRequest, SubmissionOutcome};

/// 캐시 히트를 나타내는 `status` 값
const STATUS_ALREADY_EXIST: &str = "already_exist";

impl<T: Transport, S: Sleeper> ScanContext<T, S> {
    /// 스캔 요청을 제출합니다.
    ///
    /// # Errors
    ///
    /// - `Transport`: 전송 실패 또는 비정상 상태 코드
    /// - `MalformedResponse`: 캐시 히트에 `outputData`가 없거나, 새 작업에 `id`가 없음
    /// - `Decode`: 캐시 히트 페이로드 디코딩 실패
    pub async fn submit(&self, request: &ScanRequest) -> Result<SubmissionOutcome, ScaClientError> {
        let url = self.scan_url();
        let headers = self.auth().headers(&Method::GET)?;

        info!(file = request.file_name(), "submitting manifest for scanning");
        metrics::counter!(m::SCA_SUBMISSIONS_TOTAL).increment(1);

        let response = self
            .transport()
            .send(HttpRequest::post_form(&url, headers, request.form_fields()))
            .await?;

        if !response.is_success() {
            return Err(ScaClientError::Transport {
                url,
                reason: format!("unexpected status {}", response.status),
            });
        }

        classify_submission(&response.body)
    }
}

/// 제출 응답 본문을 분류합니다.
fn classify_submission(body: &Value) -> Result<SubmissionOutcome, ScaClientError> {
    if body.get("status").and_then(Value::as_str) == Some(STATUS_ALREADY_EXIST) {
        let payload = body
            .get("outputData")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ScaClientError::MalformedResponse(
                    "cached submission response has no outputData".to_owned(),
                )
            })?;
        let result = codec::decode_payload(payload)?;
        metrics::counter!(m::SCA_CACHE_HITS_TOTAL).increment(1);
        return Ok(SubmissionOutcome::CacheHit(result));
    }

    let job_id = match body.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => {
            return Err(ScaClientError::MalformedResponse(
                "submission response has neither a cached result nor a scan id".to_owned(),
            ));
        }
    };

    debug!(job_id = %job_id, "scan job created");
    Ok(SubmissionOutcome::Pending { job_id })
}
