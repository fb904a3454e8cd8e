//! HTTP 전송 추상화
//!
//! [`Transport`] 트레이트는 단일 HTTP 교환(요청 전송, JSON 응답 수신)을 추상화합니다.
//! 프로덕션 코드는 [`ReqwestTransport`]를, 테스트는 `MockTransport`를 사용합니다.
//!
//! ```text
//!  ScanContext
//!       |
//!       v
//!  Transport (trait)
//!     |        |
//!     v        v
//!  Reqwest    Mock
//!     |
//!     v
//!  scan service
//! ```

use std::future::Future;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::debug;

use crate::error::ScaClientError;

/// HTTP 요청
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP 메서드
    pub method: Method,
    /// 요청 URL
    pub url: String,
    /// 요청 헤더
    pub headers: HeaderMap,
    /// 폼 인코딩 본문 필드 (비어있으면 본문 없음)
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    /// 본문 없는 GET 요청을 생성합니다.
    pub fn get(url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers,
            form: Vec::new(),
        }
    }

    /// 폼 인코딩 본문을 가진 POST 요청을 생성합니다.
    pub fn post_form(
        url: impl Into<String>,
        headers: HeaderMap,
        form: Vec<(String, String)>,
    ) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers,
            form,
        }
    }
}

/// 파싱된 HTTP 응답
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP 상태 코드
    pub status: u16,
    /// JSON 본문 (비정상 상태에서 본문을 파싱할 수 없으면 `Null`)
    pub body: Value,
}

impl HttpResponse {
    /// 200 응답을 생성합니다.
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    /// 2xx 상태인지 반환합니다.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 전송 트레이트
///
/// 모든 원격 호출은 이 트레이트를 통과합니다.
/// `Send + Sync + 'static`이므로 여러 워커 태스크가 공유할 수 있습니다.
///
/// # Errors
///
/// 연결 실패, 요청 타임아웃, 2xx 응답의 JSON 파싱 실패 시 에러를 반환합니다.
/// 비정상 상태 코드 자체는 에러가 아니며 호출자가 [`HttpResponse::status`]로 판단합니다.
pub trait Transport: Send + Sync + 'static {
    /// 요청을 전송하고 응답을 반환합니다.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ScaClientError>> + Send;
}

/// `reqwest` 기반 프로덕션 전송 구현
///
/// 내부 `reqwest::Client`는 연결 풀을 공유하며 복제 비용이 낮습니다.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// 요청 타임아웃을 지정하여 전송을 생성합니다.
    ///
    /// # Errors
    ///
    /// TLS 백엔드 초기화 실패 시 `ScaClientError::Config`를 반환합니다.
    pub fn new(timeout: Duration) -> Result<Self, ScaClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScaClientError::Config {
                field: "request_timeout_secs".to_owned(),
                reason: format!("failed to build http client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ScaClientError> {
        let HttpRequest {
            method,
            url,
            headers,
            form,
        } = request;

        let mut builder = self.client.request(method.clone(), &url).headers(headers);
        if !form.is_empty() {
            builder = builder.form(&form);
        }

        let response = builder.send().await.map_err(|e| ScaClientError::Transport {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| ScaClientError::Transport {
            url: url.clone(),
            reason: format!("failed to read response body: {e}"),
        })?;

        debug!(%method, %url, status = status.as_u16(), bytes = bytes.len(), "http exchange completed");

        let body = if status.is_success() {
            serde_json::from_slice(&bytes).map_err(|e| {
                ScaClientError::MalformedResponse(format!("{url}: response is not JSON: {e}"))
            })?
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// 테스트용 Mock 전송
///
/// URL별로 응답 스크립트를 재생합니다. 스크립트의 마지막 응답은 계속 반복됩니다.
/// 모든 요청을 기록하여 호출 횟수와 헤더를 검증할 수 있습니다.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: std::sync::Mutex<std::collections::HashMap<String, std::collections::VecDeque<MockReply>>>,
    requests: std::sync::Mutex<Vec<HttpRequest>>,
}

#[cfg(test)]
#[derive(Clone)]
enum MockReply {
    Respond(HttpResponse),
    Fail(String),
}

#[cfg(test)]
impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// URL에 대한 응답 스크립트를 등록합니다.
    pub(crate) fn with_responses(self, url: &str, responses: Vec<HttpResponse>) -> Self {
        self.push(url, responses.into_iter().map(MockReply::Respond));
        self
    }

    /// URL 호출 시 전송 실패를 반환하도록 설정합니다.
    pub(crate) fn with_failure(self, url: &str, reason: &str) -> Self {
        self.push(url, std::iter::once(MockReply::Fail(reason.to_owned())));
        self
    }

    fn push(&self, url: &str, replies: impl Iterator<Item = MockReply>) {
        let mut routes = self.routes.lock().unwrap();
        routes.entry(url.to_owned()).or_default().extend(replies);
    }

    /// 기록된 요청 목록
    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// URL로 보낸 요청 수
    pub(crate) fn count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }
}

#[cfg(test)]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ScaClientError> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            routes.get_mut(&url).and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            })
        };

        match reply {
            Some(MockReply::Respond(response)) => Ok(response),
            Some(MockReply::Fail(reason)) => Err(ScaClientError::Transport { url, reason }),
            None => Ok(HttpResponse {
                status: 404,
                body: Value::Null,
            }),
        }
    }
}
