//! 인증 헤더 생성
//!
//! [`AuthProvider`]는 요청마다 새 헤더 맵을 생성합니다.
//! 헤더는 시간 제한이 있거나 서명될 수 있으므로 호출 간에 캐시하지 않습니다.
//! 구현체는 읽기 전용이며 여러 워커가 동시에 공유합니다.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};

use crate::error::ScaClientError;

/// 클라이언트 식별 헤더
const CLIENT_HEADER: &str = "x-api-client";
/// 클라이언트 버전 헤더
const CLIENT_VERSION_HEADER: &str = "x-api-client-version";

const CLIENT_NAME: &str = "pkgscan";

/// 인증 헤더 팩토리
///
/// `method`는 헤더의 범위를 지정합니다. 구현체는 메서드별로 다른 헤더를
/// 반환할 수 있습니다. 본문 형식 헤더는 transport가 본문에 맞춰 설정하므로
/// 여기서 넣지 않습니다.
pub trait AuthProvider: Send + Sync {
    /// 주어진 메서드 범위의 헤더를 새로 생성합니다.
    fn headers(&self, method: &Method) -> Result<HeaderMap, ScaClientError>;
}

/// API 키 기반 인증
///
/// `Authorization` 헤더에 API 키를 그대로 싣고 클라이언트 식별 헤더를 추가합니다.
/// 메서드와 관계없이 같은 헤더를 반환합니다.
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: String,
}

impl ApiKeyAuth {
    /// API 키로 인증 제공자를 생성합니다.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl AuthProvider for ApiKeyAuth {
    fn headers(&self, _method: &Method) -> Result<HeaderMap, ScaClientError> {
        let mut headers = HeaderMap::new();

        if !self.api_key.is_empty() {
            let mut value =
                HeaderValue::from_str(&self.api_key).map_err(|_| ScaClientError::Config {
                    field: "api_key".to_owned(),
                    reason: "contains characters not allowed in an HTTP header".to_owned(),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("pkgscan/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(CLIENT_HEADER, HeaderValue::from_static(CLIENT_NAME));
        headers.insert(
            CLIENT_VERSION_HEADER,
            HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
        );

        Ok(headers)
    }
}
