//! 도메인 타입 -- 스캔 요청, 제출 결과, 폴링 상태, 스캔 결과
//!
//! [`ScanRequest`]는 입력 파일 하나에 대한 제출 요청 본문입니다.
//! [`SubmissionOutcome`]은 제출 직후 응답의 분류 결과입니다.
//! [`PollState`]는 상태 조회 루프의 상태입니다.
//! [`ScanResult`]는 서비스가 반환한 결과 문서이며, 스키마는 이 크레이트가 소유하지 않습니다.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec;
use crate::error::ScaClientError;

/// 압축 방식 (서비스가 인식하는 유일한 값)
pub const COMPRESSION_METHOD_GZIP: &str = "gzip";

/// 단일 파일 스캔 요청
///
/// 파일마다 한 번 생성되고, 제출 프로토콜이 한 번 소비한 뒤 버려집니다.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    file_path: PathBuf,
    file_name: String,
    compressed_body: String,
}

impl ScanRequest {
    /// 파일 내용으로 요청을 생성합니다 (gzip + base64 인코딩 수행).
    pub fn new(file_path: impl Into<PathBuf>, content: &[u8]) -> Result<Self, ScaClientError> {
        let file_path = file_path.into();
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_path.display().to_string());
        let compressed_body = codec::compress_gzip_base64(content)?;

        Ok(Self {
            file_path,
            file_name,
            compressed_body,
        })
    }

    /// 디스크에서 파일을 읽어 요청을 생성합니다.
    ///
    /// `max_file_size`를 넘는 파일은 읽지 않고 거부합니다.
    pub async fn from_file(path: &Path, max_file_size: usize) -> Result<Self, ScaClientError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ScaClientError::Io {
                path: path.display().to_string(),
                source: e,
            })?;

        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > max_file_size {
            return Err(ScaClientError::FileTooBig {
                path: path.display().to_string(),
                size,
                max: max_file_size,
            });
        }

        let content = tokio::fs::read(path)
            .await
            .map_err(|e| ScaClientError::Io {
                path: path.display().to_string(),
                source: e,
            })?;

        Self::new(path, &content)
    }

    /// 원본 파일 경로
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// 파일 이름 (경로의 마지막 구성요소)
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// gzip + base64로 인코딩된 파일 내용
    pub fn compressed_body(&self) -> &str {
        &self.compressed_body
    }

    /// 압축 방식
    pub fn compression_method(&self) -> &'static str {
        COMPRESSION_METHOD_GZIP
    }

    /// 제출 요청의 폼 필드를 생성합니다.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            ("compressedFileBody".to_owned(), self.compressed_body.clone()),
            (
                "compressionMethod".to_owned(),
                self.compression_method().to_owned(),
            ),
            ("fileName".to_owned(), self.file_name.clone()),
        ]
    }
}

/// 제출 직후 응답의 분류
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// 이미 스캔된 파일 -- 결과가 응답에 포함됨
    CacheHit(ScanResult),
    /// 새 스캔 작업이 생성됨 -- 폴링 필요
    Pending {
        /// 서버 측 스캔 작업 ID
        job_id: String,
    },
}

/// 폴링 상태
///
/// `Empty`에서 시작하며 `Result`, `Error`, `TimedOut` 중 하나에서 종료합니다.
/// 종료 상태에서 다른 상태로 전이하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// 초기 상태 / 아직 결과 없음
    Empty,
    /// 서버가 결과를 보고함
    Result,
    /// 서버가 에러를 보고함
    Error,
    /// 로컬 대기 한도 초과
    TimedOut,
}

impl PollState {
    /// 서버 응답의 `outputType` 값을 상태로 변환합니다.
    ///
    /// `"Result"`, `"Error"` 외의 값은 모두 아직 준비되지 않은 것으로 봅니다.
    pub fn from_output_type(output_type: &str) -> Self {
        match output_type {
            "Result" => Self::Result,
            "Error" => Self::Error,
            _ => Self::Empty,
        }
    }

    /// 종료 상태인지 반환합니다.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Empty)
    }

    /// 상태 이름 (로그용)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Result => "result",
            Self::Error => "error",
            Self::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 스캔 결과 문서
///
/// 서비스가 반환한 JSON 객체를 그대로 보관합니다.
/// 빈 객체는 "사용 가능한 결과 없음"을 나타내는 센티널입니다
/// (서버 에러, 타임아웃, 파일 단위 실패).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanResult(Map<String, Value>);

impl ScanResult {
    /// 빈 결과 센티널을 생성합니다.
    pub fn empty() -> Self {
        Self(Map::new())
    }

    /// 결과가 비어있는지 반환합니다.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 최상위 키로 값을 조회합니다.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 내부 JSON 객체 참조
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// 내부 JSON 객체를 꺼냅니다.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ScanResult {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
