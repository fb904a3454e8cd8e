//! 페이로드 인코딩 -- gzip + base64
//!
//! 제출 본문과 결과 페이로드 모두 같은 형식을 사용합니다.
//! `gzip(bytes)`를 표준 base64 알파벳(패딩 포함)으로 인코딩한 문자열입니다.

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde_json::Value;

use crate::error::ScaClientError;
use crate::types::ScanResult;

/// 바이트를 gzip 압축한 뒤 base64 문자열로 인코딩합니다.
pub fn compress_gzip_base64(content: &[u8]) -> Result<String, ScaClientError> {
    let compressed = gzip_into(Vec::with_capacity(content.len() / 2), content)?;
    Ok(STANDARD.encode(compressed))
}

/// `sink`에 gzip 스트림을 기록하고 돌려줍니다.
fn gzip_into<W: Write>(sink: W, content: &[u8]) -> Result<W, ScaClientError> {
    let mut encoder = GzEncoder::new(sink, Compression::default());
    encoder
        .write_all(content)
        .map_err(|e| ScaClientError::Encode(format!("gzip compression failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| ScaClientError::Encode(format!("gzip compression failed: {e}")))
}

/// base64 문자열을 디코딩한 뒤 gzip 압축을 해제합니다.
pub fn decompress_gzip_base64(payload: &str) -> Result<Vec<u8>, ScaClientError> {
    let compressed = STANDARD
        .decode(payload.trim())
        .map_err(|e| ScaClientError::Decode(format!("invalid base64: {e}")))?;

    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut raw = Vec::new();
    decoder
        .read_to_end(&mut raw)
        .map_err(|e| ScaClientError::Decode(format!("invalid gzip stream: {e}")))?;

    Ok(raw)
}

/// 결과 페이로드(`outputData`)를 [`ScanResult`]로 디코딩합니다.
///
/// 압축 해제된 본문은 JSON 객체여야 합니다.
pub fn decode_payload(payload: &str) -> Result<ScanResult, ScaClientError> {
    let raw = decompress_gzip_base64(payload)?;
    let value: Value = serde_json::from_slice(&raw)
        .map_err(|e| ScaClientError::Decode(format!("invalid JSON document: {e}")))?;

    match value {
        Value::Object(map) => Ok(ScanResult::from(map)),
        other => Err(ScaClientError::Decode(format!(
            "expected JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
