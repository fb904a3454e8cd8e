//! 패키지 매니페스트 탐지
//!
//! [`ManifestDetector`]는 파일 이름으로 스캔 서비스가 지원하는 매니페스트를 식별합니다.
//! [`collect_manifest_files`]는 명시된 파일과 디렉토리를 스캔 대상 목록으로 펼칩니다.
//!
//! # 지원 생태계
//!
//! npm, bower, pip/pipenv, maven, gradle, go modules, cargo, bundler, composer, nuget

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ScaClientError;

/// 패키지 생태계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// JavaScript (package.json, package-lock.json, yarn.lock)
    Npm,
    /// Bower (bower.json)
    Bower,
    /// Python (requirements.txt, Pipfile)
    Pip,
    /// Java (pom.xml)
    Maven,
    /// Java/Kotlin (build.gradle)
    Gradle,
    /// Go (go.mod, go.sum)
    Go,
    /// Rust (Cargo.toml, Cargo.lock)
    Cargo,
    /// Ruby (Gemfile)
    Bundler,
    /// PHP (composer.json)
    Composer,
    /// .NET (packages.config)
    Nuget,
}

impl Ecosystem {
    /// 생태계 이름 (소문자)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Bower => "bower",
            Self::Pip => "pip",
            Self::Maven => "maven",
            Self::Gradle => "gradle",
            Self::Go => "go",
            Self::Cargo => "cargo",
            Self::Bundler => "bundler",
            Self::Composer => "composer",
            Self::Nuget => "nuget",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 매니페스트 탐지기
///
/// 파일 이름 완전 일치로 판별합니다 (대소문자 구분).
pub struct ManifestDetector {
    /// 알려진 매니페스트 파일명 목록
    known_filenames: Vec<(&'static str, Ecosystem)>,
}

impl ManifestDetector {
    /// 기본 매니페스트 패턴으로 탐지기를 생성합니다.
    pub fn new() -> Self {
        Self {
            known_filenames: vec![
                ("package.json", Ecosystem::Npm),
                ("package-lock.json", Ecosystem::Npm),
                ("npm-shrinkwrap.json", Ecosystem::Npm),
                ("yarn.lock", Ecosystem::Npm),
                ("bower.json", Ecosystem::Bower),
                ("requirements.txt", Ecosystem::Pip),
                ("Pipfile", Ecosystem::Pip),
                ("Pipfile.lock", Ecosystem::Pip),
                ("pom.xml", Ecosystem::Maven),
                ("build.gradle", Ecosystem::Gradle),
                ("build.gradle.kts", Ecosystem::Gradle),
                ("gradle.properties", Ecosystem::Gradle),
                ("go.mod", Ecosystem::Go),
                ("go.sum", Ecosystem::Go),
                ("Cargo.toml", Ecosystem::Cargo),
                ("Cargo.lock", Ecosystem::Cargo),
                ("Gemfile", Ecosystem::Bundler),
                ("Gemfile.lock", Ecosystem::Bundler),
                ("composer.json", Ecosystem::Composer),
                ("composer.lock", Ecosystem::Composer),
                ("packages.config", Ecosystem::Nuget),
            ],
        }
    }

    /// 알려진 매니페스트 파일명 목록을 반환합니다.
    pub fn known_filenames(&self) -> &[(&'static str, Ecosystem)] {
        &self.known_filenames
    }

    /// 주어진 경로가 알려진 매니페스트인지 확인합니다.
    pub fn is_manifest(&self, path: &Path) -> bool {
        self.detect_ecosystem(path).is_some()
    }

    /// 매니페스트의 생태계를 반환합니다.
    pub fn detect_ecosystem(&self, path: &Path) -> Option<Ecosystem> {
        let file_name = path.file_name().and_then(|n| n.to_str())?;

        self.known_filenames
            .iter()
            .find(|(known, _)| *known == file_name)
            .map(|(_, eco)| *eco)
    }
}

impl Default for ManifestDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// 입력 경로를 스캔 대상 파일 목록으로 펼칩니다.
///
/// - 파일: 이름과 관계없이 그대로 포함 (사용자가 명시한 파일)
/// - 디렉토리: 1단계만 탐색하여 알려진 매니페스트를 이름순으로 포함
///
/// 입력 순서는 유지됩니다.
///
/// # Errors
///
/// 존재하지 않는 경로나 읽을 수 없는 디렉토리는 `ScaClientError::Io`를 반환합니다.
pub fn collect_manifest_files(
    inputs: &[PathBuf],
    detector: &ManifestDetector,
) -> Result<Vec<PathBuf>, ScaClientError> {
    let mut files = Vec::new();

    for input in inputs {
        let metadata = std::fs::metadata(input).map_err(|e| ScaClientError::Io {
            path: input.display().to_string(),
            source: e,
        })?;

        if !metadata.is_dir() {
            files.push(input.clone());
            continue;
        }

        let entries = std::fs::read_dir(input).map_err(|e| ScaClientError::Io {
            path: input.display().to_string(),
            source: e,
        })?;

        let mut found = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(dir = %input.display(), error = %e, "failed to read directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if path.is_file() && detector.is_manifest(&path) {
                found.push(path);
            }
        }
        found.sort();

        debug!(dir = %input.display(), manifests = found.len(), "directory scanned for manifests");
        files.extend(found);
    }

    Ok(files)
}
