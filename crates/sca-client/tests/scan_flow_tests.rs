//! Integration tests for the scan flow
//!
//! Drives `ScaScanner` end to end (file -> submission -> polling -> ordered results)
//! against a scripted transport.

mod helpers;

use std::time::Duration;

use pkgscan_sca_client::{ExecutionMode, ScanResult};
use serde_json::json;

use helpers::*;

#[tokio::test]
async fn test_results_match_input_length_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let paths = manifests(
        dir.path(),
        &["package.json", "requirements.txt", "pom.xml", "go.mod", "Gemfile"],
    );

    let mock = MockTransport::new()
        .on_submit("package.json", cache_hit(&json!({"file": 0})))
        .on_submit("requirements.txt", pending("job-1"))
        .on(&results_url("job-1"), vec![status_result(&json!({"file": 1}))])
        .on_submit("pom.xml", pending("job-2"))
        .on(&results_url("job-2"), vec![status_error("unsupported")])
        .on_submit("go.mod", cache_hit(&json!({"file": 3})))
        .on_submit("Gemfile", pending("job-4"))
        .on(
            &results_url("job-4"),
            vec![status_empty(), status_result(&json!({"file": 4}))],
        );

    let scanner = scanner(mock, ExecutionMode::Parallel);
    let results = scanner.scan(&paths).await;

    assert_eq!(results.len(), paths.len());
    assert_eq!(results[0].get("file").unwrap(), 0);
    assert_eq!(results[1].get("file").unwrap(), 1);
    assert!(results[2].is_empty(), "server error resolves to the sentinel");
    assert_eq!(results[3].get("file").unwrap(), 3);
    assert_eq!(results[4].get("file").unwrap(), 4);
}

#[tokio::test]
async fn test_cache_hit_issues_no_status_queries() {
    let dir = tempfile::tempdir().unwrap();
    let paths = manifests(dir.path(), &["package-lock.json"]);
    let doc = json!({"packages": [{"name": "minimist", "version": "1.2.5"}]});

    let scanner = scanner(
        MockTransport::new().on_submit("package-lock.json", cache_hit(&doc)),
        ExecutionMode::Sequential,
    );
    let results = scanner.scan(&paths).await;

    assert_eq!(results[0].as_map(), doc.as_object().unwrap());
    assert_eq!(scanner.context().transport().count(SCAN_URL), 1);
    assert_eq!(scanner.context().transport().status_queries(), 0);
    assert_eq!(scanner.context().sleeper().count(), 0);
}

#[tokio::test]
async fn test_empty_empty_result_polls_three_times_and_sleeps_twice() {
    let dir = tempfile::tempdir().unwrap();
    let paths = manifests(dir.path(), &["Pipfile.lock"]);
    let doc = json!({"vulnerabilities": [{"id": "CVE-2022-40897", "severity": "medium"}]});

    let mock = MockTransport::new()
        .on_submit("Pipfile.lock", pending("job-a"))
        .on(
            &results_url("job-a"),
            vec![status_empty(), status_empty(), status_result(&doc)],
        );
    let scanner = scanner(mock, ExecutionMode::Sequential);
    let results = scanner.scan(&paths).await;

    assert_eq!(results[0].get("vulnerabilities").unwrap()[0]["id"], "CVE-2022-40897");
    assert_eq!(scanner.context().transport().count(&results_url("job-a")), 3);
    assert_eq!(scanner.context().sleeper().count(), 2);
    assert_eq!(scanner.context().sleeper().total(), Duration::from_secs(4));
}

#[tokio::test]
async fn test_always_empty_times_out_with_bounded_queries() {
    let dir = tempfile::tempdir().unwrap();
    let paths = manifests(dir.path(), &["composer.lock"]);

    let mock = MockTransport::new()
        .on_submit("composer.lock", pending("job-slow"))
        .on(&results_url("job-slow"), vec![status_empty()]);
    let scanner = scanner(mock, ExecutionMode::Sequential);
    let results = scanner.scan(&paths).await;

    assert_eq!(results, vec![ScanResult::empty()]);
    let queries = scanner.context().transport().count(&results_url("job-slow"));
    assert!(queries <= 31, "expected at most 31 queries, got {queries}");
    assert_eq!(queries, 31);
    assert!(scanner.context().sleeper().total() > Duration::from_secs(60));
    // 타임아웃은 파일 실패가 아님
    assert_eq!(scanner.scans_failed(), 0);
}

#[tokio::test]
async fn test_error_on_first_query_stops_after_one_query() {
    let dir = tempfile::tempdir().unwrap();
    let paths = manifests(dir.path(), &["build.gradle"]);

    let mock = MockTransport::new()
        .on_submit("build.gradle", pending("job-err"))
        .on(&results_url("job-err"), vec![status_error("failed to parse manifest")]);
    let scanner = scanner(mock, ExecutionMode::Sequential);
    let results = scanner.scan(&paths).await;

    assert!(results[0].is_empty());
    assert_eq!(scanner.context().transport().count(&results_url("job-err")), 1);
    assert_eq!(scanner.context().sleeper().count(), 0);
}

#[tokio::test]
async fn test_failed_submission_only_affects_its_own_index() {
    let dir = tempfile::tempdir().unwrap();
    let paths = manifests(dir.path(), &["package.json", "requirements.txt", "go.sum"]);

    for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
        let mock = MockTransport::new()
            .on_submit("package.json", cache_hit(&json!({"index": 0})))
            .fail_submit("requirements.txt")
            .on_submit("go.sum", cache_hit(&json!({"index": 2})));
        let scanner = scanner(mock, mode);
        let results = scanner.scan(&paths).await;

        assert_eq!(results.len(), 3, "mode {mode:?}");
        assert_eq!(results[0].get("index").unwrap(), 0);
        assert!(results[1].is_empty());
        assert_eq!(results[2].get("index").unwrap(), 2);
        assert_eq!(scanner.scans_completed(), 2);
        assert_eq!(scanner.scans_failed(), 1);
    }
}

#[tokio::test]
async fn test_sequential_and_parallel_return_identical_sequences() {
    let dir = tempfile::tempdir().unwrap();
    let paths = manifests(
        dir.path(),
        &["package.json", "yarn.lock", "Cargo.lock", "packages.config"],
    );

    let script = || {
        MockTransport::new()
            .on_submit("package.json", cache_hit(&json!({"name": "package.json"})))
            .on_submit("yarn.lock", pending("job-y"))
            .on(
                &results_url("job-y"),
                vec![status_empty(), status_result(&json!({"name": "yarn.lock"}))],
            )
            .on_submit("Cargo.lock", pending("job-c"))
            .on(&results_url("job-c"), vec![status_error("boom")])
            .fail_submit("packages.config")
    };

    let sequential = scanner(script(), ExecutionMode::Sequential).scan(&paths).await;
    let parallel = scanner(script(), ExecutionMode::Parallel).scan(&paths).await;

    assert_eq!(sequential, parallel);
    assert_eq!(sequential.len(), 4);
}

#[tokio::test]
async fn test_parallel_preserves_order_when_completion_order_differs() {
    let dir = tempfile::tempdir().unwrap();
    let paths = manifests(dir.path(), &["slow.json", "fast.json"]);

    let mock = MockTransport::new()
        .on_submit("slow.json", cache_hit(&json!({"name": "slow"})))
        .on_submit("fast.json", cache_hit(&json!({"name": "fast"})))
        .delay(&format!("{SCAN_URL}#slow.json"), Duration::from_millis(100));

    let scanner = scanner(mock, ExecutionMode::Parallel);
    let results = scanner.scan(&paths).await;

    assert_eq!(results[0].get("name").unwrap(), "slow");
    assert_eq!(results[1].get("name").unwrap(), "fast");
}

async fn assert_worker_panic_is_contained(mode: ExecutionMode) {
    let dir = tempfile::tempdir().unwrap();
    let paths = manifests(dir.path(), &["package.json", "pom.xml", "go.mod"]);

    let mock = MockTransport::new()
        .on_submit("package.json", cache_hit(&json!({"ok": 0})))
        .panic_submit("pom.xml")
        .on_submit("go.mod", cache_hit(&json!({"ok": 2})));

    let scanner = scanner(mock, mode);
    let results = scanner.scan(&paths).await;

    assert_eq!(results.len(), 3, "{mode:?}");
    assert_eq!(results[0].get("ok").unwrap(), 0, "{mode:?}");
    assert!(results[1].is_empty(), "{mode:?}");
    assert_eq!(results[2].get("ok").unwrap(), 2, "{mode:?}");
    assert_eq!(scanner.scans_completed(), 2, "{mode:?}");
    assert_eq!(scanner.scans_failed(), 1, "{mode:?}");
}

#[tokio::test]
async fn test_worker_panic_is_contained() {
    assert_worker_panic_is_contained(ExecutionMode::Parallel).await;
}

#[tokio::test]
async fn test_sequential_panic_does_not_abort_later_files() {
    assert_worker_panic_is_contained(ExecutionMode::Sequential).await;
}

#[tokio::test]
async fn test_submission_uses_get_scoped_headers_and_form_body() {
    let dir = tempfile::tempdir().unwrap();
    let paths = manifests(dir.path(), &["package.json"]);

    let scanner = scanner(
        MockTransport::new().on_submit("package.json", cache_hit(&json!({}))),
        ExecutionMode::Sequential,
    );
    scanner.scan(&paths).await;

    let requests = scanner.context().transport().requests();
    assert_eq!(requests.len(), 1);
    let submit = &requests[0];
    assert_eq!(submit.method.as_str(), "POST");
    assert_eq!(submit.headers.get("authorization").unwrap(), "test-key");
    assert!(submit.headers.get("content-type").is_none());
    assert!(
        submit
            .form
            .iter()
            .any(|(k, v)| k == "compressionMethod" && v == "gzip")
    );
}

#[tokio::test]
async fn test_empty_input_makes_no_requests() {
    let scanner = scanner(MockTransport::new(), ExecutionMode::Parallel);
    let results = scanner.scan(&[]).await;
    assert!(results.is_empty());
    assert!(scanner.context().transport().requests().is_empty());
}
