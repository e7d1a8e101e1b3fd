//! End-to-end import pipeline against a fake metadata session

use crate::common::{FakeMetadataSession, write_tree};
use force_cli::deploy::result::{ComponentFailure, ComponentSuccess, TestFailure};
use force_cli::deploy::{
    self, DeployError, DeployResult, DeploymentOptions, ImportConfig, TestLevel, Verdict,
};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Package xmlns="http://soap.sforce.com/2006/04/metadata"><version>58.0</version></Package>"#;

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_tree(
        &dir.path().join("metadata"),
        &[
            ("package.xml", MANIFEST),
            ("classes/Foo.cls", "public class Foo {}"),
        ],
    );
    dir
}

fn config(verbose: bool) -> ImportConfig {
    ImportConfig {
        directory: "metadata".into(),
        options: DeploymentOptions::builder().build().unwrap(),
        verbose,
        exclude: Vec::new(),
    }
}

fn success(name: &str) -> ComponentSuccess {
    ComponentSuccess {
        full_name: name.into(),
        created: true,
        id: "01p000000000001AAA".into(),
        ..Default::default()
    }
}

fn archive_names(request: &deploy::DeployRequest) -> Vec<String> {
    let bytes = request.archive().unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_successful_import_reports_components() {
    let dir = project();
    let session = FakeMetadataSession::returning(DeployResult {
        done: true,
        success: true,
        status: "Succeeded".into(),
        component_successes: vec![success("package.xml"), success("Foo")],
        ..Default::default()
    });

    let report = deploy::import(&session, &config(true), None, dir.path())
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.outcome.verdict, Verdict::Success);
    assert!(report.report.text.contains("Successes - 1"));
    assert!(report.report.text.contains("Foo\n\tstatus: created"));
    assert!(report.summary().starts_with("Imported from"));

    let request = session.last_request().unwrap();
    assert_eq!(request.file_count(), 2);
    assert_eq!(archive_names(&request), ["classes/Foo.cls", "package.xml"]);
}

#[tokio::test]
async fn test_component_failure_fails_the_import() {
    let dir = project();
    let session = FakeMetadataSession::returning(DeployResult {
        done: true,
        success: true,
        component_failures: vec![ComponentFailure {
            full_name: "Foo.cls".into(),
            line_number: 12,
            problem_type: "Error".into(),
            problem: "syntax error".into(),
        }],
        test_failures: vec![TestFailure {
            name: "FooTest".into(),
            method_name: "testFoo".into(),
            message: "boom".into(),
            ..Default::default()
        }],
        ..Default::default()
    });

    let report = deploy::import(&session, &config(false), None, dir.path())
        .await
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.outcome.verdict, Verdict::ComponentFailure);
    assert_eq!(report.summary(), "Some components failed deployment");
    assert!(
        report
            .report
            .text
            .lines()
            .any(|l| l == "\"Foo.cls\", line 12: Error syntax error")
    );
}

#[tokio::test]
async fn test_api_reported_failure_carries_status_and_message() {
    let dir = project();
    let session = FakeMetadataSession::returning(DeployResult {
        done: true,
        success: false,
        status: "Failed".into(),
        error_status_code: "UNKNOWN_EXCEPTION".into(),
        error_message: "boom".into(),
        ..Default::default()
    });

    let report = deploy::import(&session, &config(false), None, dir.path())
        .await
        .unwrap();

    assert!(!report.is_success());
    let summary = report.summary();
    assert!(summary.contains("Failed"));
    assert!(summary.contains("UNKNOWN_EXCEPTION"));
    assert!(summary.contains("boom"));
}

#[tokio::test]
async fn test_tilde_without_home_is_config_error() {
    let cwd = TempDir::new().unwrap();
    let session = FakeMetadataSession::returning(DeployResult::default());
    let config = ImportConfig {
        directory: "~/proj/metadata".into(),
        ..config(false)
    };

    let err = deploy::import(&session, &config, None, cwd.path())
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::Config(_)));
    assert_eq!(session.calls(), 0);
}

#[tokio::test]
async fn test_tilde_expands_against_home() {
    let home = project();
    let session = FakeMetadataSession::returning(DeployResult {
        success: true,
        ..Default::default()
    });
    let config = ImportConfig {
        directory: "~/metadata".into(),
        ..config(false)
    };

    let report = deploy::import(&session, &config, Some(home.path()), Path::new("/"))
        .await
        .unwrap();

    assert_eq!(report.root, home.path().join("metadata"));
    assert_eq!(session.calls(), 1);
}

#[tokio::test]
async fn test_missing_manifest_never_reaches_the_org() {
    let dir = TempDir::new().unwrap();
    write_tree(&dir.path().join("metadata"), &[("classes/Foo.cls", "x")]);
    let session = FakeMetadataSession::returning(DeployResult::default());

    let err = deploy::import(&session, &config(false), None, dir.path())
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::NotFound { .. }));
    assert!(err.to_string().ends_with("does not exist"));
    assert_eq!(session.calls(), 0);
}

#[tokio::test]
async fn test_transport_error_is_returned_unclassified() {
    let dir = project();
    let session = FakeMetadataSession::failing("INVALID_SESSION_ID: Session expired");

    let err = deploy::import(&session, &config(false), None, dir.path())
        .await
        .unwrap_err();

    match err {
        DeployError::Transport(message) => assert!(message.contains("INVALID_SESSION_ID")),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(session.calls(), 1);
}

#[tokio::test]
async fn test_archive_holds_every_collected_file() {
    let dir = TempDir::new().unwrap();
    let mut files = vec![("package.xml".to_string(), MANIFEST.to_string())];
    for i in 0..7 {
        files.push((format!("classes/C{}.cls", i), format!("public class C{} {{}}", i)));
    }
    files.push(("objects/Account.object".into(), "<CustomObject/>".into()));
    let borrowed: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
    write_tree(&dir.path().join("metadata"), &borrowed);
    write_tree(&dir.path().join("metadata"), &[(".DS_Store", "junk")]);

    let session = FakeMetadataSession::returning(DeployResult {
        success: true,
        ..Default::default()
    });
    deploy::import(&session, &config(false), None, dir.path())
        .await
        .unwrap();

    let request = session.last_request().unwrap();
    let names = archive_names(&request);
    assert_eq!(names.len(), 9);
    assert_eq!(request.file_count(), 9);
    assert!(names.iter().all(|n| !n.contains(".DS_Store")));
}

#[tokio::test]
async fn test_options_travel_with_the_request() {
    let dir = project();
    let session = FakeMetadataSession::returning(DeployResult {
        success: true,
        ..Default::default()
    });
    let config = ImportConfig {
        options: DeploymentOptions::builder()
            .check_only(true)
            .test("FooTest")
            .build()
            .unwrap(),
        ..config(false)
    };

    deploy::import(&session, &config, None, dir.path())
        .await
        .unwrap();

    let request = session.last_request().unwrap();
    assert!(request.options().check_only());
    assert_eq!(request.options().test_level(), TestLevel::RunSpecifiedTests);
    let body = request.to_soap_body();
    assert!(body.contains("<checkOnly>true</checkOnly>"));
    assert!(body.contains("<runTests>FooTest</runTests>"));
}

#[tokio::test]
async fn test_log_file_inside_the_root_is_not_packaged() {
    let dir = TempDir::new().unwrap();
    write_tree(
        dir.path(),
        &[("package.xml", MANIFEST), ("force-cli.log", "[INFO] starting")],
    );
    let session = FakeMetadataSession::returning(DeployResult {
        success: true,
        ..Default::default()
    });
    let config = ImportConfig {
        directory: ".".into(),
        exclude: vec![dir.path().join("force-cli.log")],
        ..config(false)
    };

    let report = deploy::import(&session, &config, None, dir.path())
        .await
        .unwrap();

    let request = session.last_request().unwrap();
    assert_eq!(archive_names(&request), ["package.xml"]);
    assert_eq!(
        report.summary(),
        format!("Imported from {}", dir.path().display())
    );
}
