//! Integration tests for parameter reports

mod common;

use archer_audit::report::{self, ParameterReport};
use archer_audit::{ArcherClient, ArcherError, TransportKind};
use common::{login_success, parameter_listing, test_config, ScriptedRunner};
use std::sync::Arc;

#[tokio::test]
async fn test_collect_fetches_once_and_records_all_parameters() {
    let runner = Arc::new(
        ScriptedRunner::new(&["curl"])
            .respond(login_success("R"))
            .respond(parameter_listing(3)),
    );
    let mut client = ArcherClient::connect_with_runner(test_config(), runner.clone())
        .await
        .expect("login succeeds");

    let parameter_report = ParameterReport::collect(&mut client).await.expect("collects");

    assert_eq!(runner.calls().len(), 2);
    assert_eq!(parameter_report.instance.as_deref(), Some("Prod"));
    assert_eq!(parameter_report.url, "https://archer.test/");
    assert_eq!(parameter_report.transport, TransportKind::Curl);
    let indices: Vec<usize> = parameter_report.parameters.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(
        parameter_report.parameters[2].fields["Name"],
        "Archer Services Parameter"
    );
}

#[tokio::test]
async fn test_collect_short_listing_fails() {
    let runner = Arc::new(
        ScriptedRunner::new(&["curl"])
            .respond(login_success("R"))
            .respond(parameter_listing(1)),
    );
    let mut client = ArcherClient::connect_with_runner(test_config(), runner)
        .await
        .expect("login succeeds");

    assert!(matches!(
        ParameterReport::collect(&mut client).await,
        Err(ArcherError::IndexOutOfRange { index: 1, len: 1 })
    ));
}

#[tokio::test]
async fn test_json_export_and_load() {
    let runner = Arc::new(
        ScriptedRunner::new(&["curl"])
            .respond(login_success("R"))
            .respond(parameter_listing(3)),
    );
    let mut client = ArcherClient::connect_with_runner(test_config(), runner)
        .await
        .expect("login succeeds");
    let parameter_report = ParameterReport::collect(&mut client).await.expect("collects");

    let path = std::env::temp_dir().join(format!(
        "archer_audit_report_{}.json",
        parameter_report.report_id
    ));
    report::json::export(&parameter_report, &path).expect("export");
    let loaded = report::json::load(&path).expect("load");
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.report_id, parameter_report.report_id);
    assert_eq!(loaded.parameters, parameter_report.parameters);
}
