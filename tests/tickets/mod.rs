//! Ticket subcommands against a fake query executor

use crate::common::FakeQueryExecutor;
use force_cli::cli::commands::tickets::{TicketsSubcommands, run_tickets_command};
use serde_json::json;

const QUEUE: &str = "ISD.Research Computing Support";

#[tokio::test]
async fn test_waiting_lists_tickets_from_the_queue() {
    let executor = FakeQueryExecutor::default().with_query(
        "FROM BMCServiceDesk__Incident__c",
        vec![
            json!({"Id": "a01", "COL_UCL_Summary__c": "Printer", "LastModifiedDate": "2024-03-01T09:15:00.000+0000"}),
            json!({"Id": "a02", "COL_UCL_Summary__c": "VPN", "LastModifiedDate": null}),
        ],
    );

    let output = run_tickets_command(&executor, &TicketsSubcommands::Waiting, QUEUE)
        .await
        .unwrap();

    let soql = &executor.issued()[0];
    assert!(soql.contains("BMCServiceDesk__Queue__c = 'ISD.Research Computing Support'"));
    assert!(soql.contains("'CUSTOMER RESPONDED'"));
    assert!(soql.ends_with("LIMIT 15"));
    assert_eq!(output.lines().count(), 4);
    assert!(output.contains("2024-03-01 09:15"));
}

#[tokio::test]
async fn test_empty_listing() {
    let executor = FakeQueryExecutor::default();
    let output = run_tickets_command(&executor, &TicketsSubcommands::Recent, QUEUE)
        .await
        .unwrap();
    assert_eq!(output, "No tickets found");
}

#[tokio::test]
async fn test_describe_resolves_ids_and_numbers() {
    let executor = FakeQueryExecutor::default()
        .with_record(
            "a01",
            json!({"Id": "a01", "UCL_userid_UPI__c": "JDOE1", "COL_UCL_Summary__c": "Printer"}),
        )
        .with_record(
            "Name:00042",
            json!({"Id": "a42", "UCL_userid_UPI__c": null, "COL_UCL_Summary__c": "VPN"}),
        );

    let command = TicketsSubcommands::Describe {
        tickets: vec!["a01".into(), "IN:00042".into()],
    };
    let output = run_tickets_command(&executor, &command, QUEUE).await.unwrap();

    assert_eq!(
        executor.issued(),
        [
            "GET BMCServiceDesk__Incident__c/a01",
            "GET BMCServiceDesk__Incident__c/Name:00042"
        ]
    );
    assert!(output.contains("Ticket Subject:  Printer"));
    assert!(output.contains("Id:  a42\nUser:  \n"));
}

#[tokio::test]
async fn test_describe_unknown_ticket_is_an_error() {
    let executor = FakeQueryExecutor::default();
    let command = TicketsSubcommands::Describe {
        tickets: vec!["a99".into()],
    };
    let err = run_tickets_command(&executor, &command, QUEUE).await.unwrap_err();
    assert!(format!("{:#}", err).contains("NOT_FOUND"));
}

#[tokio::test]
async fn test_history_by_number_looks_up_the_id_first() {
    let executor = FakeQueryExecutor::default()
        .with_record("Name:00042", json!({"Id": "a42"}))
        .with_query(
            "BMCServiceDesk__FKIncident__c = 'a42'",
            vec![json!({
                "Id": "h1",
                "BMCServiceDesk__userId__c": "JDOE1",
                "BMCServiceDesk__actionId__c": "Email Received",
                "BMCServiceDesk__RichTextNote__c": "<p>Still broken</p>"
            })],
        );

    let command = TicketsSubcommands::History {
        ticket: "IN00042".into(),
    };
    let output = run_tickets_command(&executor, &command, QUEUE).await.unwrap();

    assert_eq!(executor.issued()[0], "GET BMCServiceDesk__Incident__c/Name:00042");
    assert!(output.contains("Action:  Email Received"));
    assert!(output.contains("\nStill broken\n"));
}

#[tokio::test]
async fn test_open_prints_console_url() {
    let executor = FakeQueryExecutor::default().with_query(
        "WHERE Name = '00042'",
        vec![json!({
            "Name": "00042",
            "BMCServiceDesk__Launch_console__c": "<a href=\"https://desk.example.com/console?id=a42\" target=\"_blank\">"
        })],
    );

    let command = TicketsSubcommands::Open {
        ticket: "IN:00042".into(),
    };
    let output = run_tickets_command(&executor, &command, QUEUE).await.unwrap();
    assert_eq!(output, "https://desk.example.com/console?id=a42");
}

#[tokio::test]
async fn test_open_rejects_malformed_link() {
    let executor = FakeQueryExecutor::default().with_query(
        "BMCServiceDesk__Launch_console__c",
        vec![json!({"Id": "a42", "BMCServiceDesk__Launch_console__c": "https://desk.example.com"})],
    );

    let command = TicketsSubcommands::Open {
        ticket: "a42".into(),
    };
    assert!(run_tickets_command(&executor, &command, QUEUE).await.is_err());
}
