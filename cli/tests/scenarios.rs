//! End-to-end command scenarios against a canned transport

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use serde_json::{json, Value};
use tempfile::TempDir;
use wren_cli::{App, Cli, CliError, Connect};
use wren_shared::api::{endpoints, ApiClientConfig, Method};
use wren_shared::mock::MockTransport;

const LOGGED_IN: &str = r#"
endpoint = "http://wren.test"
api_key = "sk-test-0123456789abcdef"
project_id = "5"
"#;

const NO_PROJECT: &str = r#"
endpoint = "http://wren.test"
api_key = "sk-test-0123456789abcdef"
"#;

struct MockConnector(MockTransport);

impl Connect for MockConnector {
    type Transport = MockTransport;

    fn connect(&self, _config: ApiClientConfig) -> Result<MockTransport, CliError> {
        Ok(self.0.clone())
    }
}

struct Run {
    result: Result<(), CliError>,
    stdout: String,
    stderr: String,
}

struct Harness {
    dir: TempDir,
    mock: MockTransport,
}

impl Harness {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            mock: MockTransport::new(),
        }
    }

    fn with_config(contents: &str) -> Self {
        let harness = Self::new();
        fs::write(harness.config_path(), contents).unwrap();
        harness
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn config_contents(&self) -> Option<String> {
        fs::read_to_string(self.config_path()).ok()
    }

    async fn run(&self, args: &[&str]) -> Run {
        let config = self.config_path().display().to_string();
        let mut argv = vec!["wren", "--config", config.as_str()];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        let options = cli.options();

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut stdin: &[u8] = b"";
        let result = {
            let mut app = App::new(
                &options,
                MockConnector(self.mock.clone()),
                &mut stdout,
                &mut stderr,
                &mut stdin,
            )
            .unwrap();
            app.run(cli.command).await
        };
        Run {
            result,
            stdout: String::from_utf8(stdout).unwrap(),
            stderr: String::from_utf8(stderr).unwrap(),
        }
    }
}

fn sql_pairs(ids: &[i64]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| {
                json!({
                    "id": id,
                    "projectId": 5,
                    "question": format!("question {}", id),
                    "sql": format!("SELECT {} FROM orders", id),
                })
            })
            .collect(),
    )
}

fn relation(id: i64) -> Value {
    json!({
        "relationId": id,
        "type": "MANY_TO_ONE",
        "fromModelId": 1,
        "fromModelName": "orders",
        "fromColumnId": 11,
        "fromColumnName": "customer_id",
        "toModelId": 2,
        "toModelName": "customers",
        "toColumnId": 21,
        "toColumnName": "id",
    })
}

#[tokio::test]
async fn test_whoami_without_config_asks_for_login() {
    let harness = Harness::new();

    let run = harness.run(&["whoami"]).await;

    let err = run.result.unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
    assert!(err.to_string().contains("wren login"));
    assert!(harness.mock.requests().is_empty());
}

#[tokio::test]
async fn test_login_saves_only_validated_credentials() {
    let harness = Harness::new();
    harness
        .mock
        .on_status(Method::Get, endpoints::MODELS, 401, "unauthorized");

    let run = harness
        .run(&[
            "login",
            "--endpoint",
            "http://wren.test",
            "--api-key",
            "sk-bad-key-000000000000",
        ])
        .await;
    assert!(run.result.is_err());
    assert_eq!(harness.config_contents(), None);

    harness
        .mock
        .on_status(Method::Get, endpoints::MODELS, 200, "{}");
    harness.mock.on_graphql(
        "currentUser",
        json!({ "currentUser": { "email": "ana@example.com", "displayName": "Ana" } }),
    );
    let run = harness
        .run(&[
            "login",
            "--endpoint",
            "http://wren.test",
            "--api-key",
            "sk-good-key-0000000000",
        ])
        .await;
    assert!(run.result.is_ok(), "{:?}", run.result);
    assert!(run.stdout.contains("Logged in as ana@example.com"));

    let saved = harness.config_contents().unwrap();
    assert!(saved.contains("http://wren.test"));
    assert!(saved.contains("sk-good-key-0000000000"));
}

#[tokio::test]
async fn test_project_use_missing_project_leaves_config_untouched() {
    let harness = Harness::with_config(LOGGED_IN);
    harness.mock.on_graphql("project", json!({ "project": null }));
    let before = harness.config_contents();

    let run = harness.run(&["project", "use", "7"]).await;

    let err = run.result.unwrap_err();
    assert_eq!(err.to_string(), "project 7 not found");
    assert_eq!(harness.config_contents(), before);
}

#[tokio::test]
async fn test_project_use_switches_active_project() {
    let harness = Harness::with_config(NO_PROJECT);
    harness.mock.on_graphql(
        "project",
        json!({ "project": { "id": 7, "displayName": "Sales", "type": "POSTGRES" } }),
    );

    let run = harness.run(&["project", "use", "7"]).await;

    assert!(run.result.is_ok(), "{:?}", run.result);
    assert!(run.stdout.contains("Switched to project 7 (Sales)"));
    assert!(harness
        .config_contents()
        .unwrap()
        .contains(r#"project_id = "7""#));
}

#[tokio::test]
async fn test_sql_pair_show_scans_the_list() {
    let harness = Harness::with_config(LOGGED_IN);
    harness
        .mock
        .on_json(Method::Get, endpoints::SQL_PAIRS, sql_pairs(&[1, 2, 4]));

    let run = harness.run(&["sql-pair", "show", "3"]).await;
    let err = run.result.unwrap_err();
    assert!(matches!(err, CliError::NotFound(_)));
    assert_eq!(err.to_string(), "SQL pair 3 not found");

    harness
        .mock
        .on_json(Method::Get, endpoints::SQL_PAIRS, sql_pairs(&[1, 2, 3, 4]));
    let run = harness.run(&["sql-pair", "show", "3"]).await;
    assert!(run.result.is_ok(), "{:?}", run.result);
    assert!(run.stdout.contains("question 3"));
    assert!(run.stdout.contains("SELECT 3"));
}

#[tokio::test]
async fn test_run_sql_embedded_error_fails() {
    let harness = Harness::with_config(LOGGED_IN);
    harness.mock.on_json(
        Method::Post,
        endpoints::RUN_SQL,
        json!({ "code": "SQL_ERROR", "error": "column \"x\" does not exist" }),
    );

    let run = harness.run(&["--json", "run-sql", "SELECT x FROM orders"]).await;

    match run.result {
        Err(CliError::Domain(failure)) => assert_eq!(failure.code, "SQL_ERROR"),
        other => panic!("expected domain failure, got {:?}", other),
    }
    let echoed: Value = serde_json::from_str(&run.stdout).unwrap();
    assert_eq!(echoed["code"], "SQL_ERROR");
    assert_eq!(echoed["error"], "column \"x\" does not exist");
}

#[tokio::test]
async fn test_run_sql_empty_error_is_success() {
    let harness = Harness::with_config(LOGGED_IN);
    harness.mock.on_json(
        Method::Post,
        endpoints::RUN_SQL,
        json!({
            "error": "",
            "columns": [{ "name": "status", "type": "VARCHAR" }, { "name": "n", "type": "BIGINT" }],
            "records": [{ "status": "shipped", "n": 42 }],
            "totalRows": 1,
        }),
    );

    let run = harness.run(&["run-sql", "SELECT status, count(*) AS n FROM orders"]).await;

    assert!(run.result.is_ok(), "{:?}", run.result);
    assert!(run.stdout.contains("shipped"));
    assert!(run.stdout.contains("42"));
    assert!(run.stderr.contains("1 row(s) returned (of 1 total)"));
}

#[tokio::test]
async fn test_relation_list_deduplicates() {
    let harness = Harness::with_config(LOGGED_IN);
    harness.mock.on_graphql(
        "diagram",
        json!({
            "diagram": {
                "models": [
                    { "relationFields": [relation(9)] },
                    { "relationFields": [relation(9), relation(10)] },
                ]
            }
        }),
    );

    let run = harness.run(&["--json", "relation", "list"]).await;

    assert!(run.result.is_ok(), "{:?}", run.result);
    let listed: Value = serde_json::from_str(&run.stdout).unwrap();
    let ids: Vec<i64> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["relationId"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![9, 10]);
}

#[tokio::test]
async fn test_project_commands_require_active_project() {
    let harness = Harness::with_config(NO_PROJECT);

    for args in [
        &["model", "list"][..],
        &["thread", "list"][..],
        &["run-sql", "SELECT 1"][..],
        &["deploy"][..],
    ] {
        let run = harness.run(args).await;
        let err = run.result.unwrap_err();
        assert!(matches!(err, CliError::NoProject), "{:?}: {:?}", args, err);
        assert_eq!(
            err.to_string(),
            "no project selected; run: wren project use <id>"
        );
    }
    assert!(harness.mock.requests().is_empty());
}

#[tokio::test]
async fn test_instruction_needs_scope_before_any_request() {
    let harness = Harness::with_config(LOGGED_IN);

    let run = harness
        .run(&["instruction", "create", "--text", "Use fiscal quarters"])
        .await;

    let err = run.result.unwrap_err();
    assert_eq!(
        err.to_string(),
        "must specify either --global or at least one --question"
    );
    assert!(harness.mock.requests().is_empty());
}

#[tokio::test]
async fn test_deploy_failure_is_reported() {
    let harness = Harness::with_config(LOGGED_IN);
    harness.mock.on_graphql(
        "deploy",
        json!({ "deploy": { "status": "FAILED", "error": "engine unreachable" } }),
    );

    let run = harness.run(&["deploy", "--force"]).await;

    let err = run.result.unwrap_err();
    assert_eq!(err.to_string(), "[DEPLOY_FAILED] engine unreachable");
}

#[tokio::test]
async fn test_config_get_masks_api_key() {
    let harness = Harness::with_config(LOGGED_IN);

    let run = harness.run(&["config", "get", "api-key"]).await;

    assert!(run.result.is_ok(), "{:?}", run.result);
    assert_eq!(run.stdout.trim(), "sk-test-0123...cdef");
}

#[tokio::test]
async fn test_whoami_text_and_json_expose_the_same_fields() {
    let harness = Harness::with_config(LOGGED_IN);
    harness
        .mock
        .on_status(Method::Get, endpoints::MODELS, 200, "{}");

    let text = harness.run(&["whoami"]).await;
    let json = harness.run(&["--json", "whoami"]).await;
    assert!(text.result.is_ok(), "{:?}", text.result);
    assert!(json.result.is_ok(), "{:?}", json.result);

    let shown: Value = serde_json::from_str(&json.stdout).unwrap();
    let keys: Vec<&str> = shown.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 3, "{:?}", keys);
    for (key, label) in [
        ("endpoint", "Endpoint:"),
        ("userEmail", "User:"),
        ("projectCount", "Projects:"),
    ] {
        assert!(keys.contains(&key), "JSON lacks {}", key);
        assert!(text.stdout.contains(label), "text lacks {}", label);
    }
    assert_eq!(shown["endpoint"], "http://wren.test");
    assert!(text.stdout.contains("http://wren.test"));
}

#[tokio::test]
async fn test_deploy_status_reports_project_in_both_modes() {
    let harness = Harness::with_config(LOGGED_IN);
    harness.mock.on_json(
        Method::Get,
        endpoints::MODELS,
        json!({ "hash": "abc123", "models": [{ "name": "orders" }], "relationships": [], "views": [] }),
    );

    let json = harness.run(&["--json", "deploy", "status"]).await;
    assert!(json.result.is_ok(), "{:?}", json.result);
    let shown: Value = serde_json::from_str(&json.stdout).unwrap();
    assert_eq!(shown["projectId"], 5);
    assert_eq!(shown["hash"], "abc123");
    assert_eq!(shown["modelNames"], json!(["orders"]));

    let text = harness.run(&["deploy", "status"]).await;
    assert!(text.result.is_ok(), "{:?}", text.result);
    assert!(text.stdout.contains("Project:"));
    assert!(text.stdout.contains("abc123"));
    assert!(text.stdout.contains("orders"));
}

#[tokio::test]
async fn test_config_set_trims_command_line_input() {
    let harness = Harness::with_config(NO_PROJECT);

    let run = harness
        .run(&["config", "set", "endpoint", "  http://other.test  "])
        .await;
    assert!(run.result.is_ok(), "{:?}", run.result);

    let run = harness.run(&["config", "get", "endpoint"]).await;
    assert_eq!(run.stdout, "http://other.test\n");

    let run = harness.run(&["config", "set", "endpoint", "   "]).await;
    assert!(run.result.is_ok(), "{:?}", run.result);
    assert!(!harness.config_contents().unwrap().contains("endpoint"));
}
