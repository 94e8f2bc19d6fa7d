#![allow(missing_docs)]

// std
use std::path::Path;
// crates.io
use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::{Value as JsonValue, json};
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
	"PBI_TENANT_ID",
	"PBI_TOKEN_CACHE",
	"PBI_TOKEN_CACHE_HOURS",
	"PBI_CLIENT_ID",
	"PBI_AUTHORITY",
	"PBI_API_BASE",
	"PBI_SCOPE",
	"PBI_LOG",
];

fn broker(cache: &Path) -> Command {
	let mut cmd = Command::cargo_bin("pbi-broker").expect("Binary should be built.");

	for var in ENV_VARS {
		cmd.env_remove(var);
	}

	cmd.arg("--token-cache").arg(cache);

	cmd
}

fn stdout_json(output: &[u8]) -> JsonValue {
	serde_json::from_slice(output).expect("Standard output should be one JSON document.")
}

#[test]
fn missing_dataset_prints_parameter_envelope() {
	let dir = TempDir::new().expect("Temp dir should be created.");
	let cache = dir.path().join("cache.json");
	let output = broker(&cache)
		.args(["--mode", "refreshes", "--workspace-id", "W1"])
		.assert()
		.failure()
		.code(1)
		.get_output()
		.stdout
		.clone();
	let envelope = stdout_json(&output);

	assert_eq!(envelope["category"], json!("ParameterError"));
	assert_eq!(envelope["message"], json!("Mode `refreshes` requires the datasetId parameter."));
	assert_eq!(envelope["details"], JsonValue::Null);
	assert!(!cache.exists());
}

#[test]
fn oversized_cache_hours_print_parameter_envelope() {
	let dir = TempDir::new().expect("Temp dir should be created.");
	let output = broker(&dir.path().join("cache.json"))
		.args(["--mode", "workspaces", "--token-cache-hours", "100000000"])
		.assert()
		.code(1)
		.get_output()
		.stdout
		.clone();
	let envelope = stdout_json(&output);

	assert_eq!(envelope["category"], json!("ParameterError"));
	assert!(
		envelope["message"].as_str().is_some_and(|message| message.contains("tokenCacheHours")),
		"{envelope}"
	);
}

#[test]
fn unknown_mode_prints_parameter_envelope() {
	let dir = TempDir::new().expect("Temp dir should be created.");

	broker(&dir.path().join("cache.json"))
		.args(["--mode", "datasets"])
		.assert()
		.code(1)
		.stdout(predicate::str::contains("\"category\":\"ParameterError\""))
		.stdout(predicate::str::contains("datasets"));
}

#[test]
fn seeded_cache_serves_workspaces() {
	let server = MockServer::start();
	let groups = server.mock(|when, then| {
		when.method(GET).path("/v1.0/myorg/groups").header("authorization", "Bearer seeded");
		then.status(200)
			.header("content-type", "application/json")
			.body(r#"{"value":[{"id":"g1","name":"Sales"}]}"#);
	});
	let dir = TempDir::new().expect("Temp dir should be created.");
	let cache = dir.path().join("cache.json");

	std::fs::write(
		&cache,
		r#"{"Authorization":"Bearer seeded","ExpiresAt":"2999-01-01T00:00:00Z","CachedAt":"2024-01-01T00:00:00Z"}"#,
	)
	.expect("Seed cache should be written.");

	let output = broker(&cache)
		.args(["--mode", "workspaces", "--api-base", &format!("http://{}", server.address())])
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();

	groups.assert_calls(1);

	let envelope = stdout_json(&output);

	assert_eq!(envelope["tenantId"], json!("common"));
	assert_eq!(envelope["workspaces"][0]["id"], json!("g1"));
	assert_eq!(envelope["workspaces"][0]["capacityId"], JsonValue::Null);
}

#[test]
fn help_exits_cleanly() {
	let dir = TempDir::new().expect("Temp dir should be created.");

	broker(&dir.path().join("cache.json"))
		.arg("--help")
		.assert()
		.success()
		.stdout(predicate::str::contains("--mode"));
}
