use serde_json::json;

use super::*;

fn endpoint() -> ServerEndpoint {
	ServerEndpoint::new("10.0.0.7", 8080)
}

#[test]
fn result_builder_success() {
	let result = ResultBuilder::new("volume")
		.endpoint(&endpoint())
		.state(ConnectivityState::Connected)
		.data(json!({"response": {"ok": true}}))
		.build();

	assert!(result.ok);
	assert_eq!(result.command, "volume");
	assert_eq!(result.endpoint.as_deref(), Some("10.0.0.7:8080"));
	assert!(result.error.is_none());
}

#[test]
fn result_builder_error() {
	let result: CommandResult<()> = ResultBuilder::new("ping")
		.command_error(CommandError {
			code: ErrorCode::ServerUnreachable,
			message: "Connection refused".into(),
			details: None,
		})
		.build();

	assert!(!result.ok);
	assert!(result.data.is_none());
	assert_eq!(result.error.as_ref().unwrap().code, ErrorCode::ServerUnreachable);
}

#[test]
fn builder_without_data_is_not_ok() {
	let result: CommandResult<()> = ResultBuilder::new("ping").build();
	assert!(!result.ok);
}

#[test]
fn envelope_serializes_camel_case() {
	let result = ResultBuilder::new("status")
		.endpoint(&endpoint())
		.state(ConnectivityState::Disconnected)
		.data(json!({}))
		.build();
	let value = serde_json::to_value(&result).unwrap();

	assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
	assert_eq!(value["state"], "disconnected");
	assert!(value["timings"]["durationMs"].is_u64());
	assert!(value.get("error").is_none());
}

#[test]
fn error_code_display() {
	assert_eq!(ErrorCode::ServerUnreachable.to_string(), "SERVER_UNREACHABLE");
	assert_eq!(ErrorCode::CommandRejected.to_string(), "COMMAND_REJECTED");
	assert_eq!(
		serde_json::to_value(ErrorCode::MalformedResponse).unwrap(),
		json!("MALFORMED_RESPONSE")
	);
}

#[test]
fn text_rendering_of_failure() {
	colored::control::set_override(false);
	let result: CommandResult<()> = ResultBuilder::new("lights")
		.endpoint(&endpoint())
		.state(ConnectivityState::Disconnected)
		.command_error(CommandError {
			code: ErrorCode::CommandRejected,
			message: "Server returned 500: Internal Server Error".into(),
			details: Some(json!({"status": 500})),
		})
		.build();

	let mut buf = Vec::new();
	write_result_text(&mut buf, &result).unwrap();
	let text = String::from_utf8(buf).unwrap();

	assert!(text.starts_with("[disconnected] 10.0.0.7:8080\n"));
	assert!(text.contains("Error [COMMAND_REJECTED]: Server returned 500"));
	assert!(text.contains("\"status\": 500"));
}

#[test]
fn text_rendering_of_string_data_is_bare() {
	colored::control::set_override(false);
	let result = ResultBuilder::new("config.path").data("/etc/showctl/config.json".to_string()).build();

	let mut buf = Vec::new();
	write_result_text(&mut buf, &result).unwrap();
	assert_eq!(String::from_utf8(buf).unwrap(), "/etc/showctl/config.json\n");
}

#[test]
fn connectivity_event_shape() {
	let event = ConnectivityEvent::new(ConnectivityState::Connected, &endpoint(), 3);
	assert_eq!(
		serde_json::to_value(&event).unwrap(),
		json!({"event": "connectivity", "state": "connected", "endpoint": "10.0.0.7:8080", "seq": 3})
	);
}
