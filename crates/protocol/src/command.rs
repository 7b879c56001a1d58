//! Control commands posted to `/api/command`.
//!
//! A [`Command`] is a name plus an optional payload. The server defines what
//! names exist and what their payloads mean; nothing here validates either.
//! The constructors cover the commands the operator console issues.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};

/// A named control command with an optional payload.
///
/// Serializes as `{"command": <name>, "data": <payload>}`. A missing payload
/// is sent as an empty object, never omitted or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
	#[serde(rename = "command")]
	pub name: String,
	#[serde(rename = "data", default, serialize_with = "payload_or_empty")]
	pub payload: Option<Map<String, Value>>,
}

fn payload_or_empty<S: Serializer>(payload: &Option<Map<String, Value>>, serializer: S) -> Result<S::Ok, S::Error> {
	match payload {
		Some(map) => map.serialize(serializer),
		None => Map::new().serialize(serializer),
	}
}

impl Command {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			payload: None,
		}
	}

	pub fn with_payload(name: impl Into<String>, payload: Map<String, Value>) -> Self {
		Self {
			name: name.into(),
			payload: Some(payload),
		}
	}

	/// Builds a command from a JSON value; non-object values are wrapped as `{"value": v}`.
	pub fn from_value(name: impl Into<String>, payload: Value) -> Self {
		match payload {
			Value::Null => Self::new(name),
			Value::Object(map) => Self::with_payload(name, map),
			other => {
				let mut map = Map::new();
				map.insert("value".into(), other);
				Self::with_payload(name, map)
			}
		}
	}

	/// Returns the JSON request body.
	pub fn to_body(&self) -> Value {
		json!({
			"command": self.name,
			"data": self.payload.clone().unwrap_or_default(),
		})
	}

	pub fn play_scene(scene_name: impl Into<String>) -> Self {
		Self::from_value("play_scene", json!({ "scene_name": scene_name.into() }))
	}

	pub fn pause_scene() -> Self {
		Self::new("pause_scene")
	}

	pub fn stop_scene() -> Self {
		Self::new("stop_scene")
	}

	/// Master volume. The console's slider spans 0-100; the server enforces range.
	pub fn set_volume(volume: u8) -> Self {
		Self::from_value("set_volume", json!({ "volume": volume }))
	}

	pub fn lights(action: LightAction) -> Self {
		Self::from_value("lights_control", json!({ "action": action.as_str() }))
	}

	pub fn emergency_stop() -> Self {
		Self::new("emergency_stop")
	}

	pub fn system_reset() -> Self {
		Self::new("system_reset")
	}
}

/// Lighting presets understood by `lights_control`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightAction {
	/// All fixtures at full
	Full,
	/// Dimmed wash
	Dim,
	Red,
	Green,
	Blue,
	/// Blackout
	Off,
}

impl LightAction {
	pub const ALL: [LightAction; 6] = [
		LightAction::Full,
		LightAction::Dim,
		LightAction::Red,
		LightAction::Green,
		LightAction::Blue,
		LightAction::Off,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			LightAction::Full => "full",
			LightAction::Dim => "dim",
			LightAction::Red => "red",
			LightAction::Green => "green",
			LightAction::Blue => "blue",
			LightAction::Off => "off",
		}
	}
}

impl fmt::Display for LightAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for LightAction {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		LightAction::ALL
			.into_iter()
			.find(|action| action.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| format!("unknown light action: {s}"))
	}
}
