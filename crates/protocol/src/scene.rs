//! Scene records returned by `GET /api/scenes`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A pre-programmed show segment the server can play, pause and stop.
///
/// Only `name` matters to the console (it is what `play_scene` sends back).
/// Fields the server adds are kept in `extra` so nothing is lost on display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneDescriptor {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl SceneDescriptor {
	pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			description: description.into(),
			extra: Map::new(),
		}
	}
}
