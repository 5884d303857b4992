use indexmap::IndexMap;
use rigview_fixtures::FixtureDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::light::StateMap;

/// Lifecycle event for a named, timed operation running against a fixture.
///
/// The stream carries no sequence numbers: a DONE may arrive without its
/// NEW (removal is then a no-op) and a duplicate NEW overwrites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorEvent {
    /// Operation category, e.g. `effect` or `state_effect`.
    pub op: String,
    /// Key within the category's collection.
    pub op_name: String,
    pub op_state: OpState,
    #[serde(default)]
    pub state: TransitionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpState {
    #[serde(rename = "NEW")]
    New,
    #[serde(rename = "DONE")]
    Done,
}

/// Progress data attached to a lifecycle event.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TransitionState {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    #[serde(default)]
    pub done: f64,
    #[serde(default)]
    pub duration: f64,
}

/// Decoded message from the lights channel.
#[derive(Debug, Clone)]
pub enum LightsMessage {
    /// `["lights", {name: descriptor, ...}]` — full snapshot, delivered once
    /// per session/reconnect. Key order defines table column order.
    Snapshot(IndexMap<String, FixtureDescriptor>),
    /// `["state", name, {attr: value, ...}]` — partial state update.
    State { name: String, update: StateMap },
    /// `["monitor", name, event]` — lifecycle event for one fixture.
    Monitor { name: String, event: MonitorEvent },
}

impl LightsMessage {
    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ProtocolError::Json(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let items = match value {
            Value::Array(items) => items,
            _ => return Err(ProtocolError::UnexpectedShape("expected a JSON array".into())),
        };
        let mut items = items.into_iter();
        let tag = match items.next() {
            Some(Value::String(tag)) => tag,
            _ => return Err(ProtocolError::UnexpectedShape("missing string tag".into())),
        };

        match tag.as_str() {
            "lights" => {
                let payload = items.next().ok_or_else(|| {
                    ProtocolError::UnexpectedShape("snapshot without payload".into())
                })?;
                let descriptors = serde_json::from_value(payload)
                    .map_err(|e| ProtocolError::Json(e.to_string()))?;
                Ok(LightsMessage::Snapshot(descriptors))
            }
            "state" | "monitor" => {
                let name = match items.next() {
                    Some(Value::String(name)) => name,
                    _ => {
                        return Err(ProtocolError::UnexpectedShape(format!(
                            "{} message without fixture name",
                            tag
                        )))
                    }
                };
                let payload = items.next().ok_or_else(|| {
                    ProtocolError::UnexpectedShape(format!("{} message without payload", tag))
                })?;
                if tag == "state" {
                    let update = serde_json::from_value(payload)
                        .map_err(|e| ProtocolError::Json(e.to_string()))?;
                    Ok(LightsMessage::State { name, update })
                } else {
                    let event = serde_json::from_value(payload)
                        .map_err(|e| ProtocolError::Json(e.to_string()))?;
                    Ok(LightsMessage::Monitor { name, event })
                }
            }
            other => Err(ProtocolError::UnknownTag(other.to_string())),
        }
    }
}

/// One frame from the audio-reactive channel: per-band levels from the
/// capture pipeline. Extra fields on the frame are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioFrame {
    #[serde(default)]
    pub audio: Vec<f64>,
}

impl AudioFrame {
    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(|e| ProtocolError::Json(e.to_string()))
    }
}

/// Decode failure at the transport boundary. Callers log and drop the
/// message; nothing here tears the page down.
#[derive(Debug)]
pub enum ProtocolError {
    Json(String),
    UnexpectedShape(String),
    UnknownTag(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::Json(msg) => write!(f, "failed to decode JSON payload: {}", msg),
            ProtocolError::UnexpectedShape(msg) => write!(f, "unexpected message shape: {}", msg),
            ProtocolError::UnknownTag(tag) => write!(f, "unknown message tag: {}", tag),
        }
    }
}

impl std::error::Error for ProtocolError {}
