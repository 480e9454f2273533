use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// Body of `POST /api/command`.
///
/// Both fields are optional and loosely typed: the dashboard is trusted to
/// send something sensible and anything else is either rejected by type or
/// passed through verbatim as the value.
#[derive(Debug, Default, Deserialize)]
pub struct CommandRequest {
    #[serde(rename = "type")]
    pub kind: Option<Value>,
    /// `None` only when the key is absent; `"value": null` is `Some(Value::Null)`.
    #[serde(default, deserialize_with = "present")]
    pub value: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A command after recognizing its `type`. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetTemp { value: Option<Value> },
    ToggleMode,
    Unknown { kind: Option<String> },
}

impl From<CommandRequest> for Command {
    fn from(req: CommandRequest) -> Self {
        match req.kind {
            Some(Value::String(kind)) => match kind.as_str() {
                "SET_TEMP" => Command::SetTemp { value: req.value },
                "TOGGLE_MODE" => Command::ToggleMode,
                _ => Command::Unknown { kind: Some(kind) },
            },
            Some(other) => Command::Unknown {
                kind: Some(other.to_string()),
            },
            None => Command::Unknown { kind: None },
        }
    }
}

impl Command {
    /// The wire message for this command, or `None` when it is unrecognized.
    pub fn to_message(&self) -> Option<CommandMessage> {
        match self {
            Command::SetTemp { value } => Some(CommandMessage::SetTemp(render_value(
                value.as_ref(),
            ))),
            Command::ToggleMode => Some(CommandMessage::ToggleMode),
            Command::Unknown { .. } => None,
        }
    }
}

/// Text published to the command topic: `SET:<value>` or `MODE:TOGGLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandMessage {
    SetTemp(String),
    ToggleMode,
}

impl fmt::Display for CommandMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandMessage::SetTemp(value) => write!(f, "SET:{value}"),
            CommandMessage::ToggleMode => f.write_str("MODE:TOGGLE"),
        }
    }
}

/// Render a setpoint the way the device firmware has always received it.
///
/// No validation happens here: a missing value becomes `undefined`, a string
/// is passed through untouched, so a bad request yields a bad message.
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => render_number(n),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => render_value(Some(other)),
            })
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_string(),
    }
}

fn render_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        // below 1e-6 and from 1e21 up the firmware gets exponent form, e.g. 1e-7, 1e+21
        Some(f) if f.abs() < 1e-6 || f.abs() >= 1e21 => {
            let sci = format!("{f:e}");
            match sci.split_once('e') {
                Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
                _ => sci,
            }
        }
        // 25.0 is sent as "25"
        Some(f) if f.fract() == 0.0 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
