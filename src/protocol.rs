//! Inbound frame decoding.
//!
//! A frame is one JSON object carrying exactly one of `Request` or
//! `Command`, optionally tagged by `MessageType`. Decoding happens once here;
//! the session only ever sees an [`Action`].
//!
//! ```json
//! { "MessageType": "REQUEST", "Request": { "Type": "Algorithm", "Body": { ... } } }
//! { "MessageType": "COMMAND", "Command": { "RequestedState": "pause" } }
//! ```

use crate::error::{Result, SessionError};
use crate::request::{AlgorithmRequest, FunctionRequest, Request};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A JSON field that can be missing, explicitly `null`, or set.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field<T> {
    #[default]
    Absent,
    Null,
    Present(T),
}

impl<T> Field<T> {
    /// `true` for both `null` and a value: the key was on the wire.
    pub fn is_given(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Only reached when the key exists; `#[serde(default)]` covers absence.
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Self::Present(v),
            None => Self::Null,
        })
    }
}

/// Lifecycle command keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Pause,
    Resume,
}

impl FromStr for Command {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            _ => Err(SessionError::protocol("Wrong command")),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Pause => "pause",
            Self::Resume => "resume",
        })
    }
}

/// What a decoded frame asks the session to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Load(Request),
    Issue(Command),
}

#[derive(Debug, Deserialize)]
struct Frame {
    #[serde(rename = "MessageType", default)]
    message_type: Field<String>,

    #[serde(rename = "Request", default)]
    request: Field<RequestEnvelope>,

    #[serde(rename = "Command", default)]
    command: Field<CommandBody>,
}

#[derive(Debug, Deserialize)]
struct RequestEnvelope {
    #[serde(rename = "Type")]
    kind: String,

    #[serde(rename = "Body", default)]
    body: Value,
}

#[derive(Debug, Deserialize)]
struct CommandBody {
    #[serde(rename = "RequestedState", default)]
    requested_state: Option<String>,
}

/// Decodes one inbound frame.
///
/// Structural problems are [`SessionError::Protocol`]; an unknown request
/// `Type` is [`SessionError::Algorithm`].
pub fn decode(frame: &str) -> Result<Action> {
    let frame: Frame = serde_json::from_str(frame)?;

    let tagged = match &frame.message_type {
        Field::Present(t) => match t.to_ascii_uppercase().as_str() {
            "REQUEST" => Some(true),
            "COMMAND" => Some(false),
            _ => return Err(SessionError::protocol(format!("Unknown message type '{t}'"))),
        },
        _ => None,
    };

    let action = match (frame.request, frame.command) {
        (Field::Absent, Field::Absent) => {
            return Err(SessionError::protocol("Request or command not found"))
        }
        (r, c) if r.is_given() && c.is_given() => {
            return Err(SessionError::protocol("Cannot send command and request together"))
        }
        (Field::Null, _) => return Err(SessionError::protocol("Request is empty")),
        (_, Field::Null) => return Err(SessionError::protocol("Command is empty")),
        (Field::Present(envelope), _) => Action::Load(decode_request(envelope)?),
        (_, Field::Present(body)) => {
            let state = body
                .requested_state
                .ok_or_else(|| SessionError::protocol("Wrong command"))?;
            Action::Issue(state.parse()?)
        }
    };

    match (tagged, &action) {
        (Some(false), Action::Load(_)) | (Some(true), Action::Issue(_)) => Err(
            SessionError::protocol("MessageType does not match the message payload"),
        ),
        _ => Ok(action),
    }
}

fn decode_request(envelope: RequestEnvelope) -> Result<Request> {
    if envelope.body.is_null() {
        return Err(SessionError::protocol("Request body is empty"));
    }
    let malformed = |e: serde_json::Error| SessionError::protocol(format!("malformed request body: {e}"));
    match envelope.kind.to_ascii_lowercase().as_str() {
        "algorithm" => Ok(Request::Algorithm(
            serde_json::from_value::<AlgorithmRequest>(envelope.body).map_err(malformed)?,
        )),
        "function" => Ok(Request::Function(
            serde_json::from_value::<FunctionRequest>(envelope.body).map_err(malformed)?,
        )),
        other => Err(SessionError::algorithm(format!("Unknown request type '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn algorithm_frame() -> Value {
        json!({
            "MessageType": "REQUEST",
            "Request": {
                "Type": "Algorithm",
                "Body": {
                    "AlgorithmName": "GeneticAlgorithm",
                    "ParamValues": { "populationSize": 20 },
                    "Steps": 10,
                    "FunctionList": [
                        { "FunctionName": "Sphere", "minValue": -5, "maxValue": 5 }
                    ]
                }
            }
        })
    }

    fn protocol_err(frame: &str) -> bool {
        matches!(decode(frame), Err(SessionError::Protocol(_)))
    }

    // ---- Requests ----

    #[test]
    fn test_decode_algorithm_request() {
        let action = decode(&algorithm_frame().to_string()).unwrap();
        let Action::Load(Request::Algorithm(req)) = action else {
            panic!("expected an algorithm load");
        };
        assert_eq!(req.steps, 10);
        assert_eq!(req.function_list[0].function_name, "Sphere");
    }

    #[test]
    fn test_decode_function_request_case_insensitive_type() {
        let frame = json!({
            "Request": {
                "Type": "function",
                "Body": {
                    "FunctionName": "Sphere", "minValue": -1, "maxValue": 1,
                    "Steps": 2, "Algorithms": [{ "AlgorithmName": "PSO" }]
                }
            }
        });
        assert!(matches!(
            decode(&frame.to_string()),
            Ok(Action::Load(Request::Function(_)))
        ));
    }

    #[test]
    fn test_unknown_request_type_is_algorithm_error() {
        let frame = json!({ "Request": { "Type": "Tabu", "Body": {} } });
        assert!(matches!(
            decode(&frame.to_string()),
            Err(SessionError::Algorithm(_))
        ));
    }

    #[test]
    fn test_null_request_is_empty() {
        let err = decode(r#"{"Request": null}"#).unwrap_err();
        assert_eq!(err, SessionError::protocol("Request is empty"));
    }

    #[test]
    fn test_bad_body_is_protocol_error() {
        let frame = json!({ "Request": { "Type": "Algorithm", "Body": { "Steps": "ten" } } });
        assert!(protocol_err(&frame.to_string()));
        let frame = json!({ "Request": { "Type": "Algorithm" } });
        assert!(protocol_err(&frame.to_string()));
    }

    // ---- Commands ----

    #[test]
    fn test_decode_commands() {
        for (word, cmd) in [
            ("start", Command::Start),
            ("STOP", Command::Stop),
            ("Pause", Command::Pause),
            ("resume", Command::Resume),
        ] {
            let frame = json!({ "MessageType": "COMMAND", "Command": { "RequestedState": word } });
            assert_eq!(decode(&frame.to_string()), Ok(Action::Issue(cmd)));
        }
    }

    #[test]
    fn test_wrong_command() {
        let err = decode(r#"{"Command": {"RequestedState": "restart"}}"#).unwrap_err();
        assert_eq!(err, SessionError::protocol("Wrong command"));
        assert!(protocol_err(r#"{"Command": {}}"#));
        assert!(protocol_err(r#"{"Command": null}"#));
    }

    // ---- Envelope ----

    #[test]
    fn test_both_or_neither() {
        assert!(protocol_err("{}"));
        assert!(protocol_err(r#"{"MessageType": "COMMAND"}"#));
        assert!(protocol_err(
            r#"{"Request": null, "Command": {"RequestedState": "start"}}"#
        ));
        let mut frame = algorithm_frame();
        frame["Command"] = json!({ "RequestedState": "start" });
        assert!(protocol_err(&frame.to_string()));
    }

    #[test]
    fn test_message_type_mismatch() {
        let mut frame = algorithm_frame();
        frame["MessageType"] = json!("COMMAND");
        assert!(protocol_err(&frame.to_string()));

        assert!(protocol_err(
            r#"{"MessageType": "PING", "Command": {"RequestedState": "start"}}"#
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(protocol_err("not json"));
        assert!(protocol_err("[1, 2]"));
    }

    #[test]
    fn test_field_states() {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(default)]
            x: Field<i32>,
        }
        let absent: Probe = serde_json::from_str("{}").unwrap();
        let null: Probe = serde_json::from_str(r#"{"x": null}"#).unwrap();
        let set: Probe = serde_json::from_str(r#"{"x": 3}"#).unwrap();
        assert_eq!(absent.x, Field::Absent);
        assert_eq!(null.x, Field::Null);
        assert_eq!(set.x, Field::Present(3));
    }
}
