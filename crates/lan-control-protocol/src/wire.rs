//! Wire mapping: command → route and JSON body, HTTP reply → [`Reply`].
//!
//! POST requests always carry a JSON object body (`{}` when the command has
//! no payload). Any non-2xx status is a failure; the message is the reply's
//! `error` field when present, else the status reason phrase.

use lan_control_types::{Command, Reply, SystemAction};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Where a command is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub path: &'static str,
}

impl Route {
    const fn get(path: &'static str) -> Self {
        Self {
            method: Method::Get,
            path,
        }
    }

    const fn post(path: &'static str) -> Self {
        Self {
            method: Method::Post,
            path,
        }
    }
}

pub const SESSION: Route = Route::get("/api/session");
pub const LOGIN: Route = Route::post("/api/login");
pub const LOGOUT: Route = Route::post("/api/logout");

/// Route for a command.
#[must_use]
pub fn route(command: &Command) -> Route {
    match command {
        Command::MouseMove(_) => Route::post("/api/mouse/move"),
        Command::MouseClick(_) => Route::post("/api/mouse/click"),
        Command::MouseScroll(_) => Route::post("/api/mouse/scroll"),
        Command::MouseState => Route::get("/api/mouse/state"),
        Command::Key(_) => Route::post("/api/keyboard/key"),
        Command::Type(_) => Route::post("/api/keyboard/type"),
        Command::ClipboardGet => Route::get("/api/clipboard"),
        Command::ClipboardSet(_) => Route::post("/api/clipboard"),
        Command::System(SystemAction::Lock) => Route::post("/api/system/lock"),
        Command::System(SystemAction::Unlock) => Route::post("/api/system/unlock"),
        Command::System(SystemAction::Shutdown) => Route::post("/api/system/shutdown"),
    }
}

/// JSON body for a command. `None` for GET routes.
pub fn body(command: &Command) -> Result<Option<Value>, ProtocolError> {
    let value = match command {
        Command::MouseState | Command::ClipboardGet => return Ok(None),
        Command::MouseMove(movement) => serde_json::to_value(movement)?,
        Command::MouseClick(click) => serde_json::to_value(click)?,
        Command::MouseScroll(scroll) => serde_json::to_value(scroll)?,
        Command::Key(key) => serde_json::to_value(key)?,
        Command::Type(text) => serde_json::to_value(text)?,
        Command::ClipboardSet(content) => serde_json::to_value(content)?,
        Command::System(_) => empty_body(),
    };
    Ok(Some(value))
}

/// The `{}` body sent with payload-less POSTs.
#[must_use]
pub fn empty_body() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Interpret a raw command reply.
///
/// `reason` is the status reason phrase, used when a failed reply carries no
/// `error` field. An empty or non-JSON success body is an empty [`Reply`].
pub fn parse_reply(status: u16, reason: &str, body: &[u8]) -> Result<Reply, ProtocolError> {
    parse_body(status, reason, body)
}

/// Interpret a raw reply as `T`, defaulting when the body is not a JSON object.
pub fn parse_body<T>(status: u16, reason: &str, body: &[u8]) -> Result<T, ProtocolError>
where
    T: DeserializeOwned + Default,
{
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|value| value.get("error").and_then(Value::as_str).map(str::to_owned))
            .unwrap_or_else(|| reason.to_owned());
        return Err(ProtocolError::Rejected { status, message });
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => Ok(serde_json::from_value(value)?),
        Ok(_) | Err(_) => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lan_control_types::{ClipboardContent, KeyAction, MovementVector, RemoteScreenState};
    use serde_json::json;

    #[test]
    fn routes_follow_the_host_api() {
        assert_eq!(route(&Command::MouseState), Route::get("/api/mouse/state"));
        assert_eq!(route(&Command::ClipboardGet).method, Method::Get);
        assert_eq!(
            route(&Command::ClipboardSet(ClipboardContent::text("x"))),
            Route::post("/api/clipboard")
        );
        assert_eq!(
            route(&Command::System(SystemAction::Shutdown)).path,
            "/api/system/shutdown"
        );
    }

    #[test]
    fn bodies_match_payloads() {
        let move_body = body(&Command::MouseMove(MovementVector::new(3.0, -2.0))).unwrap();
        assert_eq!(move_body, Some(json!({"dx": 3.0, "dy": -2.0})));

        let key_body = body(&Command::key("a", KeyAction::Down)).unwrap();
        assert_eq!(key_body, Some(json!({"key": "a", "action": "down"})));

        let lock_body = body(&Command::System(SystemAction::Lock)).unwrap();
        assert_eq!(lock_body, Some(json!({})));

        assert_eq!(body(&Command::MouseState).unwrap(), None);
    }

    #[test]
    fn failure_prefers_error_field() {
        let err = parse_reply(400, "Bad Request", br#"{"error":"unknown key"}"#).unwrap_err();
        match err {
            ProtocolError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "unknown key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failure_falls_back_to_reason() {
        let err = parse_reply(502, "Bad Gateway", b"<html>").unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Rejected { status: 502, ref message } if message == "Bad Gateway"
        ));
    }

    #[test]
    fn success_bodies() {
        assert_eq!(parse_reply(204, "No Content", b"").unwrap(), Reply::default());
        assert_eq!(parse_reply(200, "OK", b"ok").unwrap(), Reply::default());

        let reply = parse_reply(
            200,
            "OK",
            br#"{"state":{"width":100,"height":50,"x":1,"y":2}}"#,
        )
        .unwrap();
        assert_eq!(reply.state, Some(RemoteScreenState::new(100.0, 50.0, 1.0, 2.0)));
    }
}
