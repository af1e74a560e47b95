//! Peer-facing infection endpoint.
//!
//! # Responsibilities
//! - Accept `action=achoo` notifications from peers and hand them to the
//!   node state machine
//! - Answer malformed or unrecognized requests without touching node state
//!
//! The acknowledgement is written before any infection side effect runs; the
//! symptom timer and everything after it live on their own tasks.

use std::sync::Arc;

use axum::{
    extract::{rejection::RawFormRejection, RawForm, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::node::Node;

/// Form payload for the face endpoint.
#[derive(Debug, Deserialize)]
pub struct FacePayload {
    #[serde(default)]
    pub action: String,
}

/// Build the peer-facing router.
pub fn router(node: Arc<Node>) -> Router {
    Router::new()
        .route("/face", any(face_handler))
        .with_state(node)
        .layer(TraceLayer::new_for_http())
}

async fn face_handler(
    State(node): State<Arc<Node>>,
    method: Method,
    payload: Result<RawForm, RawFormRejection>,
) -> Response {
    if method != Method::POST {
        return "Stop bothering me, please.".into_response();
    }

    let RawForm(body) = match payload {
        Ok(raw) => raw,
        Err(err) => return parse_failure(err),
    };
    let payload = match parse_form_strict(&body) {
        Ok(payload) => payload,
        Err(err) => return parse_failure(err),
    };

    match payload.action.as_str() {
        "achoo" => {
            // Acknowledge every sneeze the same way, winner or not.
            node.notify_infection();
            "eww\n".into_response()
        }
        "" => "Do something!\n".into_response(),
        _ => "I don't understand what you're doing.\n".into_response(),
    }
}

fn parse_failure(err: impl std::fmt::Display) -> Response {
    (
        StatusCode::BAD_REQUEST,
        format!("could not parse POST form: {}\n", err),
    )
        .into_response()
}

/// Decode the form body strictly.
///
/// The urlencoded deserializer waves broken percent-escapes through as
/// literal text; peers send well-formed bodies, so anything with a bad
/// escape is rejected outright before deserializing.
fn parse_form_strict(body: &[u8]) -> Result<FacePayload, String> {
    check_escapes(body)?;
    serde_urlencoded::from_bytes(body).map_err(|err| err.to_string())
}

// A '%' must introduce exactly two hex digits.
fn check_escapes(body: &[u8]) -> Result<(), String> {
    let mut i = 0;
    while i < body.len() {
        if body[i] == b'%' {
            let complete = i + 2 < body.len()
                && body[i + 1].is_ascii_hexdigit()
                && body[i + 2].is_ascii_hexdigit();
            if !complete {
                let end = (i + 3).min(body.len());
                return Err(format!(
                    "invalid URL escape {:?}",
                    String::from_utf8_lossy(&body[i..end])
                ));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}
