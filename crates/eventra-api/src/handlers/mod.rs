//! HTTP handlers, grouped by resource.
//!
//! Every success response uses the same envelope as errors:
//! `{"status": "success", "message"?, "data"?}`.

pub mod assist;
pub mod auth;
pub mod events;
pub mod quotes;
pub mod users;
pub mod venues;

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

pub fn success<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": data,
    }))
}

pub fn success_message(message: &str) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": message,
    }))
}

pub fn success_with<T: Serialize>(message: &str, data: T) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": message,
        "data": data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shapes() {
        let Json(body) = success(vec![1, 2]);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"][1], 2);
        assert!(body.get("message").is_none());

        let Json(body) = success_with("created", json!({"id": 7}));
        assert_eq!(body["message"], "created");
        assert_eq!(body["data"]["id"], 7);
    }
}
