// src/common/response.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

// Envelope de sucesso: { "body": { "data": ... } }
#[derive(Serialize)]
struct Body<T> {
    data: T,
}

#[derive(Serialize)]
struct Envelope<T> {
    body: Body<T>,
}

pub struct ApiResponse<T>(pub StatusCode, pub T);

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Self {
        Self(StatusCode::CREATED, data)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let envelope = Envelope { body: Body { data: self.1 } };
        (self.0, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_is_wrapped_in_the_envelope() {
        let envelope = Envelope { body: Body { data: vec![1, 2] } };
        let value = serde_json::to_value(envelope).unwrap();
        assert_eq!(value, serde_json::json!({ "body": { "data": [1, 2] } }));
    }
}
