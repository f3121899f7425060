#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use serde_json::Value;
use tower::Service;

pub const SECRET: &str = "router-test-secret";
const BOUNDARY: &str = "----tourism-test-boundary";

pub async fn send(app: &Router, req: Request<Body>) -> anyhow::Result<Response<Body>> {
    Ok(app.clone().call(req).await?)
}

pub async fn json_body(resp: Response<Body>) -> anyhow::Result<Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    Ok(builder.body(Body::from(serde_json::to_vec(&body)?))?)
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    Ok(builder.body(Body::empty())?)
}

/// Hand-built multipart/form-data body.
#[derive(Default)]
pub struct Form {
    buf: Vec<u8>,
}

impl Form {
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(bytes);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, method: &str, uri: &str, token: &str) -> anyhow::Result<Request<Body>> {
        self.buf.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Ok(Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(self.buf))?)
    }
}
