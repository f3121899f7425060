use std::collections::HashMap;

use axum::extract::{Multipart, State};
use axum::Json;
use common::types::Health;
use service::storage::UploadedFile;
use utoipa::OpenApi;

use crate::errors::ApiError;
use crate::openapi::{BlogApiDoc, StakeholdersApiDoc};
use crate::state::ServiceName;

pub mod blogs;
pub mod stakeholders;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health(State(name): State<ServiceName>) -> Json<Health> {
    Json(Health::up(&name.0))
}

pub async fn blog_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(BlogApiDoc::openapi())
}

pub async fn stakeholders_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(StakeholdersApiDoc::openapi())
}

/// A fully buffered multipart body: text fields and files, grouped by field name
/// in arrival order.
#[derive(Debug, Default)]
pub(crate) struct FormData {
    text: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl FormData {
    pub(crate) async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    form.files.entry(name).or_default().push(UploadedFile { file_name, content_type, bytes });
                }
                None => {
                    let value = field.text().await?;
                    form.text.entry(name).or_default().push(value);
                }
            }
        }
        Ok(form)
    }

    /// First value of a text field; `None` when the field was not sent at all.
    pub(crate) fn text(&self, name: &str) -> Option<String> {
        self.text.get(name).and_then(|v| v.first()).cloned()
    }

    pub(crate) fn texts(&mut self, name: &str) -> Vec<String> {
        self.text.remove(name).unwrap_or_default()
    }

    pub(crate) fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        self.files.remove(name).unwrap_or_default()
    }
}
