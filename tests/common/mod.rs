// tests/common/mod.rs
//! Shared test support: an in-memory API and canned responses.
#![allow(dead_code)]

use cms_migrate_source::{
    AccountName, ApiClient, ApiKey, AppError, Credentials, RawResponse, RequestParams, Transport,
};
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Arc;

pub const PROJECT: &str = include_str!("../fixtures/api_responses/project.json");
pub const PROJECTS: &str = include_str!("../fixtures/api_responses/projects.json");
pub const TEMPLATE: &str = include_str!("../fixtures/api_responses/template.json");
pub const TEMPLATES: &str = include_str!("../fixtures/api_responses/templates_by_project.json");
pub const PAGES: &str = include_str!("../fixtures/api_responses/pages_by_project.json");
pub const FILES: &str = include_str!("../fixtures/api_responses/files_by_project.json");
pub const PAGES_MIXED: &str = include_str!("../fixtures/api_responses/pages_mixed.json");
pub const FILES_MIXED: &str = include_str!("../fixtures/api_responses/files_mixed.json");
pub const TEMPLATE_MIXED: &str = include_str!("../fixtures/api_responses/template_mixed.json");
pub const ME: &str = include_str!("../fixtures/api_responses/me.json");
pub const UNAUTHORIZED: &str = include_str!("../fixtures/api_responses/error_unauthorized.json");

/// One recorded request: command and form body.
pub type CallLog = Arc<Mutex<Vec<(String, String)>>>;

/// Serves a fixed response per command. Unrouted commands fail at the
/// transport level, as if the host were unreachable.
#[derive(Default)]
pub struct FakeApi {
    routes: HashMap<String, (u16, String)>,
    calls: CallLog,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, command: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert(command.to_string(), (status, body.to_string()));
        self
    }

    pub fn ok(self, command: &str, body: &str) -> Self {
        self.route(command, 200, body)
    }

    pub fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }
}

impl Transport for FakeApi {
    fn post_form(&self, url: &str, params: &RequestParams) -> Result<RawResponse, AppError> {
        let command = url.rsplit('/').next().unwrap_or_default().to_string();
        self.calls
            .lock()
            .push((command.clone(), params.form_encoded()));

        match self.routes.get(&command) {
            Some((status, body)) => Ok(RawResponse {
                body: body.clone(),
                status: StatusCode::from_u16(*status).unwrap(),
                url: url.to_string(),
            }),
            None => Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
        }
    }
}

pub fn credentials() -> Credentials {
    Credentials::new(
        AccountName::new("acme").unwrap(),
        ApiKey::new("test-key-123").unwrap(),
    )
    .unwrap()
}

pub fn client(api: FakeApi) -> ApiClient {
    ApiClient::with_transport(credentials(), api)
}

/// The project used by the end-to-end scenario.
pub fn scenario_api() -> FakeApi {
    FakeApi::new()
        .ok("get_project", PROJECT)
        .ok("get_template", TEMPLATE)
        .ok("get_pages_by_project", PAGES)
        .ok("get_files_by_project", FILES)
}

/// Three templates, choice fields, several files per field.
pub fn mixed_api() -> FakeApi {
    FakeApi::new()
        .ok("get_project", PROJECT)
        .ok("get_template", TEMPLATE_MIXED)
        .ok("get_pages_by_project", PAGES_MIXED)
        .ok("get_files_by_project", FILES_MIXED)
}
