// src/api/commands.rs
//! The remote operations and the request parameters they take.

use std::collections::BTreeMap;
use std::fmt;

/// Every remote operation the adapter knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    GetMe,
    GetUsers,
    GetUser,
    GetMyGroup,
    GetGroups,
    GetGroup,
    GetProjects,
    GetProject,
    GetPage,
    GetPagesByProject,
    GetFile,
    GetFilesByProject,
    GetFilesByPage,
    GetCustomState,
    GetCustomStatesByProject,
    GetTemplate,
    GetTemplatesByProject,
}

impl Command {
    /// Path segment appended to the API root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetMe => "get_me",
            Self::GetUsers => "get_users",
            Self::GetUser => "get_user",
            Self::GetMyGroup => "get_my_group",
            Self::GetGroups => "get_groups",
            Self::GetGroup => "get_group",
            Self::GetProjects => "get_projects",
            Self::GetProject => "get_project",
            Self::GetPage => "get_page",
            Self::GetPagesByProject => "get_pages_by_project",
            Self::GetFile => "get_file",
            Self::GetFilesByProject => "get_files_by_project",
            Self::GetFilesByPage => "get_files_by_page",
            Self::GetCustomState => "get_custom_state",
            Self::GetCustomStatesByProject => "get_custom_states_by_project",
            Self::GetTemplate => "get_template",
            Self::GetTemplatesByProject => "get_templates_by_project",
        }
    }

    /// Envelope property the response payload is found under.
    pub fn payload_property(&self) -> &'static str {
        match self {
            Self::GetMe | Self::GetUser => "user",
            Self::GetUsers => "users",
            Self::GetMyGroup | Self::GetGroup => "group",
            Self::GetGroups => "groups",
            Self::GetProjects => "projects",
            Self::GetProject => "project",
            Self::GetPage => "page",
            Self::GetPagesByProject => "pages",
            Self::GetFile => "file",
            Self::GetFilesByProject | Self::GetFilesByPage => "files",
            Self::GetCustomState => "custom_state",
            Self::GetCustomStatesByProject => "custom_states",
            Self::GetTemplate => "template",
            Self::GetTemplatesByProject => "templates",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar request arguments, always held sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(BTreeMap<String, String>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// The common single-argument form: `id=<id>`.
    pub fn id(id: impl fmt::Display) -> Self {
        Self::new().with("id", id)
    }

    pub fn with(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.0.insert(name.into(), value.to_string());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `application/x-www-form-urlencoded` body, parameters in name order.
    pub fn form_encoded(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}
