// src/api/resources.rs
//! Typed accessors, one per remote command.
//!
//! Each accessor decodes its payload into the matching model type. Single
//! records that do not fit their shape count as "no data"; list items that
//! do not fit are skipped so one odd record cannot hide the rest.

use super::client::ApiClient;
use super::commands::{Command, RequestParams};
use crate::model::{
    Collection, CustomState, File, Group, Keyed, Page, Project, Template, User,
};
use crate::types::{CustomStateId, FileId, GroupId, PageId, ProjectId, TemplateId, UserId};
use serde::de::DeserializeOwned;
use serde_json::Value;

impl ApiClient {
    // ---- account ----

    /// The user the API key belongs to.
    pub fn get_me(&self) -> Option<User> {
        self.fetch_one(Command::GetMe, RequestParams::new())
    }

    pub fn get_users(&self) -> Option<Collection<User>> {
        self.fetch_many(Command::GetUsers, RequestParams::new())
    }

    pub fn get_user(&self, id: &UserId) -> Option<User> {
        self.fetch_one(Command::GetUser, RequestParams::id(id))
    }

    /// The group the API key belongs to.
    pub fn get_my_group(&self) -> Option<Group> {
        self.fetch_one(Command::GetMyGroup, RequestParams::new())
    }

    pub fn get_groups(&self) -> Option<Collection<Group>> {
        self.fetch_many(Command::GetGroups, RequestParams::new())
    }

    pub fn get_group(&self, id: &GroupId) -> Option<Group> {
        self.fetch_one(Command::GetGroup, RequestParams::id(id))
    }

    // ---- projects ----

    pub fn get_projects(&self) -> Option<Collection<Project>> {
        self.fetch_many(Command::GetProjects, RequestParams::new())
    }

    pub fn get_project(&self, id: &ProjectId) -> Option<Project> {
        self.fetch_one(Command::GetProject, RequestParams::id(id))
    }

    pub fn get_custom_state(&self, id: &CustomStateId) -> Option<CustomState> {
        self.fetch_one(Command::GetCustomState, RequestParams::id(id))
    }

    pub fn get_custom_states_by_project(&self, id: &ProjectId) -> Option<Collection<CustomState>> {
        self.fetch_many(Command::GetCustomStatesByProject, RequestParams::id(id))
    }

    // ---- pages and files ----

    pub fn get_page(&self, id: &PageId) -> Option<Page> {
        self.fetch_one(Command::GetPage, RequestParams::id(id))
    }

    /// All pages of a project, in the order the service lists them.
    pub fn get_pages_by_project(&self, id: &ProjectId) -> Option<Collection<Page>> {
        self.fetch_many(Command::GetPagesByProject, RequestParams::id(id))
    }

    pub fn get_file(&self, id: &FileId) -> Option<File> {
        self.fetch_one(Command::GetFile, RequestParams::id(id))
    }

    /// All files of a project, in the order the service lists them.
    pub fn get_files_by_project(&self, id: &ProjectId) -> Option<Collection<File>> {
        self.fetch_many(Command::GetFilesByProject, RequestParams::id(id))
    }

    pub fn get_files_by_page(&self, id: &PageId) -> Option<Collection<File>> {
        self.fetch_many(Command::GetFilesByPage, RequestParams::id(id))
    }

    // ---- templates ----

    pub fn get_template(&self, id: &TemplateId) -> Option<Template> {
        self.fetch_one(Command::GetTemplate, RequestParams::id(id))
    }

    pub fn get_templates_by_project(&self, id: &ProjectId) -> Option<Collection<Template>> {
        self.fetch_many(Command::GetTemplatesByProject, RequestParams::id(id))
    }

    fn fetch_one<T: DeserializeOwned>(&self, command: Command, params: RequestParams) -> Option<T> {
        let payload = self.fetch(command, &params)?;
        match serde_json::from_value(payload) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Unexpected {} payload: {}", command.payload_property(), e);
                None
            }
        }
    }

    fn fetch_many<T>(&self, command: Command, params: RequestParams) -> Option<Collection<T>>
    where
        T: DeserializeOwned + Keyed,
    {
        let payload = self.fetch(command, &params)?;
        let Value::Array(items) = payload else {
            log::warn!("Expected a list of {}", command.payload_property());
            return None;
        };

        let collection: Collection<T> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<T>(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping malformed {} item: {}", command.payload_property(), e);
                    None
                }
            })
            .collect();
        Some(collection)
    }
}
