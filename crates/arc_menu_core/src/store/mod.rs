//! Contracts of the datastore the menus read from and write to.

use std::fmt::{Display, Formatter};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::data::api_index::ApiIndexItem;
use crate::data::project::Project;
use crate::data::request::{ArcRequest, RequestKind};
use crate::dnd::effect::DropEffect;

pub mod memory;
pub mod mutation;

pub const PAGE_SIZE: usize = 25;

#[derive(Debug, Display, EnumString, EnumIter, AsRefStr, PartialEq, Eq, Clone, Copy, Hash)]
#[strum(serialize_all = "kebab-case")]
pub enum Collection {
    History,
    Saved,
    Projects,
    ApiIndex,
}

impl From<RequestKind> for Collection {
    fn from(kind: RequestKind) -> Self {
        match kind {
            RequestKind::History => Collection::History,
            RequestKind::Saved => Collection::Saved,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Page {
            items: vec![],
            next_page_token: None,
        }
    }
}

/// Where a request added to a project comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOrigin {
    /// An existing saved request, referenced by the request id.
    Saved,
    /// A history entry copied into a new saved request.
    History { history_id: String },
}

pub trait RecordQuery {
    fn list_requests(
        &self,
        kind: RequestKind,
        page_token: Option<&str>,
    ) -> anyhow::Result<Page<ArcRequest>>;
    fn list_projects(&self, page_token: Option<&str>) -> anyhow::Result<Page<Project>>;
    fn list_api_index(&self, page_token: Option<&str>) -> anyhow::Result<Page<ApiIndexItem>>;
    /// Bulk read of saved requests. Missing records come back as `None`.
    fn read_requests(&self, ids: &[String]) -> anyhow::Result<Vec<Option<ArcRequest>>>;
}

pub trait MenuMutations {
    fn add_request_to_project(
        &mut self,
        project_id: &str,
        request_id: &str,
        origin: RequestOrigin,
        index: Option<usize>,
        effect: DropEffect,
    ) -> anyhow::Result<()>;
    fn move_request_between_projects(
        &mut self,
        from_project_id: &str,
        to_project_id: &str,
        request_id: &str,
        index: Option<usize>,
    ) -> anyhow::Result<()>;
    /// Moves a request inside its project. `new_index` is the insertion slot
    /// the drop marker pointed at, counted before the request is taken out.
    fn reorder_project_requests(
        &mut self,
        project_id: &str,
        request_id: &str,
        new_index: usize,
    ) -> anyhow::Result<()>;
    /// Same slot convention as [`MenuMutations::reorder_project_requests`].
    fn reorder_project(&mut self, project_id: &str, new_index: usize) -> anyhow::Result<()>;
    fn create_project(&mut self, name: &str) -> anyhow::Result<Project>;
    fn update_project(&mut self, project: Project) -> anyhow::Result<Project>;
    fn delete_project(&mut self, project_id: &str) -> anyhow::Result<()>;
    fn save_request(&mut self, request: ArcRequest) -> anyhow::Result<ArcRequest>;
}

/// A rejected mutation, reported once to the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessError {
    pub message: String,
}

impl ProcessError {
    pub fn from_cause(cause: &anyhow::Error) -> Self {
        let message = cause.to_string();
        ProcessError {
            message: if message.is_empty() {
                "Unknown error".to_string()
            } else {
                message
            },
        }
    }
}

impl Display for ProcessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Cuts one page out of `items` in `key` order.
///
/// The token is the key of the last row handed out, so a page resumes
/// strictly after that row even when earlier rows were removed or added
/// between calls. Keys must be unique, which callers get by ending them with
/// the record id.
pub(crate) fn paginate<T, K>(
    mut items: Vec<T>,
    page_token: Option<&str>,
    key: impl Fn(&T) -> K,
) -> anyhow::Result<Page<T>>
where
    K: Ord + Serialize + DeserializeOwned,
{
    items.sort_by_cached_key(|item| key(item));
    let start = match page_token {
        None => 0,
        Some(token) => {
            let after: K = serde_json::from_str(token)
                .with_context(|| format!("Invalid page token {}", token))?;
            items.partition_point(|item| key(item) <= after)
        }
    };
    let end = (start + PAGE_SIZE).min(items.len());
    let next_page_token = if end < items.len() {
        Some(serde_json::to_string(&key(&items[end - 1]))?)
    } else {
        None
    };
    items.truncate(end);
    Ok(Page {
        items: items.split_off(start),
        next_page_token,
    })
}
