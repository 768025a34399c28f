use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

pub const UNNAMED_REQUEST: &str = "Unnamed";

#[derive(
    Debug, Display, PartialEq, EnumString, EnumIter, AsRefStr, Clone, Copy, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestKind {
    History,
    Saved,
}

impl Default for RequestKind {
    fn default() -> Self {
        RequestKind::Saved
    }
}

#[derive(Debug, Display, PartialEq, EnumString, EnumIter, Clone, Eq, Serialize, Deserialize)]
pub enum Method {
    POST,
    GET,
    PUT,
    PATCH,
    DELETE,
    HEAD,
    OPTIONS,
}

impl Default for Method {
    fn default() -> Self {
        Method::GET
    }
}

#[derive(Default, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcRequest {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub name: String,
    pub method: Method,
    pub url: String,
    pub headers: String,
    pub payload: String,
    pub projects: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl ArcRequest {
    pub fn is_history(&self) -> bool {
        self.kind == RequestKind::History
    }

    pub fn belongs_to(&self, project_id: &str) -> bool {
        self.projects.iter().any(|p| p == project_id)
    }

    pub fn display_name(&self) -> String {
        if !self.name.is_empty() {
            self.name.clone()
        } else if !self.url.is_empty() {
            self.url.clone()
        } else {
            UNNAMED_REQUEST.to_string()
        }
    }

    pub fn local_day(&self) -> NaiveDate {
        self.created.with_timezone(&Local).date_naive()
    }
}

/// Prepares a dropped request before it is stored by the receiving list.
///
/// A history entry is an immutable log record, so whatever the destination is
/// it receives a copy with a new identifier and no revision.
pub fn prepare_drop_request(request: &ArcRequest) -> ArcRequest {
    let mut request = request.clone();
    if request.is_history() {
        request.rev = None;
        request.id = Uuid::new_v4().to_string();
    }
    if request.name.is_empty() {
        request.name = UNNAMED_REQUEST.to_string();
    }
    request
}

#[derive(Default, Clone, PartialEq, Eq, Debug)]
pub struct DateGroupHistoryList {
    pub history_list: Vec<ArcRequest>,
}

/// Groups history entries by local calendar day. Iterate the map in reverse
/// to get the newest day first.
pub fn group_history_by_day<'a>(
    requests: impl IntoIterator<Item = &'a ArcRequest>,
) -> BTreeMap<NaiveDate, DateGroupHistoryList> {
    let mut date_group: BTreeMap<NaiveDate, DateGroupHistoryList> = BTreeMap::new();
    for request in requests {
        date_group
            .entry(request.local_day())
            .or_default()
            .history_list
            .push(request.clone());
    }
    for group in date_group.values_mut() {
        group
            .history_list
            .sort_by(|a, b| b.created.cmp(&a.created));
    }
    date_group
}
