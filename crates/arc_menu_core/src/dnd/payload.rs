use std::collections::BTreeMap;
use std::str::FromStr;

use log::debug;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::data::project::Project;
use crate::data::request::ArcRequest;
use crate::dnd::effect::EffectAllowed;

pub const TYPE_REQUEST: &str = "arc/request";
pub const TYPE_ID: &str = "arc/id";
pub const TYPE_KIND: &str = "arc/type";
pub const TYPE_SOURCE: &str = "arc/source";
pub const TYPE_PROJECT_REQUEST: &str = "arc/project-request";
pub const TYPE_REQUEST_OBJECT: &str = "arc/request-object";
pub const TYPE_HISTORY: &str = "arc/history";
pub const TYPE_PROJECT: &str = "arc/project";

const MARKER: &str = "1";

#[derive(Debug, Display, EnumString, AsRefStr, PartialEq, Eq, Clone, Copy)]
#[strum(serialize_all = "lowercase")]
pub enum PayloadKind {
    Request,
    Project,
}

/// Widget that started a drag.
#[derive(Debug, Display, EnumString, AsRefStr, PartialEq, Eq, Clone, Copy, Hash)]
#[strum(serialize_all = "kebab-case")]
pub enum MenuSource {
    HistoryMenu,
    SavedMenu,
    ProjectsMenu,
    RestApiMenu,
    ArcMenu,
}

/// The bag of typed strings attached to a drag.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DragPayload {
    data: BTreeMap<String, String>,
    pub effect_allowed: EffectAllowed,
}

impl DragPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, data_type: impl Into<String>, value: impl Into<String>) {
        self.data.insert(data_type.into(), value.into());
    }

    pub fn with_data(mut self, data_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_data(data_type, value);
        self
    }

    pub fn get_data(&self, data_type: &str) -> Option<&str> {
        self.data.get(data_type).map(|v| v.as_str())
    }

    pub fn has_type(&self, data_type: &str) -> bool {
        self.data.contains_key(data_type)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|k| k.as_str())
    }

    /// Drag of a history or saved request out of a request list.
    pub fn for_request(request: &ArcRequest, source: MenuSource) -> Self {
        let mut payload = DragPayload::new()
            .with_data(TYPE_REQUEST, MARKER)
            .with_data(TYPE_ID, request.id.clone())
            .with_data(TYPE_KIND, PayloadKind::Request.as_ref())
            .with_data(TYPE_SOURCE, source.as_ref());
        match serde_json::to_string(request) {
            Ok(json) => payload.set_data(TYPE_REQUEST_OBJECT, json),
            Err(e) => debug!("request {} not serialized into drag data: {}", request.id, e),
        }
        if request.is_history() {
            payload.set_data(TYPE_HISTORY, MARKER);
            payload.effect_allowed = EffectAllowed::Copy;
        } else {
            payload.effect_allowed = EffectAllowed::CopyMove;
        }
        payload
    }

    /// Drag of a request row that is listed under `project_id`.
    pub fn for_project_request(request: &ArcRequest, project_id: &str) -> Self {
        DragPayload::for_request(request, MenuSource::ProjectsMenu)
            .with_data(TYPE_PROJECT_REQUEST, project_id)
    }

    pub fn for_project(project: &Project, source: MenuSource) -> Self {
        let mut payload = DragPayload::new()
            .with_data(TYPE_ID, project.id.clone())
            .with_data(TYPE_KIND, PayloadKind::Project.as_ref())
            .with_data(TYPE_SOURCE, source.as_ref())
            .with_data(TYPE_PROJECT, MARKER);
        payload.effect_allowed = EffectAllowed::CopyMove;
        payload
    }

    /// The declared kind. Request drags must carry the `arc/request` marker.
    pub fn kind(&self) -> Option<PayloadKind> {
        match self.get_data(TYPE_KIND).map(PayloadKind::from_str) {
            Some(Ok(PayloadKind::Request)) if self.has_type(TYPE_REQUEST) => {
                Some(PayloadKind::Request)
            }
            Some(Ok(PayloadKind::Project)) => Some(PayloadKind::Project),
            None if self.has_type(TYPE_REQUEST) => Some(PayloadKind::Request),
            _ => None,
        }
    }

    pub fn is_request(&self) -> bool {
        self.kind() == Some(PayloadKind::Request)
    }

    pub fn source(&self) -> Option<MenuSource> {
        self.get_data(TYPE_SOURCE)
            .and_then(|s| MenuSource::from_str(s).ok())
    }

    pub fn owner_project_id(&self) -> Option<&str> {
        self.get_data(TYPE_PROJECT_REQUEST).filter(|p| !p.is_empty())
    }

    /// The serialized record; `None` when absent or unparsable.
    pub fn request_object(&self) -> Option<ArcRequest> {
        let json = self.get_data(TYPE_REQUEST_OBJECT)?;
        match serde_json::from_str(json) {
            Ok(request) => Some(request),
            Err(e) => {
                debug!("ignoring malformed {} drag data: {}", TYPE_REQUEST_OBJECT, e);
                None
            }
        }
    }

    /// Record identifier from `arc/id`, falling back to the serialized record.
    pub fn id(&self) -> Option<String> {
        match self.get_data(TYPE_ID).filter(|id| !id.is_empty()) {
            Some(id) => Some(id.to_string()),
            None => self
                .request_object()
                .map(|r| r.id)
                .filter(|id| !id.is_empty()),
        }
    }

    pub fn is_history_origin(&self) -> bool {
        self.has_type(TYPE_HISTORY)
            || self.source() == Some(MenuSource::HistoryMenu)
            || self
                .request_object()
                .map(|r| r.is_history())
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use crate::data::request::RequestKind;

    use super::*;

    fn request(kind: RequestKind) -> ArcRequest {
        ArcRequest {
            id: "r1".to_string(),
            kind,
            name: "Users".to_string(),
            url: "https://api.domain.com/users".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn history_drag_is_copy_only() {
        let payload = DragPayload::for_request(&request(RequestKind::History), MenuSource::HistoryMenu);
        assert_eq!(payload.kind(), Some(PayloadKind::Request));
        assert!(payload.is_history_origin());
        assert_eq!(payload.effect_allowed, EffectAllowed::Copy);
        assert_eq!(payload.source(), Some(MenuSource::HistoryMenu));
        assert_eq!(payload.get_data(TYPE_SOURCE), Some("history-menu"));
    }

    #[test]
    fn saved_drag_allows_move() {
        let payload = DragPayload::for_request(&request(RequestKind::Saved), MenuSource::SavedMenu);
        assert!(!payload.is_history_origin());
        assert_eq!(payload.effect_allowed, EffectAllowed::CopyMove);
        assert_eq!(payload.id().as_deref(), Some("r1"));
        assert_eq!(payload.request_object(), Some(request(RequestKind::Saved)));
        assert_eq!(payload.owner_project_id(), None);
    }

    #[test]
    fn project_request_drag_names_owner() {
        let payload = DragPayload::for_project_request(&request(RequestKind::Saved), "p1");
        assert_eq!(payload.owner_project_id(), Some("p1"));
        assert_eq!(payload.source(), Some(MenuSource::ProjectsMenu));
    }

    #[test]
    fn project_drag_is_not_a_request() {
        let project = Project {
            id: "p1".to_string(),
            ..Default::default()
        };
        let payload = DragPayload::for_project(&project, MenuSource::ProjectsMenu);
        assert_eq!(payload.kind(), Some(PayloadKind::Project));
        assert!(!payload.is_request());
    }

    #[test]
    fn request_kind_requires_marker() {
        let payload = DragPayload::new()
            .with_data(TYPE_KIND, "request")
            .with_data(TYPE_ID, "r1");
        assert_eq!(payload.kind(), None);
        let unknown = DragPayload::new().with_data(TYPE_KIND, "folder");
        assert_eq!(unknown.kind(), None);
    }

    #[test]
    fn legacy_object_supplies_id() {
        let json = serde_json::to_string(&request(RequestKind::History)).unwrap();
        let payload = DragPayload::new()
            .with_data(TYPE_REQUEST, "1")
            .with_data(TYPE_REQUEST_OBJECT, json);
        assert_eq!(payload.kind(), Some(PayloadKind::Request));
        assert_eq!(payload.id().as_deref(), Some("r1"));
        assert!(payload.is_history_origin());
    }

    #[test]
    fn malformed_object_is_ignored() {
        let payload = DragPayload::new()
            .with_data(TYPE_REQUEST, "1")
            .with_data(TYPE_REQUEST_OBJECT, "{not json");
        assert_eq!(payload.request_object(), None);
        assert_eq!(payload.id(), None);
        assert!(!payload.is_history_origin());
    }
}
