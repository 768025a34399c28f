use log::{info, warn};

use crate::data::project::Project;
use crate::data::request::ArcRequest;
use crate::dnd::effect::DropEffect;
use crate::store::{MenuMutations, ProcessError, RequestOrigin};

/// A change a menu asks the datastore to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRequest {
    AddRequestToProject {
        project_id: String,
        request_id: String,
        origin: RequestOrigin,
        index: Option<usize>,
        effect: DropEffect,
    },
    MoveRequestBetweenProjects {
        from_project_id: String,
        to_project_id: String,
        request_id: String,
        index: Option<usize>,
    },
    ReorderProjectRequests {
        project_id: String,
        request_id: String,
        new_index: usize,
    },
    ReorderProject {
        project_id: String,
        new_index: usize,
    },
    CreateProject {
        name: String,
    },
    UpdateProject {
        project: Project,
    },
    DeleteProject {
        project_id: String,
    },
    SaveRequest {
        request: ArcRequest,
    },
}

impl MutationRequest {
    /// Hands the request to the datastore. Failures are logged and returned
    /// as a [`ProcessError`]; nothing is retried.
    pub fn apply(self, store: &mut impl MenuMutations) -> Result<(), ProcessError> {
        info!("mutation {:?}", self);
        let result = match self {
            MutationRequest::AddRequestToProject {
                project_id,
                request_id,
                origin,
                index,
                effect,
            } => store.add_request_to_project(&project_id, &request_id, origin, index, effect),
            MutationRequest::MoveRequestBetweenProjects {
                from_project_id,
                to_project_id,
                request_id,
                index,
            } => store.move_request_between_projects(
                &from_project_id,
                &to_project_id,
                &request_id,
                index,
            ),
            MutationRequest::ReorderProjectRequests {
                project_id,
                request_id,
                new_index,
            } => store.reorder_project_requests(&project_id, &request_id, new_index),
            MutationRequest::ReorderProject {
                project_id,
                new_index,
            } => store.reorder_project(&project_id, new_index),
            MutationRequest::CreateProject { name } => store.create_project(&name).map(|_| ()),
            MutationRequest::UpdateProject { project } => store.update_project(project).map(|_| ()),
            MutationRequest::DeleteProject { project_id } => store.delete_project(&project_id),
            MutationRequest::SaveRequest { request } => store.save_request(request).map(|_| ()),
        };
        result.map_err(|e| {
            warn!("mutation rejected: {:#}", e);
            ProcessError::from_cause(&e)
        })
    }
}
