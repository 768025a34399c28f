use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::data::project::{compare_projects, Project, NEW_PROJECT_NAME};
use crate::data::request::{ArcRequest, RequestKind};
use crate::dnd::arbitrator::DropHost;
use crate::events::StoreEvent;
use crate::store::mutation::MutationRequest;
use crate::store::{Collection, RecordQuery};

/// One line of an opened project's request list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectEntry {
    Request(ArcRequest),
    /// The project references a request the store does not have.
    Unknown { id: String },
}

impl ProjectEntry {
    pub fn id(&self) -> &str {
        match self {
            ProjectEntry::Request(request) => &request.id,
            ProjectEntry::Unknown { id } => id,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ProjectsListModel {
    projects: Vec<Project>,
    requests: BTreeMap<String, ArcRequest>,
    /// Ids the store reported missing, so they are not read again.
    missing: BTreeSet<String>,
    opened: Vec<String>,
    needs_refresh: bool,
}

impl ProjectsListModel {
    pub fn new() -> Self {
        ProjectsListModel {
            needs_refresh: true,
            ..Default::default()
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    pub fn index_of(&self, project_id: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.id == project_id)
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    pub fn opened(&self) -> &[String] {
        &self.opened
    }

    pub fn is_open(&self, project_id: &str) -> bool {
        self.opened.iter().any(|p| p == project_id)
    }

    pub fn cached_request(&self, request_id: &str) -> Option<&ArcRequest> {
        self.requests.get(request_id)
    }

    /// Reads every page of projects and the requests of opened projects.
    pub fn refresh(&mut self, query: &impl RecordQuery) -> anyhow::Result<()> {
        let mut projects = vec![];
        let mut token: Option<String> = None;
        loop {
            let page = query.list_projects(token.as_deref())?;
            projects.extend(page.items);
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        projects.sort_by(compare_projects);
        self.projects = projects;
        self.opened.retain(|id| self.projects.iter().any(|p| &p.id == id));
        self.needs_refresh = false;
        self.sync_opened(query)
    }

    pub fn load_if_needed(&mut self, query: &impl RecordQuery) -> anyhow::Result<()> {
        if self.needs_refresh {
            self.refresh(query)
        } else {
            Ok(())
        }
    }

    /// Reads requests referenced by opened projects that are not cached yet.
    /// Each id is requested once.
    pub fn sync_opened(&mut self, query: &impl RecordQuery) -> anyhow::Result<()> {
        let mut wanted: Vec<String> = vec![];
        for project_id in self.opened.iter() {
            let Some(project) = self.projects.iter().find(|p| &p.id == project_id) else {
                continue;
            };
            for id in project.requests.iter() {
                if !self.requests.contains_key(id)
                    && !self.missing.contains(id)
                    && !wanted.contains(id)
                {
                    wanted.push(id.clone());
                }
            }
        }
        if wanted.is_empty() {
            return Ok(());
        }
        let found = query.read_requests(&wanted)?;
        for (id, request) in wanted.into_iter().zip(found) {
            match request {
                Some(request) => {
                    self.requests.insert(id, request);
                }
                None => {
                    debug!("project request {} is not in the store", id);
                    self.missing.insert(id);
                }
            }
        }
        Ok(())
    }

    pub fn open(&mut self, project_id: &str, query: &impl RecordQuery) -> anyhow::Result<()> {
        if self.project(project_id).is_none() || self.is_open(project_id) {
            return Ok(());
        }
        self.opened.push(project_id.to_string());
        self.sync_opened(query)
    }

    pub fn close(&mut self, project_id: &str) {
        self.opened.retain(|p| p != project_id);
    }

    pub fn toggle(&mut self, project_id: &str, query: &impl RecordQuery) -> anyhow::Result<()> {
        if self.is_open(project_id) {
            self.close(project_id);
            Ok(())
        } else {
            self.open(project_id, query)
        }
    }

    pub fn entries(&self, project_id: &str) -> Vec<ProjectEntry> {
        let Some(project) = self.project(project_id) else {
            return vec![];
        };
        project
            .requests
            .iter()
            .map(|id| match self.requests.get(id) {
                Some(request) => ProjectEntry::Request(request.clone()),
                None => ProjectEntry::Unknown { id: id.clone() },
            })
            .collect()
    }

    pub fn add_project(&self) -> MutationRequest {
        MutationRequest::CreateProject {
            name: NEW_PROJECT_NAME.to_string(),
        }
    }

    pub fn delete_project(&self, project_id: &str) -> MutationRequest {
        MutationRequest::DeleteProject {
            project_id: project_id.to_string(),
        }
    }

    /// Drops a dangling reference from the project.
    pub fn remove_unknown(&self, project_id: &str, request_id: &str) -> Option<MutationRequest> {
        let mut project = self.project(project_id)?.clone();
        if !project.remove_request(request_id) {
            return None;
        }
        Some(MutationRequest::UpdateProject { project })
    }

    fn upsert(&mut self, project: &Project) {
        match self.projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project.clone(),
            None => self.projects.push(project.clone()),
        }
        self.projects.sort_by(compare_projects);
    }

    /// Applies a store notification. Returns whether something changed.
    /// Call [`ProjectsListModel::sync_opened`] afterwards to fill new rows.
    pub fn handle_event(&mut self, event: &StoreEvent) -> bool {
        match event {
            StoreEvent::ProjectChanged { project } => {
                self.upsert(project);
                true
            }
            StoreEvent::ProjectDeleted { id, .. } => {
                self.close(id);
                let before = self.projects.len();
                self.projects.retain(|p| &p.id != id);
                before != self.projects.len()
            }
            StoreEvent::RequestChanged { request } if request.kind == RequestKind::Saved => {
                self.missing.remove(&request.id);
                let referenced = self.requests.contains_key(&request.id)
                    || self.projects.iter().any(|p| p.contains(&request.id));
                if referenced {
                    self.requests.insert(request.id.clone(), request.clone());
                }
                referenced
            }
            StoreEvent::RequestDeleted { id, kind, .. } if *kind == RequestKind::Saved => {
                self.requests.remove(id).is_some()
            }
            StoreEvent::StoreCleared { .. } => {
                let mut changed = false;
                if event.clears(Collection::Saved) {
                    self.requests.clear();
                    self.missing.clear();
                    changed = true;
                }
                if event.clears(Collection::Projects) {
                    self.projects.clear();
                    self.opened.clear();
                    self.needs_refresh = true;
                    changed = true;
                }
                changed
            }
            StoreEvent::DataImported => {
                self.missing.clear();
                self.needs_refresh = true;
                true
            }
            _ => false,
        }
    }
}

impl DropHost for ProjectsListModel {
    fn is_project_open(&self, project_id: &str) -> bool {
        self.is_open(project_id)
    }

    fn project_contains(&self, project_id: &str, request_id: &str) -> bool {
        self.project(project_id)
            .map_or(false, |p| p.contains(request_id))
            || self
                .requests
                .get(request_id)
                .map_or(false, |r| r.belongs_to(project_id))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::data::generator::DataGenerator;
    use crate::events::MailPost;
    use crate::store::memory::MemoryStore;
    use crate::store::MenuMutations;

    use super::*;

    fn store() -> MemoryStore {
        let mail_post = Rc::new(RefCell::new(MailPost::default()));
        MemoryStore::with_data(mail_post, DataGenerator::seeded(3).generate(20))
    }

    fn loaded(store: &MemoryStore) -> ProjectsListModel {
        let mut model = ProjectsListModel::new();
        model.refresh(store).unwrap();
        model
    }

    #[test]
    fn refresh_sorts_by_order_then_name() {
        let store = store();
        let model = loaded(&store);
        assert_eq!(model.projects().len(), 5);
        let names: Vec<String> = model.projects().iter().map(|p| p.name.to_lowercase()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn opening_reads_project_requests() {
        let store = store();
        let mut model = loaded(&store);
        let project = model
            .projects()
            .iter()
            .find(|p| !p.requests.is_empty())
            .unwrap()
            .clone();
        model.toggle(&project.id, &store).unwrap();
        assert!(model.is_open(&project.id));
        let entries = model.entries(&project.id);
        assert_eq!(entries.len(), project.requests.len());
        assert!(entries.iter().all(|e| matches!(e, ProjectEntry::Request(_))));
        model.toggle(&project.id, &store).unwrap();
        assert!(!model.is_open(&project.id));
    }

    #[test]
    fn dangling_reference_is_unknown_entry() {
        let mut store = store();
        let mut project = store.create_project("Broken").unwrap();
        project.requests.push("gone".to_string());
        store.update_project(project.clone()).unwrap();

        let mut model = loaded(&store);
        model.open(&project.id, &store).unwrap();
        assert_eq!(
            model.entries(&project.id),
            vec![ProjectEntry::Unknown {
                id: "gone".to_string()
            }]
        );
        match model.remove_unknown(&project.id, "gone") {
            Some(MutationRequest::UpdateProject { project }) => assert!(project.requests.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn follows_store_notifications() {
        let mail_post = Rc::new(RefCell::new(MailPost::default()));
        let mail_box = mail_post.borrow_mut().subscribe("projects");
        let mut store = MemoryStore::with_data(mail_post, DataGenerator::seeded(5).generate(10));
        let mut model = loaded(&store);

        let created = store.create_project("Aaa").unwrap();
        store.delete_project(&model.projects()[0].id.clone()).unwrap();
        for event in mail_box.borrow_mut().take_all() {
            model.handle_event(&event);
        }
        assert!(model.project(&created.id).is_some());
        assert_eq!(model.projects().len(), 5);
    }

    #[test]
    fn drop_host_answers_membership() {
        let store = store();
        let mut model = loaded(&store);
        let project = model
            .projects()
            .iter()
            .find(|p| !p.requests.is_empty())
            .unwrap()
            .clone();
        assert!(model.project_contains(&project.id, &project.requests[0]));
        assert!(!model.project_contains(&project.id, "other"));
        assert!(!model.is_project_open(&project.id));
        model.open(&project.id, &store).unwrap();
        assert!(model.is_project_open(&project.id));
    }

    #[test]
    fn clearing_projects_schedules_refresh() {
        let store = store();
        let mut model = loaded(&store);
        assert!(model.handle_event(&StoreEvent::cleared(Collection::Projects)));
        assert!(model.is_empty());
        assert!(model.needs_refresh());
        model.load_if_needed(&store).unwrap();
        assert_eq!(model.projects().len(), 5);
    }
}
