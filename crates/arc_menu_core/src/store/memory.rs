use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{anyhow, bail};
use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::data::api_index::ApiIndexItem;
use crate::data::generator::GeneratedData;
use crate::data::project::{compare_projects, Project};
use crate::data::request::{prepare_drop_request, ArcRequest, RequestKind};
use crate::dnd::effect::DropEffect;
use crate::events::{MailPost, StoreEvent};
use crate::store::{paginate, Collection, MenuMutations, Page, RecordQuery, RequestOrigin};

/// Datastore kept in memory. Every write is announced on the mail post the
/// same way a persistent model would announce it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    mail_post: Rc<RefCell<MailPost>>,
    history: BTreeMap<String, ArcRequest>,
    saved: BTreeMap<String, ArcRequest>,
    projects: BTreeMap<String, Project>,
    apis: BTreeMap<String, ApiIndexItem>,
}

fn next_rev(rev: &Option<String>) -> Option<String> {
    let generation = rev
        .as_deref()
        .and_then(|r| r.split('-').next())
        .and_then(|n| n.parse::<u64>().ok())
        .unwrap_or(0);
    let suffix = Uuid::new_v4().simple().to_string();
    Some(format!("{}-{}", generation + 1, &suffix[..8]))
}

/// `new_index` is a slot in the list as it was before the item left it.
fn slot_after_removal(current: usize, new_index: usize) -> usize {
    if new_index > current {
        new_index - 1
    } else {
        new_index
    }
}

/// Slot for `request_id` in `project` given a drop slot counted before any
/// earlier occurrence is taken out. No slot appends.
fn insertion_slot(project: &Project, request_id: &str, index: Option<usize>) -> usize {
    match (index, project.position(request_id)) {
        (None, _) => project.requests.len(),
        (Some(index), Some(current)) => slot_after_removal(current, index),
        (Some(index), None) => index,
    }
}

impl MemoryStore {
    pub fn new(mail_post: Rc<RefCell<MailPost>>) -> Self {
        MemoryStore {
            mail_post,
            ..Default::default()
        }
    }

    pub fn with_data(mail_post: Rc<RefCell<MailPost>>, data: GeneratedData) -> Self {
        let mut store = MemoryStore::new(mail_post);
        store.load(data);
        store
    }

    fn load(&mut self, data: GeneratedData) {
        for request in data.history {
            self.history.insert(request.id.clone(), request);
        }
        for request in data.saved {
            self.saved.insert(request.id.clone(), request);
        }
        for project in data.projects {
            self.projects.insert(project.id.clone(), project);
        }
        for api in data.apis {
            self.apis.insert(api.id.clone(), api);
        }
    }

    fn publish(&self, event: StoreEvent) {
        self.mail_post.borrow().broadcast(event);
    }

    fn requests(&self, kind: RequestKind) -> &BTreeMap<String, ArcRequest> {
        match kind {
            RequestKind::History => &self.history,
            RequestKind::Saved => &self.saved,
        }
    }

    fn requests_mut(&mut self, kind: RequestKind) -> &mut BTreeMap<String, ArcRequest> {
        match kind {
            RequestKind::History => &mut self.history,
            RequestKind::Saved => &mut self.saved,
        }
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.get(project_id)
    }

    pub fn request(&self, kind: RequestKind, id: &str) -> Option<&ArcRequest> {
        self.requests(kind).get(id)
    }

    fn put_request(&mut self, mut request: ArcRequest) -> ArcRequest {
        request.rev = next_rev(&request.rev);
        request.updated = Utc::now();
        self.requests_mut(request.kind)
            .insert(request.id.clone(), request.clone());
        self.publish(StoreEvent::RequestChanged {
            request: request.clone(),
        });
        request
    }

    fn put_project(&mut self, mut project: Project) -> Project {
        project.rev = next_rev(&project.rev);
        self.projects.insert(project.id.clone(), project.clone());
        self.publish(StoreEvent::ProjectChanged {
            project: project.clone(),
        });
        project
    }

    fn remove_request(&mut self, kind: RequestKind, id: &str) {
        if let Some(removed) = self.requests_mut(kind).remove(id) {
            self.publish(StoreEvent::RequestDeleted {
                id: removed.id,
                rev: removed.rev,
                kind,
            });
        }
    }

    /// Records a new history entry.
    pub fn record_history(&mut self, mut request: ArcRequest) -> ArcRequest {
        request.kind = RequestKind::History;
        if request.id.is_empty() {
            request.id = Uuid::new_v4().to_string();
        }
        request.created = Utc::now();
        self.put_request(request)
    }

    pub fn delete_request(&mut self, kind: RequestKind, id: &str) -> anyhow::Result<()> {
        if self.requests(kind).get(id).is_none() {
            bail!("Request {} not found", id);
        }
        self.remove_request(kind, id);
        Ok(())
    }

    pub fn put_api(&mut self, mut item: ApiIndexItem) -> ApiIndexItem {
        item.rev = next_rev(&item.rev);
        self.apis.insert(item.id.clone(), item.clone());
        self.publish(StoreEvent::ApiIndexChanged { item: item.clone() });
        item
    }

    pub fn delete_api(&mut self, id: &str) -> anyhow::Result<()> {
        self.apis
            .remove(id)
            .ok_or_else(|| anyhow!("API {} not found", id))?;
        self.publish(StoreEvent::ApiIndexDeleted { id: id.to_string() });
        Ok(())
    }

    /// Drops the content of one collection, or of all of them.
    pub fn clear(&mut self, collection: Option<Collection>) {
        match collection {
            None => {
                self.history.clear();
                self.saved.clear();
                self.projects.clear();
                self.apis.clear();
                self.publish(StoreEvent::cleared_all());
            }
            Some(collection) => {
                match collection {
                    Collection::History => self.history.clear(),
                    Collection::Saved => self.saved.clear(),
                    Collection::Projects => self.projects.clear(),
                    Collection::ApiIndex => self.apis.clear(),
                }
                self.publish(StoreEvent::cleared(collection));
            }
        }
    }

    pub fn import(&mut self, data: GeneratedData) {
        self.load(data);
        self.publish(StoreEvent::DataImported);
    }

    fn sorted_projects(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self.projects.values().cloned().collect();
        projects.sort_by(compare_projects);
        projects
    }

    fn project_or_err(&self, project_id: &str) -> anyhow::Result<Project> {
        self.projects
            .get(project_id)
            .cloned()
            .ok_or_else(|| anyhow!("Project {} not found", project_id))
    }

    fn saved_or_err(&self, request_id: &str) -> anyhow::Result<ArcRequest> {
        self.saved
            .get(request_id)
            .cloned()
            .ok_or_else(|| anyhow!("Request {} not found", request_id))
    }
}

impl RecordQuery for MemoryStore {
    fn list_requests(
        &self,
        kind: RequestKind,
        page_token: Option<&str>,
    ) -> anyhow::Result<Page<ArcRequest>> {
        let items: Vec<ArcRequest> = self.requests(kind).values().cloned().collect();
        match kind {
            RequestKind::History => paginate(items, page_token, |r| {
                (-r.created.timestamp_micros(), r.id.clone())
            }),
            RequestKind::Saved => paginate(items, page_token, |r| {
                (r.name.to_lowercase(), r.id.clone())
            }),
        }
    }

    fn list_projects(&self, page_token: Option<&str>) -> anyhow::Result<Page<Project>> {
        let projects: Vec<Project> = self.projects.values().cloned().collect();
        paginate(projects, page_token, |p| {
            (p.order, p.name.to_lowercase(), p.id.clone())
        })
    }

    fn list_api_index(&self, page_token: Option<&str>) -> anyhow::Result<Page<ApiIndexItem>> {
        let items: Vec<ApiIndexItem> = self.apis.values().cloned().collect();
        paginate(items, page_token, |i| (i.order, i.title.clone(), i.id.clone()))
    }

    fn read_requests(&self, ids: &[String]) -> anyhow::Result<Vec<Option<ArcRequest>>> {
        Ok(ids.iter().map(|id| self.saved.get(id).cloned()).collect())
    }
}

impl MenuMutations for MemoryStore {
    fn add_request_to_project(
        &mut self,
        project_id: &str,
        request_id: &str,
        origin: RequestOrigin,
        index: Option<usize>,
        effect: DropEffect,
    ) -> anyhow::Result<()> {
        let mut project = self.project_or_err(project_id)?;
        let mut request = match origin {
            RequestOrigin::History { history_id } => {
                let history = self
                    .history
                    .get(&history_id)
                    .ok_or_else(|| anyhow!("History entry {} not found", history_id))?;
                let mut copy = prepare_drop_request(history);
                copy.id = request_id.to_string();
                copy.kind = RequestKind::Saved;
                copy.projects = vec![];
                copy.created = Utc::now();
                copy
            }
            RequestOrigin::Saved => self.saved_or_err(request_id)?,
        };
        if effect == DropEffect::Move {
            let owners: Vec<String> = request
                .projects
                .iter()
                .filter(|p| p.as_str() != project_id)
                .cloned()
                .collect();
            for owner in owners {
                if let Some(mut other) = self.projects.get(&owner).cloned() {
                    if other.remove_request(request_id) {
                        self.put_project(other);
                    }
                }
            }
            request.projects.retain(|p| p == project_id);
        }
        if !request.belongs_to(project_id) {
            request.projects.push(project_id.to_string());
        }
        let index = insertion_slot(&project, request_id, index);
        project.insert_request(request_id, index);
        self.put_request(request);
        self.put_project(project);
        info!("request {} added to project {}", request_id, project_id);
        Ok(())
    }

    fn move_request_between_projects(
        &mut self,
        from_project_id: &str,
        to_project_id: &str,
        request_id: &str,
        index: Option<usize>,
    ) -> anyhow::Result<()> {
        let mut to = self.project_or_err(to_project_id)?;
        let mut request = self.saved_or_err(request_id)?;
        if let Some(mut from) = self.projects.get(from_project_id).cloned() {
            if from.remove_request(request_id) {
                self.put_project(from);
            }
        }
        request.projects.retain(|p| p != from_project_id);
        if !request.belongs_to(to_project_id) {
            request.projects.push(to_project_id.to_string());
        }
        let index = insertion_slot(&to, request_id, index);
        to.insert_request(request_id, index);
        self.put_request(request);
        self.put_project(to);
        Ok(())
    }

    fn reorder_project_requests(
        &mut self,
        project_id: &str,
        request_id: &str,
        new_index: usize,
    ) -> anyhow::Result<()> {
        let mut project = self.project_or_err(project_id)?;
        let Some(current) = project.position(request_id) else {
            bail!("Request {} is not in project {}", request_id, project_id);
        };
        project.insert_request(request_id, slot_after_removal(current, new_index));
        self.put_project(project);
        Ok(())
    }

    fn reorder_project(&mut self, project_id: &str, new_index: usize) -> anyhow::Result<()> {
        let mut projects = self.sorted_projects();
        let current = projects
            .iter()
            .position(|p| p.id == project_id)
            .ok_or_else(|| anyhow!("Project {} not found", project_id))?;
        let moved = projects.remove(current);
        let new_index = slot_after_removal(current, new_index).min(projects.len());
        projects.insert(new_index, moved);
        for (order, mut project) in projects.into_iter().enumerate() {
            let order = order as i64;
            if project.order != order {
                project.order = order;
                self.put_project(project);
            }
        }
        Ok(())
    }

    fn create_project(&mut self, name: &str) -> anyhow::Result<Project> {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            rev: None,
            name: name.to_string(),
            order: self.projects.len() as i64,
            requests: vec![],
        };
        Ok(self.put_project(project))
    }

    fn update_project(&mut self, mut project: Project) -> anyhow::Result<Project> {
        if project.id.is_empty() {
            project.id = Uuid::new_v4().to_string();
            project.order = self.projects.len() as i64;
        }
        Ok(self.put_project(project))
    }

    /// Requests that only live in this project go with it; requests shared
    /// with other projects just lose the reference.
    fn delete_project(&mut self, project_id: &str) -> anyhow::Result<()> {
        let project = self.project_or_err(project_id)?;
        for request_id in project.requests.iter() {
            let Some(mut request) = self.saved.get(request_id).cloned() else {
                continue;
            };
            if !request.belongs_to(project_id) {
                continue;
            }
            if request.projects.len() > 1 {
                request.projects.retain(|p| p != project_id);
                self.put_request(request);
            } else {
                self.remove_request(RequestKind::Saved, request_id);
            }
        }
        let removed = self.projects.remove(project_id);
        self.publish(StoreEvent::ProjectDeleted {
            id: project_id.to_string(),
            rev: removed.and_then(|p| p.rev),
        });
        Ok(())
    }

    fn save_request(&mut self, mut request: ArcRequest) -> anyhow::Result<ArcRequest> {
        request.kind = RequestKind::Saved;
        if request.id.is_empty() {
            request.id = Uuid::new_v4().to_string();
        }
        Ok(self.put_request(request))
    }
}

#[cfg(test)]
mod tests {
    use crate::data::generator::DataGenerator;
    use crate::events::MailBox;

    use super::*;

    fn store() -> (MemoryStore, Rc<RefCell<MailBox>>) {
        let mail_post = Rc::new(RefCell::new(MailPost::default()));
        let mail_box = mail_post.borrow_mut().subscribe("test");
        let data = DataGenerator::seeded(7).generate(30);
        (MemoryStore::with_data(mail_post, data), mail_box)
    }

    fn first_project(store: &MemoryStore) -> Project {
        store.list_projects(None).unwrap().items[0].clone()
    }

    #[test]
    fn pages_until_exhausted() {
        let (store, _) = store();
        let first = store.list_requests(RequestKind::History, None).unwrap();
        assert_eq!(first.items.len(), 25);
        let second = store
            .list_requests(RequestKind::History, first.next_page_token.as_deref())
            .unwrap();
        assert_eq!(second.items.len(), 5);
        assert_eq!(second.next_page_token, None);
        assert!(first.items[0].created >= first.items[1].created);
    }

    #[test]
    fn history_copy_gets_requested_id() {
        let (mut store, mail_box) = store();
        let project = first_project(&store);
        let history = store.list_requests(RequestKind::History, None).unwrap().items[0].clone();
        store
            .add_request_to_project(
                &project.id,
                "fresh-id",
                RequestOrigin::History {
                    history_id: history.id.clone(),
                },
                Some(0),
                DropEffect::Copy,
            )
            .unwrap();
        let saved = store.request(RequestKind::Saved, "fresh-id").unwrap();
        assert_eq!(saved.url, history.url);
        assert_eq!(saved.projects, vec![project.id.clone()]);
        assert!(store.request(RequestKind::History, &history.id).is_some());
        assert_eq!(store.project(&project.id).unwrap().requests[0], "fresh-id");
        assert_eq!(mail_box.borrow_mut().take_all().len(), 2);
    }

    #[test]
    fn move_effect_leaves_other_projects() {
        let (mut store, _) = store();
        let projects = store.list_projects(None).unwrap().items;
        let source = projects.iter().find(|p| !p.requests.is_empty()).unwrap().clone();
        let target = projects.iter().find(|p| p.id != source.id).unwrap().clone();
        let request_id = source.requests[0].clone();
        store
            .add_request_to_project(&target.id, &request_id, RequestOrigin::Saved, None, DropEffect::Move)
            .unwrap();
        assert!(!store.project(&source.id).unwrap().contains(&request_id));
        assert!(store.project(&target.id).unwrap().contains(&request_id));
        let request = store.request(RequestKind::Saved, &request_id).unwrap();
        assert_eq!(request.projects, vec![target.id.clone()]);
    }

    #[test]
    fn unknown_request_is_rejected() {
        let (mut store, _) = store();
        let project = first_project(&store);
        let result = store.add_request_to_project(
            &project.id,
            "missing",
            RequestOrigin::Saved,
            None,
            DropEffect::Copy,
        );
        assert!(result.is_err());
    }

    #[test]
    fn delete_project_removes_owned_requests() {
        let (mut store, _) = store();
        let projects = store.list_projects(None).unwrap().items;
        let doomed = projects.iter().find(|p| p.requests.len() >= 2).unwrap().clone();
        let other = projects.iter().find(|p| p.id != doomed.id).unwrap().clone();
        let shared = doomed.requests[0].clone();
        let owned = doomed.requests[1].clone();
        store
            .add_request_to_project(&other.id, &shared, RequestOrigin::Saved, None, DropEffect::Copy)
            .unwrap();

        store.delete_project(&doomed.id).unwrap();

        assert!(store.project(&doomed.id).is_none());
        assert!(store.request(RequestKind::Saved, &owned).is_none());
        let kept = store.request(RequestKind::Saved, &shared).unwrap();
        assert_eq!(kept.projects, vec![other.id.clone()]);
    }

    #[test]
    fn reorder_project_rewrites_order() {
        let (mut store, _) = store();
        let last = store.list_projects(None).unwrap().items.last().unwrap().clone();
        store.reorder_project(&last.id, 0).unwrap();
        let projects = store.list_projects(None).unwrap().items;
        assert_eq!(projects[0].id, last.id);
        let orders: Vec<i64> = projects.iter().map(|p| p.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn reorder_uses_slot_before_removal() {
        let (mut store, _) = store();
        let project = store.create_project("Ordered").unwrap();
        for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
            let mut request = DataGenerator::seeded(i as u64).saved_request(None);
            request.id = id.to_string();
            store.save_request(request).unwrap();
            store
                .add_request_to_project(&project.id, id, RequestOrigin::Saved, None, DropEffect::Copy)
                .unwrap();
        }
        // "a" dropped on the marker above "d"
        store.reorder_project_requests(&project.id, "a", 3).unwrap();
        assert_eq!(store.project(&project.id).unwrap().requests, vec!["b", "c", "a", "d"]);
        store.reorder_project_requests(&project.id, "d", 0).unwrap();
        assert_eq!(store.project(&project.id).unwrap().requests, vec!["d", "b", "c", "a"]);
    }

    fn project_with(store: &mut MemoryStore, name: &str, ids: &[&str]) -> Project {
        let project = store.create_project(name).unwrap();
        for (i, id) in ids.iter().enumerate() {
            if store.request(RequestKind::Saved, id).is_none() {
                let mut request = DataGenerator::seeded(i as u64).saved_request(None);
                request.id = id.to_string();
                store.save_request(request).unwrap();
            }
            store
                .add_request_to_project(&project.id, id, RequestOrigin::Saved, None, DropEffect::Copy)
                .unwrap();
        }
        store.project(&project.id).unwrap().clone()
    }

    #[test]
    fn move_into_project_already_listing_request_counts_slot_before_removal() {
        let (mut store, _) = store();
        let from = project_with(&mut store, "From", &["r"]);
        let to = project_with(&mut store, "To", &["x", "r", "y", "z"]);
        // marker between "y" and "z"
        store
            .move_request_between_projects(&from.id, &to.id, "r", Some(3))
            .unwrap();
        assert_eq!(store.project(&to.id).unwrap().requests, vec!["x", "y", "r", "z"]);
        assert!(!store.project(&from.id).unwrap().contains("r"));
    }

    #[test]
    fn add_to_project_already_listing_request_counts_slot_before_removal() {
        let (mut store, _) = store();
        let project = project_with(&mut store, "Listed", &["x", "r", "y", "z"]);
        store
            .add_request_to_project(&project.id, "r", RequestOrigin::Saved, Some(3), DropEffect::Copy)
            .unwrap();
        assert_eq!(store.project(&project.id).unwrap().requests, vec!["x", "y", "r", "z"]);
        store
            .add_request_to_project(&project.id, "z", RequestOrigin::Saved, Some(0), DropEffect::Copy)
            .unwrap();
        assert_eq!(store.project(&project.id).unwrap().requests, vec!["z", "x", "y", "r"]);
    }

    #[test]
    fn malformed_page_token_is_rejected() {
        let (store, _) = store();
        assert!(store.list_requests(RequestKind::Saved, Some("25")).is_err());
        assert!(store.list_projects(Some("not json")).is_err());
    }

    #[test]
    fn revisions_increase() {
        let (mut store, _) = store();
        let project = store.create_project("New project").unwrap();
        assert!(project.rev.as_deref().unwrap().starts_with("1-"));
        let project = store.update_project(project).unwrap();
        assert!(project.rev.as_deref().unwrap().starts_with("2-"));
    }
}
