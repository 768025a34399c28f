use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{debug, error};

use crate::data::request::{group_history_by_day, ArcRequest, DateGroupHistoryList, RequestKind};
use crate::events::StoreEvent;
use crate::lists::LOAD_MORE_THRESHOLD;
use crate::store::{Collection, RecordQuery};

/// Paged list of history or saved requests.
#[derive(Debug, Clone)]
pub struct RequestListModel {
    kind: RequestKind,
    requests: Vec<ArcRequest>,
    page_token: Option<String>,
    exhausted: bool,
    needs_refresh: bool,
}

impl RequestListModel {
    pub fn new(kind: RequestKind) -> Self {
        RequestListModel {
            kind,
            requests: vec![],
            page_token: None,
            exhausted: false,
            needs_refresh: true,
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn requests(&self) -> &[ArcRequest] {
        &self.requests
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    pub fn get(&self, id: &str) -> Option<&ArcRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    /// History grouped by day; iterate in reverse for newest first.
    pub fn grouped(&self) -> BTreeMap<NaiveDate, DateGroupHistoryList> {
        group_history_by_day(self.requests.iter())
    }

    pub fn reset(&mut self) {
        self.requests.clear();
        self.page_token = None;
        self.exhausted = false;
        self.needs_refresh = true;
    }

    /// Loads the next page. Returns how many new entries were added.
    ///
    /// A failed query leaves a pending refresh in place so the next
    /// `load_if_needed` tries again.
    pub fn load_next(&mut self, query: &impl RecordQuery) -> anyhow::Result<usize> {
        if self.exhausted {
            return Ok(0);
        }
        let page = query
            .list_requests(self.kind, self.page_token.as_deref())
            .map_err(|e| {
                error!("{} list query failed: {:#}", self.kind, e);
                e
            })?;
        self.needs_refresh = false;
        let mut added = 0;
        for request in page.items {
            if self.get(&request.id).is_none() {
                self.requests.push(request);
                added += 1;
            }
        }
        self.exhausted = page.next_page_token.is_none();
        self.page_token = page.next_page_token;
        debug!("{} list loaded {} entries", self.kind, added);
        Ok(added)
    }

    pub fn refresh(&mut self, query: &impl RecordQuery) -> anyhow::Result<usize> {
        self.reset();
        self.load_next(query)
    }

    /// Loads the first page after a reset, if one is due.
    pub fn load_if_needed(&mut self, query: &impl RecordQuery) -> anyhow::Result<usize> {
        if self.needs_refresh {
            self.load_next(query)
        } else {
            Ok(0)
        }
    }

    /// `scroll_delta` is what remains to scroll below the viewport.
    pub fn should_load_more(&self, scroll_delta: f32) -> bool {
        scroll_delta < LOAD_MORE_THRESHOLD && !self.exhausted
    }

    fn insert_sorted(&mut self, request: ArcRequest) {
        let position = match self.kind {
            RequestKind::History => self
                .requests
                .iter()
                .position(|r| r.created < request.created),
            RequestKind::Saved => {
                let name = request.name.to_lowercase();
                self.requests
                    .iter()
                    .position(|r| r.name.to_lowercase() > name)
            }
        };
        match position {
            Some(index) => self.requests.insert(index, request),
            None => self.requests.push(request),
        }
    }

    /// Applies a store notification. Returns whether the list changed.
    pub fn handle_event(&mut self, event: &StoreEvent) -> bool {
        match event {
            StoreEvent::RequestChanged { request } if request.kind == self.kind => {
                match self.requests.iter().position(|r| r.id == request.id) {
                    Some(index) if self.kind == RequestKind::History => {
                        self.requests[index] = request.clone();
                    }
                    Some(index) => {
                        self.requests.remove(index);
                        self.insert_sorted(request.clone());
                    }
                    None => self.insert_sorted(request.clone()),
                }
                true
            }
            StoreEvent::RequestDeleted { id, kind, .. } if *kind == self.kind => {
                let before = self.requests.len();
                self.requests.retain(|r| &r.id != id);
                before != self.requests.len()
            }
            StoreEvent::StoreCleared { .. } if event.clears(Collection::from(self.kind)) => {
                self.reset();
                true
            }
            StoreEvent::DataImported => {
                self.reset();
                true
            }
            _ => false,
        }
    }
}
