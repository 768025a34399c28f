use crate::data::api_index::{compare_api_items, ApiIndexItem};
use crate::events::StoreEvent;
use crate::store::{Collection, RecordQuery};

/// The REST API index, always fully loaded.
#[derive(Debug, Clone)]
pub struct ApiIndexListModel {
    items: Vec<ApiIndexItem>,
    selected: Option<String>,
    needs_refresh: bool,
}

impl Default for ApiIndexListModel {
    fn default() -> Self {
        ApiIndexListModel {
            items: vec![],
            selected: None,
            needs_refresh: true,
        }
    }
}

impl ApiIndexListModel {
    pub fn items(&self) -> &[ApiIndexItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, id: &str) -> Option<&ApiIndexItem> {
        let item = self.items.iter().find(|i| i.id == id)?;
        self.selected = Some(item.id.clone());
        Some(item)
    }

    pub fn refresh(&mut self, query: &impl RecordQuery) -> anyhow::Result<()> {
        let mut items = vec![];
        let mut token: Option<String> = None;
        loop {
            let page = query.list_api_index(token.as_deref())?;
            items.extend(page.items);
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        items.sort_by(compare_api_items);
        self.items = items;
        self.needs_refresh = false;
        Ok(())
    }

    pub fn load_if_needed(&mut self, query: &impl RecordQuery) -> anyhow::Result<()> {
        if self.needs_refresh {
            self.refresh(query)
        } else {
            Ok(())
        }
    }

    pub fn handle_event(&mut self, event: &StoreEvent) -> bool {
        match event {
            StoreEvent::ApiIndexChanged { item } => {
                match self.items.iter_mut().find(|i| i.id == item.id) {
                    Some(existing) => *existing = item.clone(),
                    None => self.items.push(item.clone()),
                }
                self.items.sort_by(compare_api_items);
                true
            }
            StoreEvent::ApiIndexDeleted { id } => {
                if self.selected.as_ref() == Some(id) {
                    self.selected = None;
                }
                let before = self.items.len();
                self.items.retain(|i| &i.id != id);
                before != self.items.len()
            }
            StoreEvent::StoreCleared { .. } if event.clears(Collection::ApiIndex) => {
                self.needs_refresh = true;
                true
            }
            StoreEvent::DataImported => {
                self.needs_refresh = true;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, title: &str, order: i64) -> ApiIndexItem {
        ApiIndexItem {
            id: id.to_string(),
            title: title.to_string(),
            order,
            ..Default::default()
        }
    }

    #[test]
    fn keeps_order_then_title() {
        let mut model = ApiIndexListModel::default();
        for api in [item("c", "Zoo", 0), item("a", "Pets", 1), item("b", "Auth", 0)] {
            model.handle_event(&StoreEvent::ApiIndexChanged { item: api });
        }
        let ids: Vec<&str> = model.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        model.handle_event(&StoreEvent::ApiIndexChanged {
            item: item("a", "Pets", -1),
        });
        assert_eq!(model.items()[0].id, "a");
        assert_eq!(model.items().len(), 3);
    }

    #[test]
    fn delete_clears_selection() {
        let mut model = ApiIndexListModel::default();
        model.handle_event(&StoreEvent::ApiIndexChanged {
            item: item("a", "Pets", 0),
        });
        assert!(model.select("a").is_some());
        assert!(model.select("missing").is_none());
        assert_eq!(model.selected(), Some("a"));
        model.handle_event(&StoreEvent::ApiIndexDeleted { id: "a".to_string() });
        assert_eq!(model.selected(), None);
        assert!(model.is_empty());
    }

    #[test]
    fn clear_notifications_schedule_refresh() {
        let mut model = ApiIndexListModel {
            needs_refresh: false,
            ..Default::default()
        };
        assert!(!model.handle_event(&StoreEvent::cleared(Collection::Saved)));
        assert!(!model.needs_refresh());
        assert!(model.handle_event(&StoreEvent::cleared(Collection::ApiIndex)));
        assert!(model.needs_refresh());
    }
}
