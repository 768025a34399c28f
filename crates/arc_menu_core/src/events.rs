use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use log::debug;

use crate::data::api_index::ApiIndexItem;
use crate::data::project::Project;
use crate::data::request::{ArcRequest, RequestKind};
use crate::store::Collection;

pub const ALL_STORES: &str = "all";

/// Change notifications published by the datastore.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    RequestChanged {
        request: ArcRequest,
    },
    RequestDeleted {
        id: String,
        rev: Option<String>,
        kind: RequestKind,
    },
    ProjectChanged {
        project: Project,
    },
    ProjectDeleted {
        id: String,
        rev: Option<String>,
    },
    ApiIndexChanged {
        item: ApiIndexItem,
    },
    ApiIndexDeleted {
        id: String,
    },
    StoreCleared {
        stores: Vec<String>,
    },
    DataImported,
}

impl StoreEvent {
    pub fn cleared(collection: Collection) -> Self {
        StoreEvent::StoreCleared {
            stores: vec![collection.to_string()],
        }
    }

    pub fn cleared_all() -> Self {
        StoreEvent::StoreCleared {
            stores: vec![ALL_STORES.to_string()],
        }
    }

    /// True when this is a clear notification that covers `collection`.
    pub fn clears(&self, collection: Collection) -> bool {
        match self {
            StoreEvent::StoreCleared { stores } => stores
                .iter()
                .any(|s| s == ALL_STORES || s.as_str() == collection.as_ref()),
            _ => false,
        }
    }
}

#[derive(Default, Debug)]
pub struct MailBox {
    mails: VecDeque<StoreEvent>,
}

impl MailBox {
    pub fn push(&mut self, mail: StoreEvent) {
        self.mails.push_back(mail)
    }

    pub fn take_all(&mut self) -> Vec<StoreEvent> {
        self.mails.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.mails.is_empty()
    }
}

/// Delivers store notifications to the mailboxes the host registered.
#[derive(Default, Debug)]
pub struct MailPost {
    nodes: BTreeMap<String, Rc<RefCell<MailBox>>>,
}

impl MailPost {
    pub fn register(&mut self, name: impl Into<String>, mail_box: Rc<RefCell<MailBox>>) {
        self.nodes.insert(name.into(), mail_box);
    }

    /// Registers a fresh mailbox under `name` and hands it back.
    pub fn subscribe(&mut self, name: impl Into<String>) -> Rc<RefCell<MailBox>> {
        let mail_box = Rc::new(RefCell::new(MailBox::default()));
        self.register(name, mail_box.clone());
        mail_box
    }

    pub fn unregister(&mut self, name: &str) {
        self.nodes.remove(name);
    }

    pub fn send(&self, who: &str, mail: StoreEvent) {
        if let Some(mail_box) = self.nodes.get(who) {
            mail_box.borrow_mut().push(mail)
        }
    }

    pub fn broadcast(&self, mail: StoreEvent) {
        debug!("broadcast {:?} to {} mailboxes", mail, self.nodes.len());
        for mail_box in self.nodes.values() {
            mail_box.borrow_mut().push(mail.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_reaches_every_subscriber() {
        let mut post = MailPost::default();
        let saved = post.subscribe("saved-menu");
        let projects = post.subscribe("projects-menu");
        post.broadcast(StoreEvent::DataImported);
        assert_eq!(saved.borrow_mut().take_all(), vec![StoreEvent::DataImported]);
        assert_eq!(projects.borrow_mut().take_all(), vec![StoreEvent::DataImported]);
        assert!(saved.borrow().is_empty());
    }

    #[test]
    fn send_targets_one_mailbox() {
        let mut post = MailPost::default();
        let saved = post.subscribe("saved-menu");
        let history = post.subscribe("history-menu");
        post.send("saved-menu", StoreEvent::cleared_all());
        post.send("unknown", StoreEvent::DataImported);
        assert_eq!(saved.borrow().mails.len(), 1);
        assert!(history.borrow().is_empty());
    }

    #[test]
    fn clear_matches_named_store_or_all() {
        let event = StoreEvent::cleared(Collection::ApiIndex);
        assert!(event.clears(Collection::ApiIndex));
        assert!(!event.clears(Collection::Saved));
        assert!(StoreEvent::cleared_all().clears(Collection::History));
        assert!(!StoreEvent::DataImported.clears(Collection::History));
    }
}
