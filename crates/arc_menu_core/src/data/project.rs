use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

pub const NEW_PROJECT_NAME: &str = "New project";

#[derive(Default, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub name: String,
    pub order: i64,
    pub requests: Vec<String>,
}

impl Project {
    pub fn contains(&self, request_id: &str) -> bool {
        self.requests.iter().any(|r| r == request_id)
    }

    pub fn position(&self, request_id: &str) -> Option<usize> {
        self.requests.iter().position(|r| r == request_id)
    }

    /// Puts `request_id` at `index`, removing an earlier occurrence first.
    /// Out of range indexes append.
    pub fn insert_request(&mut self, request_id: &str, index: usize) {
        if let Some(current) = self.position(request_id) {
            self.requests.remove(current);
        }
        let index = index.min(self.requests.len());
        self.requests.insert(index, request_id.to_string());
    }

    pub fn remove_request(&mut self, request_id: &str) -> bool {
        match self.position(request_id) {
            None => false,
            Some(index) => {
                self.requests.remove(index);
                true
            }
        }
    }
}

pub fn compare_projects(a: &Project, b: &Project) -> Ordering {
    a.order
        .cmp(&b.order)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}
