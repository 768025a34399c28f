use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiIndexItem {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub title: String,
    pub order: i64,
    pub latest: String,
    pub versions: Vec<String>,
}

pub fn compare_api_items(a: &ApiIndexItem, b: &ApiIndexItem) -> Ordering {
    a.order.cmp(&b.order).then_with(|| a.title.cmp(&b.title))
}
