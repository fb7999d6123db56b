use serde::{Deserialize, Serialize};

use crate::{
    stacks::repo_types::{Item, Stack},
    users::dto::is_valid_name,
};

#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    #[serde(default)]
    pub name: String,
}

impl ItemRequest {
    pub fn is_valid(&self) -> bool {
        is_valid_name(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResponse {
    pub index: u64,
    pub name: String,
}

impl From<Item> for ItemResponse {
    fn from(i: Item) -> Self {
        Self { index: i.index, name: i.name }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackResponse {
    pub id: String,
    pub owner: String,
    pub items: Vec<Item>,
}

impl From<Stack> for StackResponse {
    fn from(s: Stack) -> Self {
        Self {
            id: s.id,
            owner: s.owner,
            items: s.items,
        }
    }
}
