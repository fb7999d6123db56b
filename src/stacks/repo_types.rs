use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

/// Stack entry. `index` is the stack length at push time and is never
/// renumbered, so it reads as a historical marker rather than a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub index: u64,
    pub name: String,
}

/// Stack document. `owner` is checked only when the stack is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    pub id: String,
    pub owner: String,
    pub items: Vec<Item>,
}

#[derive(Debug, FromRow)]
pub struct StackRow {
    pub id: String,
    pub owner: String,
    pub items: Json<Vec<Item>>,
}

impl From<StackRow> for Stack {
    fn from(r: StackRow) -> Self {
        Self {
            id: r.id,
            owner: r.owner,
            items: r.items.0,
        }
    }
}
