use serde::{Deserialize, Serialize};

use crate::domain::entities::record::{Identified, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "parent_id")]
    pub parent_category_id: Option<RecordId>,
    #[serde(default)]
    pub display_order: Option<i64>,
}

impl Category {
    pub fn new(id: &str, name: &str, parent: Option<&str>) -> Self {
        Self {
            id: RecordId::from(id),
            name: name.to_string(),
            description: None,
            parent_category_id: parent.map(RecordId::from),
            display_order: None,
        }
    }
}

impl Identified for Category {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

/// A category with its computed children, ordered by display order then name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn id(&self) -> &RecordId {
        &self.category.id
    }

    /// Number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(CategoryNode::node_count)
            .sum::<usize>()
    }
}
