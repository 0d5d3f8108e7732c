use crate::types::BlockId;
use serde::{Deserialize, Serialize};

/// Fields shared by every block kind.
///
/// Children are never nested inside a block: the tree fetcher returns them
/// as later entries of a flat sequence, so only the `has_children` flag is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockCommon {
    pub id: BlockId,
    pub has_children: bool,
    #[serde(default)]
    pub archived: bool,
}

impl BlockCommon {
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            has_children: false,
            archived: false,
        }
    }

    pub fn with_children(mut self, has_children: bool) -> Self {
        self.has_children = has_children;
        self
    }
}

impl Default for BlockCommon {
    fn default() -> Self {
        Self::new(BlockId::new_v4())
    }
}
