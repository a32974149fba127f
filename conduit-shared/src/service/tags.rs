/// Tag listing

use serde::Serialize;

use crate::error::DomainResult;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagList {
    pub tags: Vec<String>,
}

/// Every tag ever attached to an article, oldest first
pub async fn list_tags(store: &dyn Store) -> DomainResult<TagList> {
    Ok(TagList {
        tags: store.list_tags().await?,
    })
}
