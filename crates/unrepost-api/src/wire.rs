//! Wire envelopes for the platform's internal API and response
//! normalization into the stable item shape.

use serde::Deserialize;
use std::collections::HashSet;
use unrepost_core::{Cursor, ItemId, PageResult, RepostItem};

/// Application status code for success.
pub const STATUS_OK: i64 = 0;

/// Application status code for a transiently unavailable server.
pub const STATUS_SERVER_UNAVAILABLE: i64 = 4;

/// Response envelope of the repost listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemListEnvelope {
    pub status_code: i64,
    #[serde(rename = "itemList", default)]
    pub item_list: Vec<WireItem>,
    #[serde(rename = "hasMore", default)]
    pub has_more: bool,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// One raw item as returned by the listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WireItem {
    pub id: String,
    #[serde(default)]
    pub desc: String,
    pub author: WireAuthor,
}

/// Author block of a raw item.
#[derive(Debug, Clone, Deserialize)]
pub struct WireAuthor {
    #[serde(rename = "uniqueId")]
    pub unique_id: String,
}

/// Response envelope of the delete endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteEnvelope {
    pub status_code: i64,
}

/// Normalize a successful listing envelope into a [`PageResult`].
///
/// Author handles are `@`-prefixed and the canonical URL is built from the
/// handle and the item id. Items with malformed ids, and duplicates of an id
/// already seen in the page, are dropped with a warning; the remaining items
/// keep the order the API returned them in. The next cursor is carried over
/// only when the API reported more pages.
#[must_use]
pub fn normalize_page(envelope: ItemListEnvelope, base_url: &str) -> PageResult {
    let mut seen: HashSet<String> = HashSet::new();
    let mut items = Vec::with_capacity(envelope.item_list.len());

    for raw in envelope.item_list {
        let id = match ItemId::new(&raw.id) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(id = %raw.id, error = %e, "dropping item with malformed id");
                continue;
            }
        };
        if !seen.insert(raw.id.clone()) {
            tracing::warn!(id = %raw.id, "dropping duplicate item id within page");
            continue;
        }

        let canonical_url = format!("{base_url}/@{}/video/{}", raw.author.unique_id, raw.id);
        items.push(RepostItem {
            id,
            author_handle: format!("@{}", raw.author.unique_id),
            description: raw.desc,
            canonical_url,
        });
    }

    let next_cursor = if envelope.has_more {
        envelope.cursor.map(Cursor::from_response)
    } else {
        None
    };

    PageResult {
        items,
        has_more: envelope.has_more,
        next_cursor,
    }
}
