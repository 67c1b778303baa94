//! Shared test support: a scripted transport standing in for the network.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;
use unrepost_api::wire::{DeleteEnvelope, ItemListEnvelope, WireAuthor, WireItem};
use unrepost_api::{RepostTransport, TransportError};
use unrepost_core::{Cursor, ItemId, SecUid};

/// One recorded transport call with its (paused-clock) timestamp.
#[derive(Debug, Clone)]
pub struct Call {
    pub kind: CallKind,
    pub at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallKind {
    List { cursor: String, sec_uid: String },
    Delete { item_id: String },
}

/// Transport that replays scripted replies and records every call.
#[derive(Default)]
pub struct ScriptedTransport {
    pub list_replies: Mutex<VecDeque<Result<ItemListEnvelope, TransportError>>>,
    pub delete_replies: Mutex<VecDeque<Result<DeleteEnvelope, TransportError>>>,
    pub calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_list(&self, reply: Result<ItemListEnvelope, TransportError>) {
        self.list_replies
            .lock()
            .expect("lock list replies")
            .push_back(reply);
    }

    pub fn push_delete(&self, reply: Result<DeleteEnvelope, TransportError>) {
        self.delete_replies
            .lock()
            .expect("lock delete replies")
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock calls").clone()
    }

    fn record(&self, kind: CallKind) {
        self.calls.lock().expect("lock calls").push(Call {
            kind,
            at: Instant::now(),
        });
    }
}

#[async_trait]
impl RepostTransport for ScriptedTransport {
    async fn list_reposts(
        &self,
        sec_uid: &SecUid,
        cursor: &Cursor,
    ) -> Result<ItemListEnvelope, TransportError> {
        self.record(CallKind::List {
            cursor: cursor.as_str().to_string(),
            sec_uid: sec_uid.as_str().to_string(),
        });
        self.list_replies
            .lock()
            .expect("lock list replies")
            .pop_front()
            .expect("unscripted list_reposts call")
    }

    async fn remove_repost(&self, item_id: &ItemId) -> Result<DeleteEnvelope, TransportError> {
        self.record(CallKind::Delete {
            item_id: item_id.as_str().to_string(),
        });
        self.delete_replies
            .lock()
            .expect("lock delete replies")
            .pop_front()
            .expect("unscripted remove_repost call")
    }
}

/// Build a success listing envelope from `(id, handle, desc)` triples.
pub fn list_ok(items: &[(&str, &str, &str)], has_more: bool, cursor: Option<&str>) -> ItemListEnvelope {
    ItemListEnvelope {
        status_code: 0,
        item_list: items
            .iter()
            .map(|(id, handle, desc)| WireItem {
                id: (*id).to_string(),
                desc: (*desc).to_string(),
                author: WireAuthor {
                    unique_id: (*handle).to_string(),
                },
            })
            .collect(),
        has_more,
        cursor: cursor.map(str::to_string),
    }
}

/// Build a listing envelope carrying only an application status code.
pub fn list_status(code: i64) -> ItemListEnvelope {
    ItemListEnvelope {
        status_code: code,
        item_list: Vec::new(),
        has_more: false,
        cursor: None,
    }
}

/// Build a delete envelope with the given application status code.
pub fn delete_status(code: i64) -> DeleteEnvelope {
    DeleteEnvelope { status_code: code }
}

/// A page-state snapshot that resolves to `sec_uid`.
pub fn page_state(sec_uid: &str) -> serde_json::Value {
    serde_json::json!({
        "__$UNIVERSAL_DATA__": {
            "__DEFAULT_SCOPE__": {
                "webapp.app-context": {"user": {"secUid": sec_uid}}
            }
        }
    })
}
