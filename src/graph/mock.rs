//! A recording [`AdsApi`] for tests.
//!
//! Every call is recorded; responses are served from a queue and fall back
//! to plausible defaults (`{"id": "mock-N"}` for creates, an empty `data`
//! array for lists, `{"success": true}` for updates and deletes).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{AdsApi, Edge, ExternalParams, GraphResult};

/// One invocation seen by [`MockAdsApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// `create(parent, edge, params)`
    Create {
        /// Parent node id.
        parent: String,
        /// Target edge.
        edge: Edge,
        /// Parameters sent.
        params: ExternalParams,
    },
    /// `list(parent, edge, fields, params)`
    List {
        /// Parent node id.
        parent: String,
        /// Target edge.
        edge: Edge,
        /// Requested fields.
        fields: Vec<String>,
        /// Parameters sent.
        params: ExternalParams,
    },
    /// `read(id, fields)`
    Read {
        /// Node id.
        id: String,
        /// Requested fields.
        fields: Vec<String>,
    },
    /// `update(id, params)`
    Update {
        /// Node id.
        id: String,
        /// Parameters sent.
        params: ExternalParams,
    },
    /// `delete(id)`
    Delete {
        /// Node id.
        id: String,
    },
}

/// Spy implementation of [`AdsApi`].
#[derive(Default, Clone)]
pub struct MockAdsApi {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    responses: Arc<Mutex<VecDeque<GraphResult<Value>>>>,
}

impl MockAdsApi {
    /// Creates a mock with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that answers with `responses` in order.
    #[must_use]
    pub fn with_responses(responses: Vec<GraphResult<Value>>) -> Self {
        let mock = Self::new();
        lock(&mock.responses).extend(responses);
        mock
    }

    /// Returns a snapshot of all recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn record(&self, call: RecordedCall, fallback: impl FnOnce(usize) -> Value) -> GraphResult<Value> {
        let index = {
            let mut calls = lock(&self.calls);
            calls.push(call);
            calls.len()
        };
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Ok(fallback(index)))
    }
}

/// Locks a mutex, recovering the data if a panicking test poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| (*f).to_string()).collect()
}

#[async_trait]
impl AdsApi for MockAdsApi {
    async fn create(&self, parent: &str, edge: Edge, params: &ExternalParams) -> GraphResult<Value> {
        self.record(
            RecordedCall::Create {
                parent: parent.to_string(),
                edge,
                params: params.clone(),
            },
            |n| json!({ "id": format!("mock-{n}") }),
        )
    }

    async fn list(
        &self,
        parent: &str,
        edge: Edge,
        fields: &[&str],
        params: &ExternalParams,
    ) -> GraphResult<Value> {
        self.record(
            RecordedCall::List {
                parent: parent.to_string(),
                edge,
                fields: owned(fields),
                params: params.clone(),
            },
            |_| json!({ "data": [] }),
        )
    }

    async fn read(&self, id: &str, fields: &[&str]) -> GraphResult<Value> {
        let node = id.to_string();
        self.record(
            RecordedCall::Read {
                id: id.to_string(),
                fields: owned(fields),
            },
            move |_| json!({ "id": node }),
        )
    }

    async fn update(&self, id: &str, params: &ExternalParams) -> GraphResult<Value> {
        self.record(
            RecordedCall::Update {
                id: id.to_string(),
                params: params.clone(),
            },
            |_| json!({ "success": true }),
        )
    }

    async fn delete(&self, id: &str) -> GraphResult<Value> {
        self.record(
            RecordedCall::Delete { id: id.to_string() },
            |_| json!({ "success": true }),
        )
    }
}
