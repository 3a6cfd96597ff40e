//! Null propagation for failed non-null fields.
//!
//! The engine drops a field whose resolver fails instead of nulling its
//! parent. Every execution therefore carries a [`NullAnchors`] sink: a
//! failing non-null field records the path of its nearest nullable
//! ancestor, and [`NullAnchors::apply`] writes `null` at those paths once
//! execution has finished. An empty path stands for the whole `data`.

use std::sync::{Arc, Mutex, PoisonError};

use async_graphql::{Name, PathSegment, Response, Value};

/// Message of the placeholder error handed to the engine for a failed
/// non-null field. The real error is reported separately with its path.
pub(crate) const PROPAGATED: &str = "null propagated to the nearest nullable parent";

/// Per-request list of positions to null after execution.
#[derive(Clone, Default)]
pub(crate) struct NullAnchors(Arc<Mutex<Vec<Vec<PathSegment>>>>);

impl NullAnchors {
    pub(crate) fn record(&self, anchor: Vec<PathSegment>) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(anchor);
    }

    /// Nulls every recorded position and drops the placeholder errors.
    pub(crate) fn apply(&self, response: &mut Response) {
        response.errors.retain(|err| err.message != PROPAGATED);

        let anchors = std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner));
        for anchor in anchors {
            null_at(&mut response.data, &anchor);
        }
    }
}

/// Writes `null` at `path`. Positions below an already nulled value are skipped.
fn null_at(data: &mut Value, path: &[PathSegment]) {
    let Some((last, parents)) = path.split_last() else {
        *data = Value::Null;
        return;
    };

    let mut current = data;
    for segment in parents {
        let next = match (current, segment) {
            (Value::Object(fields), PathSegment::Field(name)) => fields.get_mut(name.as_str()),
            (Value::List(items), PathSegment::Index(index)) => items.get_mut(*index),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return,
        }
    }

    match (current, last) {
        (Value::Object(fields), PathSegment::Field(name)) => {
            fields.insert(Name::new(name), Value::Null);
        }
        (Value::List(items), PathSegment::Index(index)) => {
            if let Some(item) = items.get_mut(*index) {
                *item = Value::Null;
            }
        }
        _ => {}
    }
}
