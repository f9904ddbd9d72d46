//! Toast lane: the ordered sequence of active toasts.
//!
//! Entries are insertion-ordered (oldest first). The lane is plain storage;
//! the open/dismiss algorithms live in the controller, which owns the timers
//! and callback discipline around them.

use serde_json::{Map, Value};

use crate::core::props::SurfaceProps;
use crate::core::toast::{DismissCallback, ToastId, ToastKind, ToastPayload};
use crate::registry::SurfaceId;
use crate::runtime::timers::TimerId;

pub(crate) struct ToastEntry {
    pub(crate) id: ToastId,
    pub(crate) surface: SurfaceId,
    pub(crate) kind: ToastKind,
    pub(crate) message: String,
    pub(crate) extra: Map<String, Value>,
    pub(crate) on_dismissed: Option<DismissCallback>,
    pub(crate) auto_close: Option<TimerId>,
    pub(crate) visible: bool,
}

impl ToastEntry {
    pub(crate) fn new(
        id: ToastId,
        surface: SurfaceId,
        payload: ToastPayload,
        auto_close: Option<TimerId>,
    ) -> Self {
        Self {
            id,
            surface,
            kind: payload.kind,
            message: payload.message,
            extra: payload.extra,
            on_dismissed: payload.on_dismissed,
            auto_close,
            visible: true,
        }
    }

    /// Props handed to the toast component at render time.
    pub(crate) fn render_props(&self) -> SurfaceProps {
        let mut values = self.extra.clone();
        values.insert("message".into(), Value::String(self.message.clone()));
        values.insert(
            "toast_kind".into(),
            serde_json::to_value(self.kind).unwrap_or(Value::Null),
        );
        SurfaceProps::from_map(values)
    }
}

#[derive(Default)]
pub(crate) struct ToastLane {
    entries: Vec<ToastEntry>,
}

impl ToastLane {
    pub(crate) fn push(&mut self, entry: ToastEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn get_mut(&mut self, id: ToastId) -> Option<&mut ToastEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    pub(crate) fn remove(&mut self, id: ToastId) -> Option<ToastEntry> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Ids of the oldest entries in excess of `cap`, oldest first.
    pub(crate) fn overflow(&self, cap: usize) -> Vec<ToastId> {
        if self.entries.len() <= cap {
            return Vec::new();
        }
        let excess = self.entries.len() - cap;
        self.entries[..excess].iter().map(|entry| entry.id).collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ToastEntry> {
        self.entries.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
