//! Toast identity and payload types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::core::props::SurfaceProps;

/// Stable identity of a single enqueued toast.
///
/// Toast identity is per enqueue, not per surface: opening the same toast
/// surface twice yields two entries with distinct ids.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct ToastId(Uuid);

impl ToastId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

/// Severity class of a toast.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Info,
    Warning,
    Error,
}

/// Callback invoked when a toast is dismissed (manually, by timeout, or by
/// capacity eviction). Runs at most once.
pub type DismissCallback = Box<dyn FnOnce()>;

/// The minimal external data contract for opening a toast.
pub struct ToastPayload {
    pub kind: ToastKind,
    pub message: String,
    /// Opt out of the auto-dismiss timer; the toast stays until closed.
    pub do_not_auto_close: bool,
    pub on_dismissed: Option<DismissCallback>,
    /// Kind-specific extra fields, forwarded verbatim to the toast component.
    pub extra: Map<String, Value>,
}

impl ToastPayload {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            do_not_auto_close: false,
            on_dismissed: None,
            extra: Map::new(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, message)
    }

    pub fn sticky(mut self) -> Self {
        self.do_not_auto_close = true;
        self
    }

    pub fn on_dismissed(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_dismissed = Some(Box::new(callback));
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Derives a payload from a generic prop bag.
    ///
    /// Recognized keys: `message` (string), `toast_kind` (serialized
    /// [`ToastKind`], defaults to `info`), `do_not_auto_close` (bool). All
    /// remaining keys become extra fields. Callbacks cannot ride in JSON
    /// props; use [`ToastPayload`] directly for `on_dismissed`.
    pub fn from_props(props: SurfaceProps) -> Self {
        let mut values = props.into_values();
        let message = match values.remove("message") {
            Some(Value::String(message)) => message,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let kind = values
            .remove("toast_kind")
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or(ToastKind::Info);
        let do_not_auto_close = values
            .remove("do_not_auto_close")
            .and_then(|value| value.as_bool())
            .unwrap_or(false);

        Self {
            kind,
            message,
            do_not_auto_close,
            on_dismissed: None,
            extra: values,
        }
    }
}

impl std::fmt::Debug for ToastPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastPayload")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("do_not_auto_close", &self.do_not_auto_close)
            .field("on_dismissed", &self.on_dismissed.is_some())
            .field("extra", &self.extra)
            .finish()
    }
}
