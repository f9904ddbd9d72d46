//! Static surface catalog.
//!
//! The registry is built once at startup from explicit descriptor tuples and
//! is immutable afterwards. Lookup failures are defects in the calling code
//! (the valid id set is closed at build time), so they panic instead of
//! surfacing as recoverable errors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::component::ComponentLoad;

/// Identifier of a registered surface.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SurfaceId(&'static str);

impl SurfaceId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Surface class governing multiplicity and storage slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    /// Full-height side panel; at most one at a time.
    Drawer,
    /// Independent pinned panel; at most one at a time.
    StickyDrawer,
    /// Focus-managed dialog; many tracked, one displayed.
    Modal,
    /// Inline tab; many may be open simultaneously.
    Tab,
    /// Ephemeral stacked notification.
    Toast,
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Drawer => "drawer",
            Self::StickyDrawer => "sticky drawer",
            Self::Modal => "modal",
            Self::Tab => "tab",
            Self::Toast => "toast",
        };
        f.write_str(name)
    }
}

type SurfaceLoader = Box<dyn Fn() -> ComponentLoad>;

/// One catalog entry: identity, kind tag, display label, and lazy loader.
pub struct SurfaceDescriptor {
    id: SurfaceId,
    kind: SurfaceKind,
    label: &'static str,
    loader: SurfaceLoader,
}

impl SurfaceDescriptor {
    pub fn new(
        id: SurfaceId,
        kind: SurfaceKind,
        label: &'static str,
        loader: impl Fn() -> ComponentLoad + 'static,
    ) -> Self {
        Self {
            id,
            kind,
            label,
            loader: Box::new(loader),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    /// Human-readable title, used in recovery payloads.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Kicks off (or synchronously resolves) the component load.
    pub fn load(&self) -> ComponentLoad {
        (self.loader)()
    }
}

impl fmt::Debug for SurfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceDescriptor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .finish()
    }
}

/// The two designated surfaces the recovery path opens after a crash.
#[derive(Clone, Copy, Debug)]
pub struct RecoverySurfaces {
    /// Retry-capable failure drawer; must be registered with kind `Drawer`.
    pub failure_drawer: SurfaceId,
    /// Generic failure toast; must be registered with kind `Toast`.
    pub failure_toast: SurfaceId,
}

/// Immutable catalog mapping surface ids to kind and loader.
pub struct SurfaceRegistry {
    entries: Vec<SurfaceDescriptor>,
    recovery: RecoverySurfaces,
}

impl SurfaceRegistry {
    /// Builds the catalog.
    ///
    /// Panics on duplicate ids, on an unregistered recovery surface, or on a
    /// recovery surface registered under the wrong kind. All of these are
    /// startup-time defects.
    pub fn build(entries: Vec<SurfaceDescriptor>, recovery: RecoverySurfaces) -> Self {
        for (index, entry) in entries.iter().enumerate() {
            if entries[..index].iter().any(|other| other.id == entry.id) {
                panic!("surface id '{}' registered twice", entry.id);
            }
        }

        let registry = Self { entries, recovery };
        let failure_drawer = registry.descriptor(recovery.failure_drawer);
        if failure_drawer.kind != SurfaceKind::Drawer {
            panic!(
                "failure drawer '{}' must be registered as a drawer, got {}",
                recovery.failure_drawer, failure_drawer.kind
            );
        }
        let failure_toast = registry.descriptor(recovery.failure_toast);
        if failure_toast.kind != SurfaceKind::Toast {
            panic!(
                "failure toast '{}' must be registered as a toast, got {}",
                recovery.failure_toast, failure_toast.kind
            );
        }
        registry
    }

    /// Looks up a descriptor. Panics on an unknown id: the valid set is
    /// closed, so a miss means the caller and the catalog disagree.
    pub fn descriptor(&self, id: SurfaceId) -> &SurfaceDescriptor {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .unwrap_or_else(|| panic!("surface id '{id}' is not registered"))
    }

    pub fn kind_of(&self, id: SurfaceId) -> SurfaceKind {
        self.descriptor(id).kind
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn recovery(&self) -> RecoverySurfaces {
        self.recovery
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for SurfaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceRegistry")
            .field("entries", &self.entries)
            .field("recovery", &self.recovery)
            .finish()
    }
}
