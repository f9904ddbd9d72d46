//! Overlay orchestration core.
//!
//! Invariant: single writer: controller state is mutated only through
//! [`OverlayController`] methods; the render layer and host collaborators
//! observe snapshots and re-enter through the same methods.
//!
//! # Public API Overview
//! - Catalog surfaces in a [`SurfaceRegistry`] built from explicit
//!   [`SurfaceDescriptor`] tuples (id, kind, label, lazy loader).
//! - Drive lifecycle through an [`OverlayController`] constructed once per
//!   application session (`open`, `open_toast`, `close`, `update_props`,
//!   `tick`, `retry_failed`).
//! - Project state with a [`RenderSurface`], which wraps every mounted
//!   component in a fresh [`RecoveryBoundary`].
//! - Supply host capabilities via the traits in [`crate::core::host`];
//!   process defaults live in [`platform`].

pub mod config;
pub mod core;
pub mod platform;
pub mod registry;
pub mod render;
pub mod runtime;

/// Surface catalog types.
pub use crate::registry::{
    RecoverySurfaces, SurfaceDescriptor, SurfaceId, SurfaceKind, SurfaceRegistry,
};

/// Controller handle and lifecycle types.
pub use crate::runtime::controller::{
    ActiveSurface, CloseRequest, HostAdapters, OpenResult, OverlayController, OverlaysSnapshot,
    RecoveryInfo, Subscription, ToastView,
};

/// Crash isolation wrapper and its mount-time capture.
pub use crate::runtime::recovery::{MountOrigin, RecoveryBoundary};

/// Component contract and lazy-load plumbing.
pub use crate::core::component::{ComponentLoad, LoadHandle, PendingLoad, SurfaceComponent};

/// Prop bags and toast payloads.
pub use crate::core::props::SurfaceProps;
pub use crate::core::toast::{DismissCallback, ToastId, ToastKind, ToastPayload};

/// Failure taxonomy.
pub use crate::core::failure::{ErrorContext, RetryHook, SurfaceError, SurfaceFailure};

/// Host collaborator contracts.
pub use crate::core::host::{
    Clock, ConnectivityProbe, ErrorLogger, ModalFocusTracker, ToastIdSource,
};

/// Controller tuning knobs.
pub use crate::config::OverlazyConfig;

/// Render projection.
pub use crate::render::RenderSurface;
