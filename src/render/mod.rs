//! Reactive presentation layer.

pub mod surface;

pub use surface::RenderSurface;
