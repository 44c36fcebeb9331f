//! Radial genealogy ("fan chart") layout and rendering.
//!
//! The pipeline is `tree::normalize` → `fan::layout` → `fan::scene` →
//! `fan::svg`, framed by a [`viewport::Viewport`] transform. Everything is
//! synchronous and rebuilt from scratch on each input change.

pub mod fan;
pub mod fonts;
pub mod theme;
pub mod tree;
pub mod viewport;
