//! # Core utilities and shared types for Handspace
//!
//! This crate provides the math primitives shared by every other crate in the
//! workspace: axis-aligned bounds, rigid pose helpers and color utilities.

pub mod bounds;
pub mod color;
pub mod pose;

pub use bounds::Bounds;
pub use color::Color;
