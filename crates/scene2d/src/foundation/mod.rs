//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types, affine helpers and the swappable matrix kernel
//! - Logging utilities

pub mod math;
pub mod logging;
