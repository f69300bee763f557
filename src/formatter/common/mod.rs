//! Common helpers for formatter implementations.
//!
//! This module contains small helper types that are convenient when implementing zest formatters.
//! They are intentionally formatter focused and are not meant to be general purpose building blocks
//! for unrelated code.

pub mod color;
