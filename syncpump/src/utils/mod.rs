//! Internal data structures.
//!
//! This module exposes a [`Slab`] used by the pump to hold detached tasks
//! under small, reusable keys.

mod slab;

pub(crate) use slab::Slab;
