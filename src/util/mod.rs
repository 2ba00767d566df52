//! Internal utilities.

pub mod layout;
