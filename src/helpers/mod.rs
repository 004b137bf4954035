//! Shared formatting helpers and static lookup tables.
pub(crate) mod emoji;
pub(crate) mod number;
