//! Bearer header wrapper, cache record, and provider payload normalization.

pub mod header;
pub mod payload;
pub mod record;
