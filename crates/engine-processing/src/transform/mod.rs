//! Row-level decoding helpers shared by the entity migrators.

pub mod dedup;
pub mod fields;
