pub mod context;
pub mod entities;
pub mod error;
pub mod transform;
pub mod upsert;

#[cfg(test)]
pub(crate) mod test_support;
