pub mod error;
pub mod params;
pub mod pool;
pub mod writer;
