pub mod reader;
pub mod value;
