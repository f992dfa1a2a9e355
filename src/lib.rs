pub mod analytics;
pub mod convert;
pub mod mapping;
pub mod models;
pub mod parser;
pub mod remote;
pub mod sync;
