pub mod aggregate;
pub mod config;
pub mod convert;
pub mod declarations;
pub mod error;
pub mod model;
pub mod parsers;
pub mod report;
pub mod sources;
