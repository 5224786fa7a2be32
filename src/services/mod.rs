pub mod config;
pub mod graph;
pub mod insights;
pub mod logger;
pub mod pagination;
pub mod params;
pub mod resolver;
pub mod session;
pub mod tool_executor;
pub mod transport;
pub mod validation;
