pub mod admin;
pub mod error;
pub mod mcp_api;
pub mod model;
pub mod pager;
pub mod query;
pub mod store;
pub mod view;
pub mod xref;
