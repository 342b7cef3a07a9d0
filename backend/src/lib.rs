pub mod cache;
pub mod config;
pub mod imaging;
pub mod inference;
pub mod notify;
pub mod pipeline;
pub mod routes;
