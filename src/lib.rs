pub mod browser;
pub mod config;
pub mod controller;
pub mod engine;
pub mod lead;
pub mod notify;
pub mod pipeline;
pub mod scheduler;
pub mod store;
