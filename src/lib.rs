pub mod config;
pub mod errors;
pub mod event;
pub mod gateway;
pub mod item;
pub mod project;
pub mod workflow;
