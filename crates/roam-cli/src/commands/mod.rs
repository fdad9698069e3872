pub mod add;
pub mod common;
pub mod config;
pub mod delete;
pub mod export;
pub mod gallery;
pub mod list;
pub mod status;
