pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod events;
pub mod loader;
pub mod matcher;
pub mod motion;
pub mod spell;
pub mod types;
