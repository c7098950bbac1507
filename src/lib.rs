pub mod brand;
pub mod cli;
pub mod collection;
pub mod commands;
pub mod config;
pub mod data_url;
pub mod drag;
pub mod focus;
pub mod inbox;
pub mod journal;
pub mod library;
pub mod logging;
pub mod model;
pub mod profile;
pub mod storage;
pub mod tts;
pub mod ui;
