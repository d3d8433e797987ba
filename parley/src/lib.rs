pub mod config;
pub mod download;
pub mod error;
pub mod horizon;
pub mod layout;
pub mod terminal;
pub mod testing;
pub mod time;
pub mod view;
pub mod widgets;
