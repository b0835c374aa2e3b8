pub mod api_connection;
pub mod badges;
pub mod carousel;
pub mod cli;
pub mod config;
pub mod detail;
pub mod notify;
pub mod recipe;
pub mod render;
pub mod results;
pub mod search;
pub mod session_store;
pub mod shell;
