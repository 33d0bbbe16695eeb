pub mod client;
pub mod config;
pub mod dispatch;
pub mod server;
pub mod whatsapp;
