pub mod models;
pub mod session;
pub mod ban;
pub mod pick;
pub mod auto_resolve;
pub mod controller;
pub mod bot_strategy;
pub mod bot;
pub mod config;
pub mod duel;
