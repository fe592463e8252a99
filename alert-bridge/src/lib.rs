pub mod config;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
