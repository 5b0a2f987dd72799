pub mod alerting;
pub mod bot;
pub mod config;
pub mod db;
pub mod monitor;
pub mod notifications;
pub mod version;
pub mod web;
