//! # Dukkon Telegram Bot
//!
//! A Telegram storefront bot: customers browse the product catalog, add
//! items to a cart, submit an order with a delivery location, and manage
//! their profile (language, phone, full name). The conversation is driven
//! by an explicit finite state machine in [`workflow`], backed by a SQLite
//! store and a per-user language preference cache.

pub mod bot;
pub mod cache;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod localization;
pub mod models;
pub mod regions;
pub mod text_processing;
pub mod workflow;
