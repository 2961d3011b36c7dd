pub mod adapters;
pub mod config;
pub mod error;
pub mod i18n;
pub mod web;
