//! FantaPay: wallets, competitions and matchday fees for fantasy-football
//! leagues, served as an HTTP/JSON API.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
