//! Domain layer: the documents FantaPay keeps and the rules that guard them.

pub mod competition;
pub mod money;
pub mod payment;
pub mod ports;
pub mod session;
pub mod transaction;
pub mod user;
