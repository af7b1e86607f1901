//! Application layer containing the business operations.
//!
//! `AuthService` owns accounts and sessions, `CompetitionService` owns the
//! competition lifecycle and `PaymentEngine` owns every money movement. All
//! three share one [`Stores`](crate::domain::ports::Stores) bundle and its
//! write guard.

pub mod auth;
pub mod competitions;
pub mod engine;
