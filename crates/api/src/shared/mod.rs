pub mod auth;
pub mod usecase;
