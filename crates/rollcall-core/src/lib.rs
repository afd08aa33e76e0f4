//! Core types and trait definitions for the rollcall check-in service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod employee;
pub mod meeting;
pub mod notify;
pub mod registration;
pub mod store;
pub mod user;
