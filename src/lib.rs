//! Bilingual conference website over a REST backend.
//!
//! Public pages render the programme as a day-by-day timeline and the other
//! conference collections as lists; the programme can be downloaded as a
//! PDF. An admin console manages sessions, archives and partners.

pub mod auth;
pub mod backend;
pub mod config;
pub mod export;
pub mod forms;
pub mod i18n;
pub mod loader;
pub mod metrics;
pub mod retry;
pub mod schedule;
pub mod security;
pub mod web;
