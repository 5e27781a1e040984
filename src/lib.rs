//! Async client for the Kentaa API.
//!
//! The Kentaa API allows 100 requests per minute and 500 per hour per API
//! key; exceeding either limit yields HTTP 429. This crate never lets a
//! caller hit that wall: every request goes through a [`Scheduler`] that
//! queues submissions and releases them only while both budgets have
//! capacity, correcting its local bookkeeping from the
//! `X-RateLimit-Remaining-*` headers the API returns on every response.
//!
//! List endpoints are paginated; [`KentaaClient::fetch_all`] walks all pages
//! of a resource sequentially and returns one concatenated list.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pagination;
pub mod request;
pub mod scheduler;

pub use client::KentaaClient;
pub use config::Config;
pub use error::Error;
pub use http::{HttpTransport, RateSnapshot, Transport, TransportResponse};
pub use request::{Method, RequestDescriptor};
pub use scheduler::{RequestHandle, Scheduler, Window};
