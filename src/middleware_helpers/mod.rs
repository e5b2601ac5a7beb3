//! HTTP middleware shared across the API.

pub mod request_id;
