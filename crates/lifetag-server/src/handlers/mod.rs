//! HTTP handlers, split by audience: `records` is the public surface,
//! `admin` requires credentials.

pub mod admin;
pub mod records;
