//! # API Route Modules
//!
//! - `registrations`: registration commands and queries: creation, the
//!   status transitions, ownership, attached files and metadata.

pub mod registrations;
