//! Outbound integrations.

pub mod buyback;
