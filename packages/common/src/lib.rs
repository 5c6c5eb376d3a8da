//! Shared building blocks for the CMS services.

pub mod storage;
