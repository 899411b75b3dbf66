#![doc = "nickpack-core: core logic library for nickpack."]

//! This crate contains all pipeline logic and data models for nickpack:
//! typography resolution, template composition, bundle building, archive
//! packing and the paced distribution sequence. The platform client
//! (authentication, HTTP transport, event subscription) is not included
//! here; it lives in the CLI crate and plugs in via the traits in
//! [`contract`].
//!
//! # Usage
//! Add this as a dependency for all shared pipeline, composition, trigger
//! and distribution code.

pub mod archive;
pub mod compose;
pub mod config;
pub mod contract;
pub mod distribute;
pub mod handler;
pub mod trigger;
pub mod typography;
