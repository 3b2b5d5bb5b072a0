//! Metro network routing server.
//!
//! Answers two questions about any number of metro networks: "what is the
//! shortest way from this station to that one?" and "which stations start
//! with what I've typed so far?". Each network's graph and name index are
//! built on first use and kept in a bounded LRU cache.

pub mod autocomplete;
pub mod cache;
pub mod config;
pub mod domain;
pub mod loader;
pub mod network;
pub mod routing;
pub mod service;
pub mod web;
