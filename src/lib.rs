//! Domain layer for an e-commerce cart and coupon backend.
//!
//! Commands are exposed as [`tower::Service`] implementations over a set of
//! storage ports; transport and persistence live behind those boundaries.

pub mod adapters;
pub mod commands;
pub mod domain;
pub mod ports;
