//! pixel-layout: series placement and daisy-chain routing of addressable LEDs
//!
//! This library places chains of addressable LED footprints (such as the
//! SK9822-EC20) onto a PCB layout and wires each pixel to the previous one.
//!
//! # Architecture
//!
//! - **Board model**: an in-memory board of footprints, tracks, vias and
//!   drawings, loaded from and saved to a JSON document with a backup
//! - **Series placement**: pixels are placed in request order and numbered
//!   `D1`, `D2`, …; requests landing on an existing footprint are merged
//! - **Chain routing**: ground stubs with vias, +5V stubs carried forward
//!   along the chain, and direct clock/data links between neighbours
//!
//! # Modules
//!
//! - [`board`]: Board document, footprints, library and primitives
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Configuration error types
//! - [`geometry`]: Point and vector algebra
//! - [`layout`]: Placement, overlap resolution, routing and plans

pub mod board;
pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
