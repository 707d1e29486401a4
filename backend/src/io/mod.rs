//! # I/O Layer
//!
//! Adapters between the outside world and the domain services. Only the
//! REST interface exists today.

pub mod rest;
