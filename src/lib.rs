//! Demo widget shell for the portfolio site.
//!
//! ARCHITECTURE
//! ============
//! `registry` holds the fixed list of demos. `mount` resolves a key against
//! it, loads the implementation bound in `widgets`, and renders it inside a
//! per-mount `scope` and error `boundary`. `routes` exposes all of that over
//! HTTP; `services` runs the idle mount sweeper.

pub mod boundary;
pub mod config;
pub mod error;
pub mod mount;
pub mod registry;
pub mod routes;
pub mod scope;
pub mod services;
pub mod state;
pub mod widgets;
