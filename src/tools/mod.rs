//! Internal support modules shared by `archive` and `direct_ports::comp`.
//!
//! Nothing here is part of the public API; both the clean-room implementation
//! and the legacy-faithful port build on the same bit I/O and priority queue
//! primitives so the two stay provably consistent with each other (see the
//! `interop` test in `archive`).

pub mod bitio;
pub mod heap;
