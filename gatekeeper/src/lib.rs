//! Shared invite-tracking primitives for the gatekeeper bots.
//!
//! The interesting part lives in [`invites`]: a per-guild snapshot of the last-known invite list
//! and the use-count diff that attributes a member join to the invite they came in through.
//! Everything in here is plain data, free of any Discord client types, so the bots stay the thin
//! glue layer they should be.

#![warn(missing_debug_implementations, rust_2018_idioms)]
#![warn(clippy::style, clippy::perf, clippy::complexity, clippy::correctness)]

pub mod invites;
