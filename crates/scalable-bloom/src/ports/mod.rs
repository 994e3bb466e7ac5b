//! Ports Layer - Trait definitions
//!
//! - `inbound`: the capability set callers drive (`MembershipFilter`)

pub mod inbound;

pub use inbound::{FilterKind, MembershipFilter};
