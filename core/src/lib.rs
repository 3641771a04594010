//! The lanroster engine.
//!
//! * [`scanner`] sends an ARP sweep over a range and collects replies, and
//!   resolves reverse names for what it found.
//! * [`registry`] persists devices the operator chose to keep.
//! * [`reconcile`] merges a fresh sweep with the registry without clobbering
//!   operator-assigned names.
//! * [`discovery`] runs all of the above as one background pass at a time.

pub mod adapter;
pub mod discovery;
pub mod network;
pub mod reconcile;
pub mod registry;
pub mod scanner;
