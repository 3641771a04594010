//! Types shared by every lanroster crate: the [`device::Device`] record, scan
//! targets and ranges, interface selection and runtime [`config::Config`].

pub mod adapter;
pub mod config;
pub mod device;
pub mod network;
