//! The network-adapter capability.
//!
//! Enumerating adapters and reassigning their hardware id are OS concerns;
//! the engine only talks to them through [`AdapterController`], so callers
//! can plug in whatever their platform needs and tests can plug in a fake.

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("no network adapter selected")]
    NoInterface,
    #[error("'{0}' is not a valid hardware id")]
    InvalidHardwareId(String),
    #[error("hardware id reassignment is not supported by this controller")]
    Unsupported,
    /// The controller's own failure output, kept verbatim for the operator.
    #[error("{0}")]
    Rejected(String),
    #[error("failed to enumerate adapters: {0}")]
    Enumeration(String),
}

pub trait AdapterController: Send + Sync {
    /// Names of the adapters an operator may pick from.
    fn list_adapters(&self) -> Result<Vec<String>, AdapterError>;

    /// Reassigns `interface`'s hardware id and bounces the interface.
    fn assign_hardware_id(&self, interface: &str, hardware_id: &str) -> Result<(), AdapterError>;
}
