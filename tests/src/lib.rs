//! Cross-crate tests: the discovery service wired to a real registry file,
//! with the network replaced by fakes.

#[cfg(test)]
mod discovery;
#[cfg(test)]
mod registry;
