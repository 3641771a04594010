pub mod channel;

use pnet::datalink;

use lanroster_common::network::range::Ipv4Range;
use lanroster_common::network::target::{Target, TargetError};

/// Resolves `target` against the interfaces of this host.
pub fn target_range(target: &Target) -> Result<Ipv4Range, TargetError> {
    target.to_range(&datalink::interfaces())
}
