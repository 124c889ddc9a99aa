//! Per-session capability probe. Pure read of host state.

use serde::Serialize;

use crate::host::Host;

/// What the host environment can do this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub notifications: bool,
    pub service_worker: bool,
    pub push: bool,
    pub https: bool,
}

impl Capabilities {
    pub fn probe(host: &dyn Host) -> Self {
        Self {
            notifications: host.supports_notifications(),
            service_worker: host.supports_service_worker(),
            // Push rides on the worker registration; without worker
            // support it is unreachable regardless of what the host says.
            push: host.supports_service_worker() && host.supports_push(),
            https: host.is_secure_context(),
        }
    }
}
