use serde::Serialize;

/// One network-addressable replica of a backend service, with the number of
/// consecutive failures recorded against it since its last success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub address: String,
    pub failure_count: u32,
}

impl Instance {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            failure_count: 0,
        }
    }

    /// Counts one more failure and returns the new total.
    pub fn record_failure(&mut self) -> u32 {
        self.failure_count = self.failure_count.saturating_add(1);
        self.failure_count
    }

    pub fn reset(&mut self) {
        self.failure_count = 0;
    }
}

/// Read-only view of an instance, as reported by `/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStatus {
    pub address: String,
    pub failure_count: u32,
    pub current: bool,
}
