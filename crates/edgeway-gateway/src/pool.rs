use crate::instance::{Instance, InstanceStatus};

/// What recording a failure did to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// The address is no longer in the pool; nothing was counted
    Untracked,
    /// The failure was counted and the instance stays
    Counted(u32),
    /// The instance reached the threshold and was removed
    Evicted { remaining: usize },
}

/// Ordered set of candidate instances for one logical service.
///
/// Selection is sticky: the current instance keeps serving until it is
/// evicted, at which point the index moves to whatever now occupies its slot.
/// `current_index` is always `< len()` when the pool is non-empty and `0`
/// when it is empty.
#[derive(Debug, Clone, Default)]
pub struct InstancePool {
    instances: Vec<Instance>,
    current_index: usize,
}

impl InstancePool {
    /// Create a pool from addresses, dropping duplicates but keeping order
    pub fn new(addresses: Vec<String>) -> Self {
        let mut pool = Self::default();
        for address in addresses {
            pool.add(address);
        }
        pool
    }

    /// The instance the next dispatch will use
    pub fn current(&self) -> Option<&Instance> {
        self.instances.get(self.current_index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Add an instance at the end of the pool. Returns `false` for duplicates.
    pub fn add(&mut self, address: String) -> bool {
        if self.position(&address).is_some() {
            return false;
        }
        self.instances.push(Instance::new(address));
        true
    }

    /// Reset the failure count of `address`. Returns `false` if it is gone.
    pub fn record_success(&mut self, address: &str) -> bool {
        match self.position(address) {
            Some(pos) => {
                self.instances[pos].reset();
                true
            }
            None => false,
        }
    }

    /// Count a failure against `address`, evicting it once it reaches
    /// `max_failures`.
    pub fn record_failure(&mut self, address: &str, max_failures: u32) -> FailureOutcome {
        let Some(pos) = self.position(address) else {
            return FailureOutcome::Untracked;
        };

        let count = self.instances[pos].record_failure();
        if count < max_failures {
            return FailureOutcome::Counted(count);
        }

        self.remove_at(pos);
        FailureOutcome::Evicted {
            remaining: self.instances.len(),
        }
    }

    // Slots after `pos` shift left by one. The index follows the instance it
    // pointed at, and when that instance is the one removed it lands on its
    // successor (wrapping to 0 past the end).
    fn remove_at(&mut self, pos: usize) {
        self.instances.remove(pos);
        if pos < self.current_index {
            self.current_index -= 1;
        }
        if self.current_index >= self.instances.len() {
            self.current_index = 0;
        }
    }

    fn position(&self, address: &str) -> Option<usize> {
        self.instances.iter().position(|i| i.address == address)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Addresses in pool order
    pub fn addresses(&self) -> Vec<String> {
        self.instances.iter().map(|i| i.address.clone()).collect()
    }

    pub fn snapshot(&self) -> Vec<InstanceStatus> {
        self.instances
            .iter()
            .enumerate()
            .map(|(idx, i)| InstanceStatus {
                address: i.address.clone(),
                failure_count: i.failure_count,
                current: idx == self.current_index,
            })
            .collect()
    }
}
