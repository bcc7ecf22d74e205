//! The process-wide shared-memory roster.

use std::collections::HashMap;
use std::sync::Mutex;

use shared_memory::{Shmem, ShmemConf};
use tracing::debug;

use crate::error::{Result, SubprocessError};

/// One named shared-memory region, as registered via [`ShmRoster::to_shm`].
///
/// The region is unlinked (its backing OS object removed) when dropped; the
/// [`crate::supervisor::Supervisor`] holds the roster for the lifetime of a
/// run and drops it on exit, regardless of pipeline outcome.
pub struct ShmRegion {
    name: String,
    shmem: Shmem,
}

impl ShmRegion {
    /// The region's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read-only view of the mapped bytes.
    ///
    /// # Safety note
    ///
    /// Shared memory is read-mostly by workers; mutation discipline beyond
    /// this accessor is delegated to the user, same as the specification.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: the region was sized to `len` at creation and this crate
        // never hands out a mutable view, so concurrent readers never race
        // with a writer introduced through this API.
        unsafe { std::slice::from_raw_parts(self.shmem.as_ptr(), self.shmem.len()) }
    }
}

/// Process-wide list of named shared-memory regions, snapshotted into each
/// worker at spawn time and unlinked by the supervisor on exit.
#[derive(Default)]
pub struct ShmRoster {
    regions: Mutex<HashMap<String, std::sync::Arc<ShmRegion>>>,
}

impl ShmRoster {
    /// Build an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new named region backed by `bytes`. Fails if `name` is
    /// already registered.
    pub fn to_shm(&self, name: impl Into<String>, bytes: &[u8]) -> Result<()> {
        let name = name.into();
        let mut regions = self.regions.lock().unwrap();
        if regions.contains_key(&name) {
            return Err(SubprocessError::ShmNameCollision(name));
        }

        let mut shmem = ShmemConf::new().size(bytes.len().max(1)).create()?;
        // SAFETY: `shmem` was just created by this call and is not yet
        // shared with any other thread, so a mutable view here cannot
        // alias a concurrent reader.
        let dst = unsafe { std::slice::from_raw_parts_mut(shmem.as_ptr_mut(), bytes.len()) };
        dst.copy_from_slice(bytes);

        debug!(region = %name, bytes = bytes.len(), "registered shared memory region");
        regions.insert(name.clone(), std::sync::Arc::new(ShmRegion { name, shmem }));
        Ok(())
    }

    /// A snapshot of the roster as it stands right now, for handing to a
    /// freshly spawned worker.
    pub fn snapshot(&self) -> Vec<std::sync::Arc<ShmRegion>> {
        self.regions.lock().unwrap().values().cloned().collect()
    }

    /// Look up a previously registered region by name.
    pub fn get(&self, name: &str) -> Option<std::sync::Arc<ShmRegion>> {
        self.regions.lock().unwrap().get(name).cloned()
    }

    /// Drop every registered region, unlinking their backing OS objects.
    pub fn unlink_all(&self) {
        self.regions.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_registration_is_fatal() {
        let roster = ShmRoster::new();
        roster.to_shm("frame-pool", b"abc").unwrap();
        let result = roster.to_shm("frame-pool", b"xyz");
        assert!(matches!(result, Err(SubprocessError::ShmNameCollision(_))));
    }

    #[test]
    fn registered_bytes_round_trip() {
        let roster = ShmRoster::new();
        roster.to_shm("frame-pool", b"hello").unwrap();
        let region = roster.get("frame-pool").unwrap();
        assert_eq!(region.as_slice(), b"hello");
    }
}
