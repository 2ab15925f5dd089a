//! Process-wide lock and cache of the state applied to the native library.
//!
//! The native library keeps sidereal mode, topocentric location and the
//! open JPL file in globals. Every native call runs under [`lock`], and a
//! setter is only issued when the cached value differs from the request.

use std::sync::{Mutex, MutexGuard};

use swe_contract::{SidMode, TopoLoc};

static NATIVE: Mutex<NativeState> = Mutex::new(NativeState::new());

/// Values last applied to the native globals by handle `owner`.
#[derive(Debug)]
pub(crate) struct NativeState {
    owner: Option<u64>,
    sid_mode: Option<SidMode>,
    topo: Option<TopoLoc>,
    jpl_file: Option<String>,
}

impl NativeState {
    const fn new() -> Self {
        Self {
            owner: None,
            sid_mode: None,
            topo: None,
            jpl_file: None,
        }
    }

    /// Forget every applied value, e.g. after the native library reset.
    pub(crate) fn invalidate(&mut self) {
        self.sid_mode = None;
        self.topo = None;
        self.jpl_file = None;
    }

    fn claim(&mut self, owner: u64) {
        if self.owner != Some(owner) {
            log::trace!("native state claimed by handle {owner}");
            self.invalidate();
            self.owner = Some(owner);
        }
    }

    /// Record `mode`; true when the native setter must run.
    pub(crate) fn replace_sid_mode(&mut self, mode: &SidMode) -> bool {
        if self.sid_mode.as_ref() == Some(mode) {
            return false;
        }
        self.sid_mode = Some(*mode);
        true
    }

    /// Record `topo`; true when the native setter must run.
    pub(crate) fn replace_topo(&mut self, topo: &TopoLoc) -> bool {
        if self.topo.as_ref() == Some(topo) {
            return false;
        }
        self.topo = Some(*topo);
        true
    }

    /// Record `name`; true when the native setter must run.
    pub(crate) fn replace_jpl_file(&mut self, name: &str) -> bool {
        if self.jpl_file.as_deref() == Some(name) {
            return false;
        }
        self.jpl_file = Some(name.to_string());
        true
    }
}

/// Acquire the native lock on behalf of handle `owner`.
///
/// A poisoned lock means a native call panicked midway; the cache is then
/// discarded.
pub(crate) fn lock(owner: u64) -> MutexGuard<'static, NativeState> {
    let mut guard = match NATIVE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("native lock poisoned; discarding state cache");
            NATIVE.clear_poison();
            let mut guard = poisoned.into_inner();
            guard.invalidate();
            guard
        }
    };
    guard.claim(owner);
    guard
}
