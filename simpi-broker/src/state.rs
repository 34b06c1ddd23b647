use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use simpi_wire::RegisterBank;

/// Everything a request handler needs: the shared register bank plus
/// where to find static assets and the preferences blob.
///
/// One `AppState` is shared (via `Arc`) across every connection-handling
/// thread the Broker spawns. Register accesses are individually atomic;
/// a batch `setreg` is not atomic as a whole, matching the concurrency
/// design — the simulation targets a single local UI, not concurrent
/// writers racing for consistency.
pub struct AppState {
    pub regs: RegisterBank,
    pub static_dir: PathBuf,
    pub prefs_path: PathBuf,
    /// Cleared by the `action/terminate` handler; polled by the accept
    /// loop between connections.
    pub running: AtomicBool,
}

impl AppState {
    pub fn new(static_dir: PathBuf, prefs_path: PathBuf) -> Self {
        AppState {
            regs: RegisterBank::new(),
            static_dir,
            prefs_path,
            running: AtomicBool::new(true),
        }
    }
}
