//! Explicit scan session state.

use std::sync::atomic::{AtomicBool, Ordering};

/// Mutable state of one device's scanning session.
///
/// This is an explicit object owned by the orchestrator and passed to
/// collaborators, not ambient globals, so the logic is portable off any
/// particular UI thread. `is_processing` is the only mutual exclusion the
/// per-device flow needs: decoded frames arrive on one cooperative task, and
/// cross-device concurrency is handled by the sync engine, not here.
#[derive(Debug, Default)]
pub struct ScanSession {
    is_scanning: AtomicBool,
    is_processing: AtomicBool,
}

/// Held while a single scan is validated; releases `is_processing` on drop,
/// whatever path the validation takes.
#[derive(Debug)]
pub struct ScanPermit<'a> {
    session: &'a ScanSession,
}

impl Drop for ScanPermit<'_> {
    fn drop(&mut self) {
        self.session.is_processing.store(false, Ordering::SeqCst);
    }
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the single processing slot. Returns `None` while another scan
    /// is in flight; the caller drops the frame without processing it.
    pub fn try_begin_processing(&self) -> Option<ScanPermit<'_>> {
        self.is_processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| ScanPermit { session: self })
    }

    /// True while a scan is being validated.
    pub fn is_processing(&self) -> bool {
        self.is_processing.load(Ordering::SeqCst)
    }

    /// Mark the session as scanning. Returns false if it already was.
    pub fn begin_scanning(&self) -> bool {
        self.is_scanning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Mark the session as no longer scanning.
    pub fn end_scanning(&self) {
        self.is_scanning.store(false, Ordering::SeqCst);
    }

    /// True while the decoder stream is being consumed.
    pub fn is_scanning(&self) -> bool {
        self.is_scanning.load(Ordering::SeqCst)
    }
}
