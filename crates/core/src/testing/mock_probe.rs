//! Mock connectivity probe for testing.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::connectivity::ConnectivityProbe;

/// Connectivity probe with a toggleable answer.
pub struct MockProbe {
    online: AtomicBool,
}

impl MockProbe {
    /// A probe that reports online.
    pub fn online() -> Self {
        Self {
            online: AtomicBool::new(true),
        }
    }

    /// A probe that reports offline.
    pub fn offline() -> Self {
        Self {
            online: AtomicBool::new(false),
        }
    }

    /// Change the reported connectivity.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectivityProbe for MockProbe {
    async fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
