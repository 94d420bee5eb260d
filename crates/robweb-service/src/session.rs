// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Scoped service session.

use std::ops::Deref;

use crate::api::ServiceHandle;

/// An open service session.
///
/// The underlying handle is closed when the session is dropped, whether the
/// request completed, returned early with an error, or its future was
/// cancelled.
pub struct Session {
    handle: Option<Box<dyn ServiceHandle>>,
}

impl Session {
    /// Wrap an open handle.
    pub fn new(handle: Box<dyn ServiceHandle>) -> Self {
        Self {
            handle: Some(handle),
        }
    }
}

impl Deref for Session {
    type Target = dyn ServiceHandle;

    fn deref(&self) -> &Self::Target {
        match &self.handle {
            Some(handle) => handle.as_ref(),
            // The handle is only taken in drop.
            None => unreachable!("session used after close"),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.close();
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("open", &self.handle.is_some())
            .finish()
    }
}
