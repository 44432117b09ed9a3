// Copyright 2025 the Flat Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attach/detach state of a draw command.

use std::fmt;
use std::sync::Weak;

/// Redraw scheduler handed to commands while they are attached.
///
/// Implementations should coalesce repeated requests into a single frame.
/// `invalidate` may be called from any thread.
pub trait Invalidate: Send + Sync {
    /// Request a redraw.
    fn invalidate(&self);
}

/// Whether a command is part of the visible set.
///
/// The redraw scheduler is only reachable while [`Lifecycle::Attached`], and
/// only weakly: a command never keeps its scheduler alive.
#[derive(Clone, Default)]
pub enum Lifecycle {
    /// Not visible; no notifications are applied.
    #[default]
    Detached,
    /// Visible; bitmap notifications are applied and trigger redraws.
    Attached {
        /// Scheduler to notify when the command needs repainting.
        invalidate: Weak<dyn Invalidate>,
    },
}

impl Lifecycle {
    /// Returns `true` when attached.
    pub fn is_attached(&self) -> bool {
        matches!(self, Self::Attached { .. })
    }

    /// Request a redraw if attached and the scheduler is still alive.
    ///
    /// Returns `true` if a redraw was requested.
    pub fn invalidate(&self) -> bool {
        let Self::Attached { invalidate } = self else {
            return false;
        };
        match invalidate.upgrade() {
            Some(invalidate) => {
                invalidate.invalidate();
                true
            }
            None => {
                tracing::debug!("redraw scheduler dropped while command attached");
                false
            }
        }
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => f.write_str("Detached"),
            Self::Attached { invalidate } => f
                .debug_struct("Attached")
                .field("scheduler_alive", &(invalidate.strong_count() > 0))
                .finish(),
        }
    }
}
