// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree configuration.

/// Configuration for a [`NodeTree`](crate::node::NodeTree).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    /// Number of node slots to preallocate.
    pub initial_capacity: usize,
    /// Maximum number of pending load steps polled per
    /// [`poll_loads`](crate::node::NodeTree::poll_loads) call.
    ///
    /// Loads are polled round-robin, so a small budget still makes progress on
    /// every load over successive calls. `None` polls every pending load once
    /// per call.
    pub poll_budget: Option<usize>,
}

impl TreeConfig {
    /// Unbounded polling, suitable for tools and tests that settle the whole
    /// tree at once.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            initial_capacity: 16,
            poll_budget: None,
        }
    }

    /// Polls at most `budget` loads per call, for frame loops that spread
    /// asset completion over several frames.
    ///
    /// A budget of zero is treated as one.
    #[must_use]
    pub const fn frame_budgeted(budget: usize) -> Self {
        Self {
            initial_capacity: 64,
            poll_budget: Some(if budget == 0 { 1 } else { budget }),
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unbounded() {
        assert_eq!(TreeConfig::default(), TreeConfig::unbounded());
        assert_eq!(TreeConfig::default().poll_budget, None);
    }

    #[test]
    fn zero_budget_still_makes_progress() {
        assert_eq!(TreeConfig::frame_budgeted(0).poll_budget, Some(1));
        assert_eq!(TreeConfig::frame_budgeted(8).poll_budget, Some(8));
    }
}
