// SPDX-License-Identifier: MIT OR Apache-2.0
//! Short-lived highlight timers for recently touched nodes.

use crate::id::NodeId;
use std::collections::HashMap;

/// Default highlight duration in seconds
pub const DEFAULT_TOUCH_TIME: f32 = 1.0;

/// Per-node countdown timers
#[derive(Debug, Clone)]
pub struct TouchTracker {
    /// Full highlight duration
    touch_time: f32,
    /// Remaining time per node, always > 0
    timers: HashMap<NodeId, f32>,
}

impl TouchTracker {
    /// Create a tracker with the given highlight duration
    pub fn new(touch_time: f32) -> Self {
        Self {
            touch_time: touch_time.max(f32::EPSILON),
            timers: HashMap::new(),
        }
    }

    /// Highlight duration
    pub fn touch_time(&self) -> f32 {
        self.touch_time
    }

    /// Restart the highlight for a node
    pub fn touch(&mut self, node_id: NodeId) {
        self.timers.insert(node_id, self.touch_time);
    }

    /// Remaining time for a node, if it is highlighted
    pub fn remaining(&self, node_id: NodeId) -> Option<f32> {
        self.timers.get(&node_id).copied()
    }

    /// Highlight progress in `[0, 1)`; 0 when the node is not highlighted
    pub fn progress(&self, node_id: NodeId) -> f32 {
        match self.timers.get(&node_id) {
            Some(&remaining) if remaining > 0.0 => (self.touch_time - remaining) / self.touch_time,
            _ => 0.0,
        }
    }

    /// Advance every timer by `dt` seconds and drop the expired ones
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.timers.retain(|_, remaining| {
            *remaining -= dt;
            *remaining > 0.0
        });
    }

    /// Forget a node's timer
    pub fn forget(&mut self, node_id: NodeId) {
        self.timers.remove(&node_id);
    }

    /// Number of active timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Whether no timers are active
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl Default for TouchTracker {
    fn default() -> Self {
        Self::new(DEFAULT_TOUCH_TIME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_decays_and_expires() {
        let mut touch = TouchTracker::new(1.0);
        let id = NodeId(3);
        touch.touch(id);
        assert_eq!(touch.remaining(id), Some(1.0));
        assert_eq!(touch.progress(id), 0.0);

        let mut last = 1.0;
        for _ in 0..3 {
            touch.update(0.25);
            let remaining = touch.remaining(id).unwrap();
            assert!(remaining < last);
            last = remaining;
        }
        assert!((touch.progress(id) - 0.75).abs() < 1e-5);

        touch.update(0.25);
        assert_eq!(touch.remaining(id), None);
        assert_eq!(touch.progress(id), 0.0);
        assert!(touch.is_empty());
    }

    #[test]
    fn test_retouch_restarts() {
        let mut touch = TouchTracker::new(2.0);
        let id = NodeId(1);
        touch.touch(id);
        touch.update(1.5);
        touch.touch(id);
        assert_eq!(touch.remaining(id), Some(2.0));
    }

    #[test]
    fn test_overshoot_removes_entry() {
        let mut touch = TouchTracker::default();
        touch.touch(NodeId(1));
        touch.touch(NodeId(2));
        touch.update(0.5);
        touch.touch(NodeId(2));
        touch.update(0.75);
        assert_eq!(touch.len(), 1);
        assert!(touch.remaining(NodeId(1)).is_none());
        assert!(touch.remaining(NodeId(2)).is_some());
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let mut touch = TouchTracker::default();
        touch.touch(NodeId(1));
        touch.update(-5.0);
        assert_eq!(touch.remaining(NodeId(1)), Some(DEFAULT_TOUCH_TIME));
    }
}
