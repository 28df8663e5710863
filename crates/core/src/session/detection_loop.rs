//! Per-tick detection state: activation, the single in-flight inference
//! guard, and the latest textual result.
//!
//! Every activation change starts a new epoch. A tick's result is applied
//! only if it settles in the epoch it was issued in, so inference calls
//! still running when the loop deactivates cannot resurrect stale overlays
//! or results.

use crate::analysis::domain::face_analysis::FaceAnalysis;
use crate::analysis::domain::latest_result::LatestResult;
use crate::shared::frame::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickId {
    pub epoch: u64,
    pub seq: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickState {
    Idle,
    Pending {
        tick: TickId,
        dimensions: (u32, u32),
    },
    Settled(TickId),
}

/// Detections to draw after a tick was applied, with the frame they were
/// found in.
#[derive(Debug, PartialEq)]
pub struct AppliedTick {
    pub detections: Vec<FaceAnalysis>,
    pub frame: Frame,
}

impl AppliedTick {
    pub fn dimensions(&self) -> (u32, u32) {
        self.frame.dimensions()
    }
}

pub struct DetectionLoop {
    active: bool,
    epoch: u64,
    next_seq: u64,
    state: TickState,
    pending_frame: Option<Frame>,
    latest: Option<LatestResult>,
}

impl DetectionLoop {
    pub fn new() -> Self {
        Self {
            active: false,
            epoch: 0,
            next_seq: 0,
            state: TickState::Idle,
            pending_frame: None,
            latest: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> TickState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TickState::Pending { .. })
    }

    pub fn latest(&self) -> Option<&LatestResult> {
        self.latest.as_ref()
    }

    /// Returns `Some(active)` when the activation actually changed.
    pub fn set_active(&mut self, active: bool) -> Option<bool> {
        if self.active == active {
            return None;
        }
        self.active = active;
        self.epoch += 1;
        Some(active)
    }

    /// Issues a tick for the frame `next_frame` yields.
    ///
    /// Nothing is issued (and `next_frame` is not called) while inactive
    /// or while the previous inference has not settled. A missing frame
    /// skips the tick.
    pub fn begin_tick(
        &mut self,
        next_frame: impl FnOnce() -> Option<Frame>,
    ) -> Option<(TickId, Frame)> {
        if !self.active {
            return None;
        }
        if let TickState::Pending { tick, .. } = self.state {
            log::debug!("Tick skipped: inference {tick:?} still pending");
            return None;
        }
        let Some(frame) = next_frame() else {
            log::debug!("Tick skipped: no live frame");
            return None;
        };

        let tick = TickId {
            epoch: self.epoch,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        log::debug!("Tick {tick:?} on frame {}", frame.sequence());
        self.state = TickState::Pending {
            tick,
            dimensions: frame.dimensions(),
        };
        self.pending_frame = Some(frame.clone());
        Some((tick, frame))
    }

    /// Settles an inference call.
    ///
    /// Frees the in-flight slot, then applies the outcome unless it is
    /// stale. A failed call counts as "no face". Returns the detections to
    /// draw when applied.
    pub fn settle(
        &mut self,
        tick: TickId,
        outcome: Result<Vec<FaceAnalysis>, String>,
    ) -> Option<AppliedTick> {
        let TickState::Pending { tick: pending, .. } = self.state else {
            log::debug!("Ignoring result for {tick:?}: nothing pending");
            return None;
        };
        if pending != tick {
            log::debug!("Ignoring result for {tick:?}: {pending:?} is pending");
            return None;
        }
        self.state = TickState::Settled(tick);
        let frame = self.pending_frame.take();

        if !self.active || tick.epoch != self.epoch {
            log::debug!("Discarding stale result for {tick:?}");
            return None;
        }

        let frame = frame?;
        let detections = outcome.unwrap_or_else(|e| {
            log::warn!("Detection failed, treating as no face: {e}");
            Vec::new()
        });
        self.latest = LatestResult::from_detections(&detections);
        Some(AppliedTick { detections, frame })
    }
}

impl Default for DetectionLoop {
    fn default() -> Self {
        Self::new()
    }
}
