/// Progress scaling
///
/// External tools report their own 0-100 percentage; a job reports a single
/// 0-100 percentage across all of its stages. A `ProgressWindow` is the slice
/// of the job scale that one tool run is allowed to move through.
use serde::{Deserialize, Serialize};

/// Map an external percentage `p` onto `[lo, hi]`
///
/// Computes `lo + floor(p / 100 * (hi - lo))` in integer arithmetic. `p` above
/// 100 is treated as 100 and an inverted window collapses to `lo`, so the
/// result always lies in `[lo, max(lo, hi)]`.
pub fn scale_progress(p: u32, lo: u8, hi: u8) -> u8 {
    let p = p.min(100);
    let span = u32::from(hi.saturating_sub(lo));
    lo + (p * span / 100) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressWindow {
    pub lo: u8,
    pub hi: u8,
}

impl ProgressWindow {
    pub const fn new(lo: u8, hi: u8) -> Self {
        Self { lo, hi }
    }

    pub fn scale(&self, p: u32) -> u8 {
        scale_progress(p, self.lo, self.hi)
    }
}
