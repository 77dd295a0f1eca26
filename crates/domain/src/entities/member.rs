//! Members of the world, including the legal identities of companies

use serde::{Deserialize, Serialize};

use crate::value_objects::{MemberId, PropertyId, SettlementId};

/// Length of one world day in world seconds
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// A span of world time during which a member counted as active
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveSpan {
    pub start: f64,
    pub end: f64,
}

impl ActiveSpan {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Seconds of this span that fall inside `[from, to]`
    pub fn overlap(&self, from: f64, to: f64) -> f64 {
        (self.end.min(to) - self.start.max(from)).max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    /// Settlement the member is a direct citizen of
    pub citizenship: Option<SettlementId>,
    /// Homestead recorded for the member; for a legal identity this is the HQ
    pub homestead: Option<PropertyId>,
    pub online: bool,
    /// World seconds of the last logout
    pub logout_time: f64,
    pub active_time: Vec<ActiveSpan>,
}

impl Member {
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            citizenship: None,
            homestead: None,
            online: false,
            logout_time: 0.0,
            active_time: Vec::new(),
        }
    }

    /// Active seconds within the `window` seconds before `now`
    pub fn active_seconds_in_last(&self, window: f64, now: f64) -> f64 {
        let from = now - window;
        self.active_time.iter().map(|s| s.overlap(from, now)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_clips_to_window() {
        let span = ActiveSpan::new(10.0, 20.0);
        assert!((span.overlap(15.0, 30.0) - 5.0).abs() < f64::EPSILON);
        assert!(span.overlap(25.0, 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn active_seconds_sums_spans_in_window() {
        let mut m = Member::new(MemberId::new(), "Legal");
        m.active_time.push(ActiveSpan::new(0.0, 100.0));
        m.active_time.push(ActiveSpan::new(SECONDS_PER_DAY, SECONDS_PER_DAY + 50.0));
        let now = SECONDS_PER_DAY + 60.0;
        let active = m.active_seconds_in_last(SECONDS_PER_DAY, now);
        // first span ends at 100, window starts at 60
        assert!((active - 90.0).abs() < 1e-9);
    }
}
