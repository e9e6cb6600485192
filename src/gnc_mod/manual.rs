// ---------------------------------------------------------------------------
// Manual override input
// ---------------------------------------------------------------------------

/// Discrete direction event from the host's input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualDirection {
    Negative,
    Positive,
}

impl ManualDirection {
    pub fn sign(self) -> f64 {
        match self {
            ManualDirection::Negative => -1.0,
            ManualDirection::Positive => 1.0,
        }
    }
}

/// A manual override held over a time window, as a host would see a key
/// held down between `start` and `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualInput {
    pub start: f64, // s
    pub end: f64,   // s
    pub direction: ManualDirection,
}

impl ManualInput {
    pub fn new(start: f64, end: f64, direction: ManualDirection) -> Self {
        Self { start, end, direction }
    }

    pub fn active_at(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}
