//! Voltage filter for transmission-grade substations

use crate::models::Substation;

/// Keeps substations whose voltage is known and at least `min_voltage`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoltageFilter {
    pub min_voltage: u64,
}

impl VoltageFilter {
    pub fn new(min_voltage: u64) -> Self {
        Self { min_voltage }
    }

    /// Inclusive: a substation exactly at the threshold passes
    pub fn accepts(&self, substation: &Substation) -> bool {
        substation.voltage.is_some_and(|v| v >= self.min_voltage)
    }

    /// Drop every substation below the threshold, preserving order
    pub fn apply(&self, substations: Vec<Substation>) -> Vec<Substation> {
        let total = substations.len();
        let kept: Vec<Substation> = substations.into_iter().filter(|s| self.accepts(s)).collect();

        tracing::info!(
            min_voltage = self.min_voltage,
            kept = kept.len(),
            rejected = total - kept.len(),
            "Filtered substations by voltage"
        );
        kept
    }
}
