//! Outbreak Threshold
//!
//! Early-warning flag derived from the class-1 probability. The threshold is
//! kept low on purpose: a missed outbreak costs more than a false alarm.

/// Probability above which a prediction raises the outbreak flag.
pub const OUTBREAK_PROBABILITY_THRESHOLD: f64 = 0.1;

/// `1` iff the probability is present and strictly above the threshold.
pub fn outbreak_flag(probability: Option<f64>) -> u8 {
    match probability {
        Some(p) if p > OUTBREAK_PROBABILITY_THRESHOLD => 1,
        _ => 0,
    }
}
