use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    /// Total promotion tokens minted
    pub static ref TOKENS_ISSUED_TOTAL: IntCounter = register_int_counter!(
        "promo_tokens_issued_total",
        "Total number of promotion tokens issued"
    )
    .unwrap();

    /// Redemption attempts by outcome: accepted, one of the rejection
    /// codes, or transient_error
    pub static ref REDEMPTION_ATTEMPTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "promo_redemption_attempts_total",
        "Total number of redemption attempts by outcome",
        &["outcome"]
    )
    .unwrap();
}

pub fn record_token_issued() {
    TOKENS_ISSUED_TOTAL.inc();
}

pub fn record_redemption_attempt(outcome: &str) {
    REDEMPTION_ATTEMPTS_TOTAL
        .with_label_values(&[outcome])
        .inc();
}
