//! Promotion QR token issuance and redemption.
//!
//! The customer device mints a signed, time-limited, single-use token that
//! is rendered as a QR code; a business-side scanner submits the decoded
//! string for redemption, which flips the backing promotion record to used
//! exactly once.

pub mod issuance;
pub mod models;
pub mod qr_render;
pub mod redemption;
pub mod token;
