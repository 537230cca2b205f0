//! Donation-log parsing.
//!
//! Two textual encodings feed the tracker: comma-separated
//! `character,outfit,amount` triples for the full simulation path (amounts
//! are scaled during parsing), and tab-separated `character<TAB>amount`
//! pairs for the aggregate-only statistics path. Malformed lines are
//! skipped, never fatal.

use serde::{Deserialize, Serialize};

use crate::constants::DONATION_LOG_SCALE;
use crate::donation::Donation;

/// A donation with no outfit targeting, used by the aggregate path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDonation {
    pub character: String,
    pub amount: f64,
}

/// Parse a comma-separated donation log into simulation donations.
#[must_use]
pub fn parse_donation_log(contents: &str) -> Vec<Donation> {
    contents.lines().filter_map(parse_donation_line).collect()
}

/// Parse one `character,outfit,amount` line. The amount keeps only its
/// integral part and is scaled by the log factor.
#[must_use]
pub fn parse_donation_line(line: &str) -> Option<Donation> {
    let mut fields = line.split(',');
    let character = fields.next()?.trim();
    let outfit = fields.next()?.trim();
    let amount = fields.next()?.trim();
    if character.is_empty() || outfit.is_empty() || amount.is_empty() {
        return None;
    }
    let amount: f64 = amount.parse().ok()?;
    Some(Donation {
        character: character.to_string(),
        outfit: outfit.to_string(),
        amount: amount.trunc() * DONATION_LOG_SCALE,
    })
}

/// Parse a tab-separated raw donation log.
#[must_use]
pub fn parse_raw_log(contents: &str) -> Vec<RawDonation> {
    contents.lines().filter_map(parse_raw_line).collect()
}

/// Parse one `character<TAB>amount` line; the amount keeps only its
/// integral part and is not scaled.
#[must_use]
pub fn parse_raw_line(line: &str) -> Option<RawDonation> {
    let (character, amount) = line.split_once('\t')?;
    let character = character.trim();
    let amount = amount.trim();
    if character.is_empty() || amount.is_empty() {
        return None;
    }
    let amount: f64 = amount.parse().ok()?;
    Some(RawDonation {
        character: character.to_string(),
        amount: amount.trunc(),
    })
}
