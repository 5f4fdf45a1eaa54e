//! Time helpers shared by host adapters and the session engine.

use chrono::Utc;

/// Returns today's date as a `YYYY-MM-DD` stamp for display metadata.
pub fn date_stamp_now() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
