//! Forecast payload URLs.
//!
//! Payloads are published per forecast hour under a timestamped name,
//! e.g. `UV_COMP/202403151400.wind` for 2024-03-15 14:00.

use chrono::{Duration, NaiveDateTime};

/// Payload location used by the public wind map.
pub const DEFAULT_PAYLOAD_TEMPLATE: &str = "https://cdn.wetterkarte.org/UV_COMP/{date}.wind";

/// Placeholder replaced by the forecast timestamp.
pub const DATE_PLACEHOLDER: &str = "{date}";

/// `YYYYMMDDHH00` for `base` shifted by `offset_hours`.
///
/// Minutes are always written as `00`: payloads exist per whole hour.
pub fn forecast_timestamp(base: NaiveDateTime, offset_hours: i64) -> String {
    let target = base + Duration::hours(offset_hours);
    target.format("%Y%m%d%H00").to_string()
}

/// Expand a payload URL template for a forecast offset.
pub fn payload_url(template: &str, base: NaiveDateTime, offset_hours: i64) -> String {
    template.replace(DATE_PLACEHOLDER, &forecast_timestamp(base, offset_hours))
}
