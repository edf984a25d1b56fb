//! Server-bound timestamp policy.
//!
//! Every timestamp sent to the record store is truncated to whole seconds,
//! rendered in UTC, and carries a fixed `.000` fractional part so values from
//! devices with different clocks and time zones compare as plain strings.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Render `ts` in the normalized server form `YYYY-MM-DDTHH:MM:SS.000Z`.
#[must_use]
pub fn server_timestamp(ts: DateTime<Utc>) -> String {
    ts.trunc_subsecs(0).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time, truncated to the precision the server stores.
#[must_use]
pub fn server_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
