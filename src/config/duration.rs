//! Duration parsing utilities.

use anyhow::Context;
use std::time::Duration;

/// Parse a duration string like "1d", "12h", "30m", "300s", "300".
/// Supports:
/// - Plain numbers (interpreted as seconds): "300"
/// - Seconds suffix: "300s"
/// - Minutes suffix: "30m"
/// - Hours suffix: "12h"
/// - Days suffix: "1d"
pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty duration string");
    }

    let units: [(char, u64, &str); 4] = [
        ('d', 86_400, "days"),
        ('h', 3_600, "hours"),
        ('m', 60, "minutes"),
        ('s', 1, "seconds"),
    ];
    for (suffix, scale, name) in units {
        if let Some(num_str) = s.strip_suffix(suffix) {
            let value: u64 = num_str
                .trim()
                .parse()
                .with_context(|| format!("Invalid {name} value: {num_str}"))?;
            let secs = value
                .checked_mul(scale)
                .with_context(|| format!("Duration too large: {s}"))?;
            return Ok(Duration::from_secs(secs));
        }
    }

    // No suffix - treat as seconds
    let secs: u64 = s
        .parse()
        .with_context(|| format!("Invalid duration value: {s}"))?;
    Ok(Duration::from_secs(secs))
}
