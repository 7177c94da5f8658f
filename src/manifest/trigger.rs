/// Parses the hour out of a stored "HH:MM" fetch time, rejecting anything
/// that isn't a full wall-clock time. Malformed values skip the user here,
/// before any events are loaded or audio synthesized.
pub fn parse_fetch_hour(fetch_time: &str) -> Result<u32, String> {
    let (hour_part, minute_part) = fetch_time
        .split_once(':')
        .ok_or_else(|| format!("Invalid fetch time '{}': expected HH:MM", fetch_time))?;
    let hour: u32 = hour_part
        .parse()
        .map_err(|e| format!("Invalid hour in fetch time '{}': {}", fetch_time, e))?;
    let minute: u32 = minute_part
        .parse()
        .map_err(|e| format!("Invalid minute in fetch time '{}': {}", fetch_time, e))?;
    if hour > 23 || minute > 59 {
        return Err(format!("Out-of-range fetch time: {}", fetch_time));
    }
    Ok(hour)
}

/// Hour-granularity gate: the scheduler fires once per hour, so a plain hour
/// match is enough. A forced trigger bypasses the gate for a manual refresh.
pub fn should_run(current_local_hour: u32, target_fetch_hour: u32, is_forced: bool) -> bool {
    is_forced || current_local_hour == target_fetch_hour
}
