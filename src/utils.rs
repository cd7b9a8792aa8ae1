use crc::{Crc, CRC_32_CKSUM};

pub fn now_nanos() -> i64 {
    return std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0);
}

pub fn compute_crc32(parts: &[&[u8]]) -> u32 {
    let crc = Crc::<u32>::new(&CRC_32_CKSUM);
    let mut digest = crc.digest();
    for part in parts {
        digest.update(part);
    }
    return digest.finalize();
}

/// Local calendar date as YYYYMMDD, the default session id.
pub fn today_session_id() -> i32 {
    let today = chrono::Local::now().date_naive();
    return date_session_id(today);
}

pub fn date_session_id(date: chrono::NaiveDate) -> i32 {
    use chrono::Datelike;
    return date.year() * 10000 + date.month() as i32 * 100 + date.day() as i32;
}

/// Renders creation timestamps for log lines.
pub fn format_nanos(nanos: i64) -> String {
    let time = chrono::DateTime::from_timestamp_nanos(nanos);
    return time.format("%Y-%m-%d %H:%M:%S%.9f").to_string();
}
