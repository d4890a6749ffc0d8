//! Business-side correlation tags (`bizId`) for external tasks.

use chrono::Utc;

/// Prefix for tags generated by a retry.
pub const RETRY_PREFIX: &str = "retry";

/// Build `"<prefix>_<epoch-ms>"` for the current instant.
pub fn generate_biz_id(prefix: &str) -> String {
    format!("{prefix}_{}", Utc::now().timestamp_millis())
}

/// Like [`generate_biz_id`], but never equal to `previous`.
///
/// Two tags generated within the same millisecond would collide, so the
/// timestamp is bumped until the tag differs.
pub fn generate_biz_id_after(prefix: &str, previous: Option<&str>) -> String {
    let mut millis = Utc::now().timestamp_millis();
    loop {
        let tag = format!("{prefix}_{millis}");
        if previous != Some(tag.as_str()) {
            return tag;
        }
        millis += 1;
    }
}

/// Return the caller's tag if non-blank, otherwise generate one.
pub fn biz_id_or_generate(supplied: Option<&str>, prefix: &str) -> String {
    match supplied.map(str::trim).filter(|s| !s.is_empty()) {
        Some(tag) => tag.to_string(),
        None => generate_biz_id(prefix),
    }
}

/// Whether `tag` has the shape `"<prefix>_<digits>"`.
pub fn is_generated(tag: &str, prefix: &str) -> bool {
    tag.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
