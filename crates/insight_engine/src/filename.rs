use chrono::NaiveDate;

const MAX_TITLE_LEN: usize = 40;
const ID_PREFIX_LEN: usize = 6;

/// `{title}_{id prefix}.json` for a single exported result.
///
/// Every character outside `[A-Za-z0-9]` becomes `_` (two for characters
/// outside the Basic Multilingual Plane, matching a UTF-16 based browser
/// export), the rest is lower-cased and the title part is cut at 40
/// characters.
pub fn export_filename(title: &str, id: &str) -> String {
    let title = if title.is_empty() { "untitled" } else { title };
    let mut safe = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            safe.push(c.to_ascii_lowercase());
        } else {
            for _ in 0..c.len_utf16() {
                safe.push('_');
            }
        }
    }
    // Only ASCII remains, so byte truncation is safe.
    safe.truncate(MAX_TITLE_LEN);

    let id_prefix: String = id.chars().take(ID_PREFIX_LEN).collect();
    format!("{safe}_{id_prefix}.json")
}

/// Name of the whole-collection backup written when no folder is granted.
pub fn backup_filename(date: NaiveDate) -> String {
    format!("insight_backup_{}.json", date.format("%Y-%m-%d"))
}
