//! SQL response cleaner.
//!
//! Normalizes raw model output into a bare SQL string. Models sometimes wrap
//! their answer in markdown code fences despite being told not to.

/// Strips markdown fences and surrounding whitespace from model output.
pub struct SqlCleaner;

impl SqlCleaner {
    /// Cleans a raw model response into a bare SQL string.
    ///
    /// Best-effort textual transform, applied in order:
    /// - trim leading/trailing whitespace;
    /// - a leading ```` ```sql ```` fence removes the opening and all closing
    ///   fence markers;
    /// - a leading generic ```` ``` ```` fence removes all fence markers;
    /// - otherwise the text passes through unchanged.
    ///
    /// Does not parse or validate SQL syntax. Idempotent.
    pub fn clean(raw: &str) -> String {
        let sql = raw.trim();
        if sql.starts_with("```sql") {
            sql.replace("```sql", "").replace("```", "").trim().to_string()
        } else if sql.starts_with("```") {
            sql.replace("```", "").trim().to_string()
        } else {
            sql.to_string()
        }
    }
}
