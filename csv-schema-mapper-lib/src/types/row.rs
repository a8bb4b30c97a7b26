use std::collections::HashMap;
use std::sync::Arc;

/// Column name to field position, shared by every row read from one CSV.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn from_record(headers: &csv::StringRecord) -> Self {
        let names: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let mut positions = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            // Duplicate headers resolve to the first occurrence
            positions.entry(name.clone()).or_insert(i);
        }
        Self { names, positions }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One CSV record, addressable by column name.
#[derive(Debug, Clone)]
pub struct Row {
    headers: Arc<HeaderIndex>,
    record: csv::StringRecord,
}

impl Row {
    pub fn new(headers: Arc<HeaderIndex>, record: csv::StringRecord) -> Self {
        Self { headers, record }
    }

    /// Returns `None` when the column is not in the header or the record is
    /// shorter than the header.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.headers
            .position(column)
            .and_then(|i| self.record.get(i))
    }

    /// Lookup that treats an absent column as an empty cell.
    pub fn get_or_empty(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn values(&self) -> Vec<String> {
        self.record.iter().map(|v| v.to_string()).collect()
    }

    pub fn line(&self) -> Option<u64> {
        self.record.position().map(|p| p.line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Arc<HeaderIndex> {
        Arc::new(HeaderIndex::from_record(&csv::StringRecord::from(
            names.to_vec(),
        )))
    }

    #[test]
    fn test_row_lookup() {
        let headers = headers(&["app", "db_col", "srv_col"]);
        let row = Row::new(
            Arc::clone(&headers),
            csv::StringRecord::from(vec!["A", "d1", "s1"]),
        );
        assert_eq!(row.get("db_col"), Some("d1"));
        assert_eq!(row.get("nope"), None);
        assert_eq!(row.get_or_empty("nope"), "");
    }

    #[test]
    fn test_short_record_is_absent() {
        let headers = headers(&["app", "db_col", "srv_col"]);
        let row = Row::new(headers, csv::StringRecord::from(vec!["A", "d1"]));
        assert_eq!(row.get("srv_col"), None);
    }

    #[test]
    fn test_duplicate_header_uses_first() {
        let headers = headers(&["a", "b", "a"]);
        assert_eq!(headers.position("a"), Some(0));
        assert_eq!(headers.len(), 3);
    }
}
