//! Tab-delimited results: header line of column names, one record per line.

/// One decoded row: column name to trimmed cell value, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultRecord {
    fields: Vec<(String, String)>,
}

impl ResultRecord {
    /// Sets `column` to `value`. A repeated column keeps its first position and
    /// takes the latest value.
    pub fn insert(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column.to_string(), value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ResultRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = ResultRecord::default();
        for (column, value) in iter {
            record.insert(column.as_ref(), value);
        }
        record
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSet {
    columns: Vec<String>,
    records: Vec<ResultRecord>,
}

impl ResultSet {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when there is at least one record carrying at least one column.
    pub fn has_content(&self) -> bool {
        self.records.first().is_some_and(|record| !record.is_empty())
    }

    /// Encodes the set back into header + rows, tab separated, newline terminated.
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        if self.columns.is_empty() {
            return out;
        }
        out.push_str(&self.columns.join("\t"));
        out.push('\n');
        for record in &self.records {
            let cells: Vec<&str> = self
                .columns
                .iter()
                .map(|column| record.get(column).unwrap_or(""))
                .collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
        out
    }
}

/// Decodes tab-delimited text. Never fails: short rows are padded with empty
/// values and cells beyond the header are dropped.
pub fn decode(raw: &str) -> ResultSet {
    let mut lines = raw
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return ResultSet::default();
    };
    let header: Vec<&str> = header_line.split('\t').collect();

    let mut columns: Vec<String> = Vec::with_capacity(header.len());
    for name in &header {
        if !columns.iter().any(|existing| existing == name) {
            columns.push((*name).to_string());
        }
    }

    let records = lines
        .map(|line| {
            let cells: Vec<&str> = line.split('\t').collect();
            let mut record = ResultRecord::default();
            for (index, column) in header.iter().enumerate() {
                let value = cells.get(index).map(|cell| cell.trim()).unwrap_or("");
                record.insert(column, value);
            }
            record
        })
        .collect();

    ResultSet { columns, records }
}
