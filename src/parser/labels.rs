//! Label table and jump target resolution

use std::collections::HashMap;

/// Label name → 1-based line number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: HashMap<String, usize>,
}

impl LabelTable {
    /// Register every line whose first token ends with `:`.
    /// A label declared twice points at its last declaration.
    pub fn build<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut labels = HashMap::new();

        for (index, line) in lines.iter().enumerate() {
            let Some(token) = line.as_ref().split_whitespace().next() else {
                continue;
            };
            let Some(name) = token.strip_suffix(':') else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            if let Some(previous) = labels.insert(name.to_string(), index + 1) {
                log::warn!(
                    "label '{name}' declared again at line {}, first at line {previous}",
                    index + 1
                );
            }
        }

        Self { labels }
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Resolve a jump target to a 1-based line number.
    ///
    /// Numbers are taken as line numbers without consulting the table, so the
    /// result may lie outside the script. Otherwise the label is looked up as
    /// written, then with one trailing `:` removed.
    pub fn resolve(&self, target: &str) -> Option<i64> {
        if let Ok(line) = target.parse::<i64>() {
            return Some(line);
        }

        self.get(target)
            .or_else(|| target.strip_suffix(':').and_then(|name| self.get(name)))
            .map(|line| line as i64)
    }

    /// Resolve a target to a 0-based index, checking it is within `[1, line_count]`
    pub fn resolve_index(&self, target: &str, line_count: usize) -> Option<usize> {
        let line = self.resolve(target)?;
        if line >= 1 && line <= line_count as i64 {
            Some(line as usize - 1)
        } else {
            None
        }
    }
}
