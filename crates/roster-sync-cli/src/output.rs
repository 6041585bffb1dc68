use roster_sync_core::store::StoreCounts;
use roster_sync_core::SyncResult;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Left-aligned text table. Columns size to their widest cell.
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: impl IntoIterator<Item = String>) -> &mut Self {
        self.rows.push(cells.into_iter().collect());
        self
    }

    /// One row per counter, labelled with its phase.
    pub fn sync_counters(result: &SyncResult) -> Self {
        let mut table = Self::new(&["PHASE", "COUNTER", "COUNT"]);
        for (phase, counter, n) in result.counters() {
            table.row([
                format!("{}. {phase}", phase.ordinal()),
                counter.to_string(),
                n.to_string(),
            ]);
        }
        table
    }

    /// One row per store table.
    pub fn store_counts(counts: &StoreCounts) -> Self {
        let mut table = Self::new(&["TABLE", "ROWS"]);
        for (name, n) in [
            ("members", counts.members),
            ("lectures", counts.lectures),
            ("questions", counts.questions),
            ("practice_plans", counts.practice_plans),
            ("practices", counts.practices),
            ("activity_points", counts.activity_points),
            ("accumulation_logs", counts.accumulation_logs),
            ("quiz_history", counts.quiz_history),
        ] {
            table.row([name.to_string(), n.to_string()]);
        }
        table
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        let mut lines = vec![
            pad(self.headers.iter().copied(), &widths),
            pad(rule.iter().map(String::as_str), &widths),
        ];
        lines.extend(
            self.rows
                .iter()
                .map(|row| pad(row.iter().map(String::as_str), &widths)),
        );
        lines.join("\n")
    }

    pub fn print(&self) {
        println!("{}", self.render());
    }
}

fn pad<'c>(cells: impl Iterator<Item = &'c str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:w$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}
