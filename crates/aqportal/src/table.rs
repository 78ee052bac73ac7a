//! Grid-formatted text tables for console output.

use std::fmt;

/// A simple text table rendered with `+---+` borders.
///
/// ```
/// use aqportal::table::Table;
///
/// let mut table = Table::new(["Region", "AQI"]);
/// table.row(["Delhi", "212"]);
/// assert!(table.to_string().contains("| Delhi  | 212 |"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table with the given column headers.
    #[must_use]
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing cells render empty, extra cells are dropped.
    pub fn row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let mut cells: Vec<String> = cells.into_iter().map(|c| c.to_string()).collect();
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
        self
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

fn write_rule(f: &mut fmt::Formatter<'_>, widths: &[usize], fill: char) -> fmt::Result {
    for width in widths {
        write!(f, "+{}", fill.to_string().repeat(width + 2))?;
    }
    writeln!(f, "+")
}

fn write_cells(f: &mut fmt::Formatter<'_>, widths: &[usize], cells: &[String]) -> fmt::Result {
    for (cell, width) in cells.iter().zip(widths) {
        let pad = width - cell.chars().count();
        write!(f, "| {cell}{} ", " ".repeat(pad))?;
    }
    writeln!(f, "|")
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        write_rule(f, &widths, '-')?;
        write_cells(f, &widths, &self.headers)?;
        write_rule(f, &widths, '=')?;
        for row in &self.rows {
            write_cells(f, &widths, row)?;
            write_rule(f, &widths, '-')?;
        }
        Ok(())
    }
}
