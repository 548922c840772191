//! Append-only, column-growable table of bars.
//!
//! Rows are kept in insertion order and addressed either by position or by
//! their unique key. Every row always has exactly `cols()` values: adding a
//! column appends a zero to each row, removing one truncates each row.
//! Only the most recently added column can be removed (see
//! [`ColumnScope`] for the allocation discipline indicator code follows).

use std::collections::HashMap;
use std::ops::Range;

use crate::domain::column::{AsField, Column, ColumnScope};
use crate::domain::ohlcv::{OhlcvBar, PRICE_HEADERS};
use crate::domain::row::Row;
use crate::domain::window;

#[derive(Debug, Clone, Default)]
pub struct Matrix {
    rows: Vec<Row>,
    positions: HashMap<i64, usize>,
    headers: Vec<String>,
}

impl Matrix {
    /// Empty table with `cols` unnamed columns.
    pub fn new(cols: usize) -> Self {
        Self {
            rows: Vec::new(),
            positions: HashMap::new(),
            headers: vec![String::new(); cols],
        }
    }

    /// Empty table with one column per supplied name.
    pub fn with_headers<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: Vec::new(),
            positions: HashMap::new(),
            headers: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Standard six-column price matrix, one row per bar.
    pub fn from_bars(bars: &[OhlcvBar]) -> Self {
        let mut matrix = Self::with_headers(PRICE_HEADERS);
        for bar in bars {
            let row = matrix.add_row(bar.key());
            for (field, value) in bar.values().into_iter().enumerate() {
                row.set(field, value);
            }
        }
        matrix
    }

    /// Returns the row for `key`, appending a zero-filled one if it is new.
    pub fn add_row(&mut self, key: i64) -> &mut Row {
        let width = self.headers.len();
        let rows = &mut self.rows;
        let position = *self.positions.entry(key).or_insert_with(|| {
            rows.push(Row::new(key, width));
            rows.len() - 1
        });
        &mut self.rows[position]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cols(&self) -> usize {
        self.headers.len()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn header(&self, field: impl AsField) -> &str {
        self.headers
            .get(field.field())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    pub fn row_by_key(&self, key: i64) -> Option<&Row> {
        self.positions.get(&key).map(|&pos| &self.rows[pos])
    }

    /// Position of the row with `key`.
    pub fn position(&self, key: i64) -> Option<usize> {
        self.positions.get(&key).copied()
    }

    /// Value at (`row`, `field`); `0.0` when either is out of range.
    pub fn get(&self, row: usize, field: impl AsField) -> f64 {
        self.rows.get(row).map(|r| r.get(field)).unwrap_or(0.0)
    }

    /// Writes a value; out-of-range coordinates are ignored.
    pub fn set(&mut self, row: usize, field: impl AsField, value: f64) {
        if let Some(r) = self.rows.get_mut(row) {
            r.set(field, value);
        }
    }

    /// All values of one field, in row order.
    pub fn column_values(&self, field: impl AsField) -> Vec<f64> {
        self.rows.iter().map(|r| r.get(field)).collect()
    }

    pub fn add_column(&mut self) -> Column {
        self.add_named_column(String::new())
    }

    pub fn add_named_column(&mut self, name: impl Into<String>) -> Column {
        self.headers.push(name.into());
        for row in &mut self.rows {
            row.push_field();
        }
        Column::new(self.headers.len() - 1)
    }

    /// Pops the most recently added column from every row and the headers.
    pub fn remove_column(&mut self) {
        if self.headers.pop().is_some() {
            for row in &mut self.rows {
                row.pop_field();
            }
        }
    }

    /// Opens a scope whose temporaries are released when it is dropped.
    pub fn scope(&mut self) -> ColumnScope<'_> {
        ColumnScope::new(self)
    }

    fn clamp(&self, start: usize, count: usize) -> Range<usize> {
        let end = start.saturating_add(count).min(self.rows.len());
        start.min(end)..end
    }

    /// Smallest value of `field` over `[start, start + count)`, clamped to
    /// the table. An empty range yields `0.0`.
    pub fn find_min_between(&self, field: impl AsField, start: usize, count: usize) -> f64 {
        self.find_min_max_between(field, start, count).0
    }

    /// Largest value of `field` over `[start, start + count)`, clamped to
    /// the table. An empty range yields `0.0`.
    pub fn find_max_between(&self, field: impl AsField, start: usize, count: usize) -> f64 {
        self.find_min_max_between(field, start, count).1
    }

    pub fn find_min_max_between(
        &self,
        field: impl AsField,
        start: usize,
        count: usize,
    ) -> (f64, f64) {
        let range = self.clamp(start, count);
        if range.is_empty() {
            return (0.0, 0.0);
        }
        self.rows[range]
            .iter()
            .map(|r| r.get(field))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Position of the largest value in the clamped range; the latest row
    /// wins a tie.
    pub fn find_max_index_between(
        &self,
        field: impl AsField,
        start: usize,
        count: usize,
    ) -> Option<usize> {
        let range = self.clamp(start, count);
        let mut best: Option<(usize, f64)> = None;
        for i in range {
            let value = self.rows[i].get(field);
            if best.is_none_or(|(_, b)| value >= b) {
                best = Some((i, value));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Position of the smallest value in the clamped range; the latest row
    /// wins a tie.
    pub fn find_min_index_between(
        &self,
        field: impl AsField,
        start: usize,
        count: usize,
    ) -> Option<usize> {
        let range = self.clamp(start, count);
        let mut best: Option<(usize, f64)> = None;
        for i in range {
            let value = self.rows[i].get(field);
            if best.is_none_or(|(_, b)| value <= b) {
                best = Some((i, value));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Sum of `field` over the clamped range.
    pub fn partial_sum(&self, field: impl AsField, start: usize, count: usize) -> f64 {
        let range = self.clamp(start, count);
        self.rows[range].iter().map(|r| r.get(field)).sum()
    }

    /// Population standard deviation of `field` over `period` rows around
    /// each row's SMA, as a new column.
    pub fn std_dev(&mut self, field: impl AsField, period: usize) -> Column {
        window::std_dev(self, period, field.field())
    }
}
