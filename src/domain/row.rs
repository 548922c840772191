//! One bar of a [`Matrix`](crate::domain::matrix::Matrix): a key, a
//! fixed-width value vector and a free-text comment.

use crate::domain::column::AsField;

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    key: i64,
    values: Vec<f64>,
    comment: String,
}

impl Row {
    pub(crate) fn new(key: i64, width: usize) -> Self {
        Self {
            key,
            values: vec![0.0; width],
            comment: String::new(),
        }
    }

    pub fn key(&self) -> i64 {
        self.key
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// Value at `field`, or `0.0` when the field is beyond this row's width.
    pub fn get(&self, field: impl AsField) -> f64 {
        self.values.get(field.field()).copied().unwrap_or(0.0)
    }

    /// Writes `value` at `field`. Out-of-range writes are ignored.
    pub fn set(&mut self, field: impl AsField, value: f64) -> &mut Self {
        if let Some(slot) = self.values.get_mut(field.field()) {
            *slot = value;
        }
        self
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = comment.into();
        self
    }

    pub(crate) fn push_field(&mut self) {
        self.values.push(0.0);
    }

    pub(crate) fn pop_field(&mut self) {
        self.values.pop();
    }
}
