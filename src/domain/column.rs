//! Column handles and scoped temporary allocation.
//!
//! Columns of a [`Matrix`] form a stack. A [`Column`] is a durable handle to
//! a result column; it stays valid as long as nothing at or below it is
//! popped. Indicator code obtains scratch space through a [`ColumnScope`],
//! which hands out [`Temp`] handles and pops every column allocated under it
//! when dropped, newest first. A `Temp` cannot be turned into a `Column`, so
//! a scratch column can never be handed back to a caller.

use crate::domain::matrix::Matrix;

/// Anything that names a field of a row.
pub trait AsField: Copy {
    fn field(self) -> usize;
}

impl AsField for usize {
    fn field(self) -> usize {
        self
    }
}

/// Durable handle to a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column(usize);

impl Column {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// Handle of the `n`-th ancillary column that follows this one.
    pub fn offset(self, n: usize) -> Column {
        Column(self.0 + n)
    }
}

impl AsField for Column {
    fn field(self) -> usize {
        self.0
    }
}

/// Scratch column handle, only meaningful while its scope is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temp(usize);

impl Temp {
    pub fn index(self) -> usize {
        self.0
    }
}

impl AsField for Temp {
    fn field(self) -> usize {
        self.0
    }
}

/// Guard over a matrix that releases all columns allocated while it lives.
pub struct ColumnScope<'m> {
    matrix: &'m mut Matrix,
    base: usize,
}

impl<'m> ColumnScope<'m> {
    pub(crate) fn new(matrix: &'m mut Matrix) -> Self {
        let base = matrix.cols();
        Self { matrix, base }
    }

    /// Allocates a zero-filled scratch column.
    pub fn temp(&mut self) -> Temp {
        Temp(self.matrix.add_column().index())
    }

    /// Runs a column-producing function against the matrix and adopts its
    /// result (and anything else it left behind) as scratch space. `f` may
    /// only append columns.
    pub fn call<F>(&mut self, f: F) -> Temp
    where
        F: FnOnce(&mut Matrix) -> Column,
    {
        let column = f(&mut *self.matrix);
        debug_assert!(column.index() >= self.base);
        Temp(column.index())
    }

    pub fn get(&self, row: usize, field: impl AsField) -> f64 {
        self.matrix.get(row, field)
    }

    pub fn set(&mut self, row: usize, field: impl AsField, value: f64) {
        self.matrix.set(row, field, value);
    }

    /// Copies every value of `from` into `to`.
    pub fn copy(&mut self, from: impl AsField, to: impl AsField) {
        for i in 0..self.matrix.len() {
            let value = self.matrix.get(i, from);
            self.matrix.set(i, to, value);
        }
    }

    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    pub fn matrix(&self) -> &Matrix {
        &*self.matrix
    }
}

impl Drop for ColumnScope<'_> {
    fn drop(&mut self) {
        while self.matrix.cols() > self.base {
            self.matrix.remove_column();
        }
    }
}
