//! Catalog access interface and a column-oriented in-memory implementation.

use std::collections::HashMap;
use thiserror::Error;

/// Catalog field holding the physical galaxy size.
pub const SIZE_FIELD: &str = "size_true";

/// Read access to a simulated galaxy catalog.
///
/// Implementations expose per-object redshifts plus named numeric columns of
/// the same length. A `NaN` entry in a column means the value is missing for
/// that object.
pub trait GalaxyCatalog {
    /// Number of objects in the catalog.
    fn len(&self) -> usize;

    /// True when the catalog holds no objects.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Redshift of every object, indexed like the columns.
    fn redshifts(&self) -> &[f64];

    /// Named column, or `None` when the catalog does not carry it.
    fn column(&self, field: &str) -> Option<&[f64]>;
}

/// Column length does not match the catalog's object count.
#[derive(Error, Debug)]
#[error("column '{name}' has {got} values, catalog holds {expected} objects")]
pub struct ColumnLengthError {
    /// Name of the offending column.
    pub name: String,
    /// Length of the rejected column.
    pub got: usize,
    /// Object count the column must match.
    pub expected: usize,
}

/// In-memory catalog backed by parallel `Vec<f64>` columns.
#[derive(Debug, Clone, Default)]
pub struct ColumnCatalog {
    redshifts: Vec<f64>,
    columns: HashMap<String, Vec<f64>>,
}

impl ColumnCatalog {
    /// Create a catalog with the given per-object redshifts and no columns.
    pub fn new(redshifts: Vec<f64>) -> Self {
        ColumnCatalog {
            redshifts,
            columns: HashMap::new(),
        }
    }

    /// Attach a named column; its length must match the object count.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), ColumnLengthError> {
        let name = name.into();
        if values.len() != self.redshifts.len() {
            return Err(ColumnLengthError {
                got: values.len(),
                expected: self.redshifts.len(),
                name,
            });
        }
        self.columns.insert(name, values);
        Ok(())
    }
}

impl GalaxyCatalog for ColumnCatalog {
    fn len(&self) -> usize {
        self.redshifts.len()
    }

    fn redshifts(&self) -> &[f64] {
        &self.redshifts
    }

    fn column(&self, field: &str) -> Option<&[f64]> {
        self.columns.get(field).map(|v| v.as_slice())
    }
}
