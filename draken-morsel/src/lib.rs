//! The morsel: an ordered, named group of vectors with a common row count,
//! the unit of execution a query engine passes around.
//!
//! A morsel owns handles (`Arc<Vector>`) to its columns, never the
//! columns' buffers. `select` and `rename` share those handles instead of
//! copying; `take` materializes new owned vectors.

#![forbid(unsafe_code)]

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, RecordBatch, RecordBatchOptions};
use arrow::datatypes::{Field, Schema};
use draken_result::{Error, Result};
use draken_types::{TypeTag, Value};
use draken_vector::Vector;
use rustc_hash::FxHashMap;

#[derive(Clone, Debug)]
pub struct Morsel {
    num_rows: usize,
    columns: Vec<Arc<Vector>>,
    names: Vec<String>,
    types: Vec<TypeTag>,
}

impl Morsel {
    /// Assemble a morsel from name/vector pairs, checking that every
    /// column has the same row count.
    pub fn try_new(columns: Vec<(String, Arc<Vector>)>) -> Result<Self> {
        let num_rows = columns.first().map_or(0, |(_, v)| v.len());
        for (name, vector) in &columns {
            if vector.len() != num_rows {
                tracing::warn!(column = %name, "column row count disagrees with the morsel");
                return Err(Error::length_mismatch(num_rows, vector.len()));
            }
        }
        let mut names = Vec::with_capacity(columns.len());
        let mut types = Vec::with_capacity(columns.len());
        let mut vectors = Vec::with_capacity(columns.len());
        for (name, vector) in columns {
            names.push(name);
            types.push(vector.type_tag());
            vectors.push(vector);
        }
        Ok(Self {
            num_rows,
            columns: vectors,
            names,
            types,
        })
    }

    /// Wrap an Arrow record batch, one borrowed vector per column. A
    /// zero-column batch is legal here; use
    /// [`from_record_batch_strict`](Morsel::from_record_batch_strict) to
    /// reject it.
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        let mut columns = Vec::with_capacity(batch.num_columns());
        for (field, array) in batch.schema().fields().iter().zip(batch.columns()) {
            let vector = Vector::from_arrow(array)?;
            columns.push((field.name().clone(), Arc::new(vector)));
        }
        let mut morsel = Self::try_new(columns)?;
        // A zero-column batch still carries a row count.
        morsel.num_rows = batch.num_rows();
        tracing::debug!(
            rows = morsel.num_rows,
            cols = morsel.columns.len(),
            "built morsel from record batch"
        );
        Ok(morsel)
    }

    /// Like [`from_record_batch`](Morsel::from_record_batch) but fails
    /// with `EmptySchema` when the batch has no columns.
    pub fn from_record_batch_strict(batch: &RecordBatch) -> Result<Self> {
        if batch.num_columns() == 0 {
            return Err(Error::EmptySchema);
        }
        Self::from_record_batch(batch)
    }

    /// Build from a chunked table: per-column chunks are combined into one
    /// contiguous array before wrapping. All batches must share a schema.
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Self> {
        match batches {
            [] => Err(Error::EmptySchema),
            [single] => Self::from_record_batch(single),
            many => {
                let schema = many[0].schema();
                let mut columns = Vec::with_capacity(schema.fields().len());
                for (i, field) in schema.fields().iter().enumerate() {
                    let chunks: Vec<ArrayRef> =
                        many.iter().map(|b| b.column(i).clone()).collect();
                    let vector = Vector::from_chunks(&chunks)?;
                    columns.push((field.name().clone(), Arc::new(vector)));
                }
                Self::try_new(columns)
            }
        }
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows, self.columns.len())
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column_types(&self) -> &[TypeTag] {
        &self.types
    }

    pub fn columns(&self) -> &[Arc<Vector>] {
        &self.columns
    }

    /// Look up a column by name: linear scan, first match wins when names
    /// repeat.
    pub fn column(&self, name: &str) -> Result<Arc<Vector>> {
        self.column_index(name)
            .map(|i| self.columns[i].clone())
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// One row as scalar values, in column order. A column whose element
    /// access fails (non-native columns) contributes a null placeholder.
    pub fn row(&self, i: usize) -> Result<Vec<Value>> {
        if i >= self.num_rows {
            return Err(Error::index_out_of_range(i as i64, self.num_rows));
        }
        Ok(self
            .columns
            .iter()
            .map(|c| c.value(i).unwrap_or(Value::Null))
            .collect())
    }

    /// Gather rows at `indices` across every column. Names and types are
    /// preserved; the result owns fresh vectors.
    pub fn take(&self, indices: &[i32]) -> Result<Morsel> {
        let mut columns = Vec::with_capacity(self.columns.len());
        for (name, vector) in self.names.iter().zip(&self.columns) {
            columns.push((name.clone(), Arc::new(vector.take(indices)?)));
        }
        let mut morsel = Self::try_new(columns)?;
        // Zero-column morsels still reshape to the selection.
        morsel.num_rows = if self.columns.is_empty() {
            indices.len()
        } else {
            morsel.num_rows
        };
        Ok(morsel)
    }

    /// Project columns by name, preserving the requested order. The result
    /// shares the same vector handles.
    pub fn select(&self, names: &[&str]) -> Result<Morsel> {
        let mut columns = Vec::with_capacity(names.len());
        for &name in names {
            let index = self
                .column_index(name)
                .ok_or_else(|| Error::ColumnNotFound(name.to_string()))?;
            columns.push((self.names[index].clone(), self.columns[index].clone()));
        }
        let mut morsel = Self::try_new(columns)?;
        morsel.num_rows = self.num_rows;
        Ok(morsel)
    }

    /// Replace every column name positionally; the name count must match
    /// the column count. Shares the same vector handles.
    pub fn rename_all(&self, names: Vec<String>) -> Result<Morsel> {
        if names.len() != self.columns.len() {
            return Err(Error::length_mismatch(self.columns.len(), names.len()));
        }
        Ok(Self {
            num_rows: self.num_rows,
            columns: self.columns.clone(),
            names,
            types: self.types.clone(),
        })
    }

    /// Rename through an old → new mapping; unlisted names stay unchanged.
    pub fn rename(&self, mapping: &FxHashMap<String, String>) -> Result<Morsel> {
        let names = self
            .names
            .iter()
            .map(|n| mapping.get(n).unwrap_or(n).clone())
            .collect();
        self.rename_all(names)
    }

    /// Export as an Arrow record batch with the current column names.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = Vec::with_capacity(self.columns.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.columns.len());
        for (name, vector) in self.names.iter().zip(&self.columns) {
            let array = vector.to_arrow();
            fields.push(Field::new(name, array.data_type().clone(), true));
            arrays.push(array);
        }
        let schema = Arc::new(Schema::new(fields));
        let options = RecordBatchOptions::new().with_row_count(Some(self.num_rows));
        Ok(RecordBatch::try_new_with_options(schema, arrays, &options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};
    use draken_types::CompareOp;

    fn sample_batch() -> RecordBatch {
        let x: ArrayRef = Arc::new(Int64Array::from(vec![
            Some(1),
            Some(2),
            Some(3),
            None,
            Some(5),
        ]));
        let y: ArrayRef = Arc::new(StringArray::from(vec![
            Some("a"),
            Some("bb"),
            Some(""),
            Some("ccc"),
            None,
        ]));
        RecordBatch::try_from_iter(vec![("x", x), ("y", y)]).unwrap()
    }

    #[test]
    fn from_batch_shape_and_lookup() {
        let m = Morsel::from_record_batch(&sample_batch()).unwrap();
        assert_eq!(m.shape(), (5, 2));
        assert_eq!(m.column_names(), &["x".to_string(), "y".to_string()]);
        assert_eq!(m.column_types(), &[TypeTag::Int64, TypeTag::String]);
        assert_eq!(m.column("x").unwrap().null_count(), 1);
        assert!(matches!(
            m.column("z"),
            Err(Error::ColumnNotFound(_))
        ));
    }

    #[test]
    fn duplicate_names_first_match_wins() {
        let a = Arc::new(Vector::Int64(
            draken_vector::Int64Vector::from_values(vec![1]),
        ));
        let b = Arc::new(Vector::Int64(
            draken_vector::Int64Vector::from_values(vec![2]),
        ));
        let m = Morsel::try_new(vec![("x".into(), a), ("x".into(), b)]).unwrap();
        assert_eq!(m.column("x").unwrap().value(0).unwrap(), Value::Int64(1));
    }

    #[test]
    fn row_access_with_null_placeholder() {
        let m = Morsel::from_record_batch(&sample_batch()).unwrap();
        assert_eq!(
            m.row(0).unwrap(),
            vec![Value::Int64(1), Value::Bytes(b"a".to_vec())]
        );
        assert_eq!(m.row(3).unwrap()[0], Value::Null);
        assert!(matches!(m.row(5), Err(Error::IndexOutOfRange { .. })));
    }

    #[test]
    fn take_preserves_names_types_and_nulls() {
        let m = Morsel::from_record_batch(&sample_batch()).unwrap();
        let t = m.take(&[4, 0, 3]).unwrap();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.column_names(), m.column_names());
        assert_eq!(t.column_types(), m.column_types());
        assert_eq!(t.row(0).unwrap(), vec![Value::Int64(5), Value::Null]);
        assert_eq!(
            t.row(2).unwrap(),
            vec![Value::Null, Value::Bytes(b"ccc".to_vec())]
        );
    }

    #[test]
    fn take_out_of_range() {
        let m = Morsel::from_record_batch(&sample_batch()).unwrap();
        assert!(matches!(
            m.take(&[0, 5]),
            Err(Error::IndexOutOfRange { index: 5, length: 5 })
        ));
    }

    #[test]
    fn select_preserves_order_and_shares_handles() {
        let m = Morsel::from_record_batch(&sample_batch()).unwrap();
        let s = m.select(&["y", "x"]).unwrap();
        assert_eq!(s.column_names(), &["y".to_string(), "x".to_string()]);
        assert!(Arc::ptr_eq(
            &m.column("y").unwrap(),
            &s.column("y").unwrap()
        ));
        assert!(matches!(
            m.select(&["missing"]),
            Err(Error::ColumnNotFound(_))
        ));
    }

    #[test]
    fn rename_positional_and_mapped() {
        let m = Morsel::from_record_batch(&sample_batch()).unwrap();
        let r = m.rename_all(vec!["col1".into(), "col2".into()]).unwrap();
        assert_eq!(r.column_names(), &["col1".to_string(), "col2".to_string()]);
        assert!(matches!(
            m.rename_all(vec!["only_one".into()]),
            Err(Error::LengthMismatch { left: 2, right: 1 })
        ));

        let mut mapping = FxHashMap::default();
        mapping.insert("x".to_string(), "alpha".to_string());
        let partial = m.rename(&mapping).unwrap();
        assert_eq!(
            partial.column_names(),
            &["alpha".to_string(), "y".to_string()]
        );
    }

    #[test]
    fn round_trip_to_record_batch() {
        let m = Morsel::from_record_batch(&sample_batch()).unwrap();
        let batch = m.to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 5);
        assert_eq!(batch.num_columns(), 2);
        assert_eq!(batch.schema().field(0).name(), "x");
        let x = batch.column(0);
        let x = x.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(x.value(0), 1);
        assert!(x.is_null(3));
    }

    #[test]
    fn strict_mode_rejects_zero_columns() {
        let options = RecordBatchOptions::new().with_row_count(Some(3));
        let empty =
            RecordBatch::try_new_with_options(Arc::new(Schema::empty()), vec![], &options)
                .unwrap();
        assert!(matches!(
            Morsel::from_record_batch_strict(&empty),
            Err(Error::EmptySchema)
        ));
        // Lenient mode keeps the row count.
        let m = Morsel::from_record_batch(&empty).unwrap();
        assert_eq!(m.shape(), (3, 0));
    }

    #[test]
    fn kernels_compose_over_columns() {
        let m = Morsel::from_record_batch(&sample_batch()).unwrap();
        let x = m.column("x").unwrap();
        let mask = x.compare_scalar(CompareOp::Gt, &Value::Int64(1)).unwrap();
        assert_eq!(mask.as_bytes(), &[0, 1, 1, 0, 1]);
    }
}
