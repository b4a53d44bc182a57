use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::schema::Column;
use crate::value::Value;

static NULL: Value = Value::Null;

/// One row, positionally aligned with its dataset's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&NULL)
    }
}

/// An ordered, in-memory table of records sharing one set of columns.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    columns: Vec<Column>,
    column_lookup: HashMap<String, usize>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let column_lookup = columns
            .iter()
            .enumerate()
            .map(|(idx, col)| (col.name.clone(), idx))
            .collect();
        Self {
            name: name.into(),
            columns,
            column_lookup,
            records: Vec::new(),
        }
    }

    /// Append a row; short rows are padded with `Null`, long rows truncated.
    pub fn push(&mut self, mut values: Vec<Value>) {
        values.resize(self.columns.len(), Value::Null);
        self.records.push(Record::new(values));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, field: &str) -> Option<usize> {
        self.column_lookup.get(field).copied()
    }

    pub fn column(&self, field: &str) -> Option<&Column> {
        self.column_index(field).map(|idx| &self.columns[idx])
    }

    /// Column index, or `UnknownField` when the dataset has no such column.
    pub fn require_column(&self, field: &str) -> Result<usize> {
        self.column_index(field).ok_or_else(|| Error::UnknownField {
            dataset: self.name.clone(),
            field: field.to_string(),
        })
    }

    /// All values of one column in record order.
    pub fn field_values<'a>(
        &'a self,
        field: &str,
    ) -> Result<impl Iterator<Item = &'a Value> + use<'a>> {
        let idx = self.require_column(field)?;
        Ok(self.records.iter().map(move |record| record.get(idx)))
    }

    /// Sum of a column, treating empty and non-numeric cells as zero.
    pub fn sum(&self, field: &str) -> Result<f64> {
        Ok(self.field_values(field)?.map(Value::to_f64_or_zero).sum())
    }

    /// Sorted distinct values of a column.
    pub fn distinct_values(&self, field: &str) -> Result<Vec<Value>> {
        let values: BTreeSet<Value> = self.field_values(field)?.cloned().collect();
        Ok(values.into_iter().collect())
    }

    /// Copy of the dataset with a column appended, or replaced when a
    /// column of the same name exists. `values` must hold one entry per record.
    pub fn with_column(mut self, column: Column, values: Vec<Value>) -> Self {
        let idx = match self.column_lookup.get(&column.name) {
            Some(idx) => {
                self.columns[*idx] = column;
                *idx
            }
            None => {
                let idx = self.columns.len();
                self.column_lookup.insert(column.name.clone(), idx);
                self.columns.push(column);
                idx
            }
        };

        let width = self.columns.len();
        let mut values = values.into_iter();
        for record in &mut self.records {
            record.values.resize(width, Value::Null);
            record.values[idx] = values.next().unwrap_or(Value::Null);
        }
        self
    }

    /// Records matching `predicate`, original order preserved.
    pub fn subset<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Record) -> bool,
    {
        Self {
            name: self.name.clone(),
            columns: self.columns.clone(),
            column_lookup: self.column_lookup.clone(),
            records: self
                .records
                .iter()
                .filter(|record| predicate(record))
                .cloned()
                .collect(),
        }
    }
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.columns == other.columns && self.records == other.records
    }
}

/// Records whose `field` equals `value`, in their original order.
pub fn filter_by(dataset: &Dataset, field: &str, value: &Value) -> Result<Dataset> {
    let idx = dataset.require_column(field)?;
    Ok(dataset.subset(|record| record.get(idx) == value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn sample() -> Dataset {
        let mut dataset = Dataset::new(
            "installs",
            vec![
                Column::new("countryName", FieldType::Category),
                Column::new("installs", FieldType::Float),
            ],
        );
        dataset.push(vec!["DE".into(), Value::Float(3.0)]);
        dataset.push(vec!["US".into(), Value::Float(5.0)]);
        dataset.push(vec!["DE".into(), Value::Null]);
        dataset.push(vec!["FR".into()]);
        dataset
    }

    #[test]
    fn filter_preserves_order() {
        let dataset = sample();
        let filtered = filter_by(&dataset, "countryName", &"DE".into()).expect("filter");
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.records()[0].get(1), &Value::Float(3.0));
        assert_eq!(filtered.records()[1].get(1), &Value::Null);
    }

    #[test]
    fn filter_on_unknown_field_fails() {
        let err = filter_by(&sample(), "country", &"DE".into()).unwrap_err();
        assert!(matches!(err, Error::UnknownField { .. }));
    }

    #[test]
    fn short_rows_are_padded() {
        let dataset = sample();
        assert_eq!(dataset.records()[3].values().len(), 2);
        assert!(dataset.records()[3].get(1).is_null());
    }

    #[test]
    fn distinct_values_are_sorted() {
        let values = sample().distinct_values("countryName").expect("distinct");
        assert_eq!(values, vec![Value::from("DE"), "FR".into(), "US".into()]);
    }

    #[test]
    fn sum_treats_null_as_zero() {
        assert_eq!(sample().sum("installs").expect("sum"), 8.0);
    }

    #[test]
    fn with_column_replaces_existing_values() {
        let dataset = sample().with_column(
            Column::new("installs", FieldType::Float),
            vec![Value::Float(1.0); 4],
        );
        assert_eq!(dataset.columns().len(), 2);
        assert_eq!(dataset.sum("installs").expect("sum"), 4.0);
        assert_eq!(
            dataset.column("installs").map(|c| c.field_type),
            Some(FieldType::Float)
        );
    }
}
