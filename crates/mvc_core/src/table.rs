use shared::{
    model::{field_named, model_values},
    Model, MvcError, MvcResult, Value, ValueType,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub ty: ValueType,
}

/// Tabular data source: named typed columns, optional primary key and rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    columns: Vec<Column>,
    primary_key: Option<usize>,
    rows: Vec<Vec<Value>>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.add_column(name, ty);
        self
    }

    pub fn add_column(&mut self, name: impl Into<String>, ty: ValueType) {
        self.columns.push(Column {
            name: name.into(),
            ty,
        });
        for row in &mut self.rows {
            row.push(Value::Null);
        }
    }

    /// Columns and rows taken from a model sequence, one column per field.
    pub fn from_models<M: Model>(models: &[M]) -> Self {
        let mut table = Self::new();
        for field in M::fields() {
            table.add_column(field.name(), field.value_type());
        }
        table.rows = models
            .iter()
            .map(|model| model_values(model).into_iter().map(|(_, v)| v).collect())
            .collect();
        table
    }

    pub fn set_primary_key(&mut self, column: &str) -> MvcResult<()> {
        let index = self
            .column_index(column)
            .ok_or_else(|| MvcError::argument("primary_key", format!("no column named '{column}'")))?;
        self.primary_key = Some(index);
        Ok(())
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> MvcResult<()> {
        if row.len() != self.columns.len() {
            return Err(MvcError::argument(
                "row",
                format!(
                    "expected {} values, got {}",
                    self.columns.len(),
                    row.len()
                ),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.name == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|column| column.name.eq_ignore_ascii_case(name))
            })
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Column that identifies rows: the primary key, else the first column.
    pub fn key_column(&self) -> Option<&Column> {
        self.primary_key
            .and_then(|index| self.columns.get(index))
            .or_else(|| self.columns.first())
    }

    /// First row whose `column` equals `key`, comparing after converting the
    /// key to the column's type.
    pub fn find_row(&self, column: &str, key: &Value) -> Option<usize> {
        let index = self.column_index(column)?;
        let ty = self.columns[index].ty;
        let key = key.convert_to(ty).unwrap_or_else(|_| key.clone());
        self.rows
            .iter()
            .position(|row| row.get(index) == Some(&key))
    }

    /// Copies every non-null cell of `row` into the same-named field of
    /// `target`. A cell that fails to convert is skipped; the first such
    /// failure is returned once the rest of the row has been copied.
    pub fn copy_row_into<M: Model>(&self, row: usize, target: &mut M) -> MvcResult<()> {
        let cells = self.rows.get(row).ok_or_else(|| MvcError::ModelRowNotFound {
            key: "row".into(),
            value: row.to_string(),
        })?;
        let mut first_failure = None;
        for (column, cell) in self.columns.iter().zip(cells) {
            if cell.is_null() {
                continue;
            }
            let Some(field) = field_named::<M>(&column.name) else {
                continue;
            };
            if let Err(source) = field.assign(target, cell.clone()) {
                first_failure.get_or_insert(MvcError::ModelUpdate {
                    field: field.name().to_string(),
                    source,
                });
            }
        }
        first_failure.map_or(Ok(()), Err)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.rows
                .iter()
                .map(|row| {
                    serde_json::Value::Object(
                        self.columns
                            .iter()
                            .zip(row)
                            .map(|(column, value)| (column.name.clone(), value.to_json()))
                            .collect(),
                    )
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use shared::Field;

    use super::*;

    #[derive(Debug, Clone, Default)]
    struct Dept {
        code: String,
        head_count: i64,
        budget: Option<f64>,
    }

    impl Model for Dept {
        const NAME: &'static str = "Dept";

        fn fields() -> Vec<Field<Self>> {
            shared::fields!(Dept {
                code: String => "Code",
                head_count: i64 => "HeadCount",
                budget: Option<f64> => "Budget",
            })
        }
    }

    fn depts() -> DataTable {
        let mut table = DataTable::new()
            .with_column("Code", ValueType::Text)
            .with_column("HeadCount", ValueType::Int)
            .with_column("Floor", ValueType::Int);
        table
            .push_row(vec!["A".into(), 3i64.into(), 1i64.into()])
            .expect("row");
        table
            .push_row(vec!["B".into(), Value::Null, 2i64.into()])
            .expect("row");
        table
    }

    #[test]
    fn key_column_prefers_primary_key() {
        let mut table = depts();
        assert_eq!(table.key_column().map(|c| c.name.as_str()), Some("Code"));
        table.set_primary_key("floor").expect("column exists");
        assert_eq!(table.key_column().map(|c| c.name.as_str()), Some("Floor"));
    }

    #[test]
    fn find_row_converts_key_to_column_type() {
        let table = depts();
        assert_eq!(table.find_row("Floor", &Value::from("2")), Some(1));
        assert_eq!(table.find_row("Floor", &Value::Int(9)), None);
    }

    #[test]
    fn copy_skips_null_cells_and_unknown_columns() {
        let table = depts();
        let mut dept = Dept {
            head_count: 7,
            ..Dept::default()
        };
        table.copy_row_into(1, &mut dept).expect("copy");
        assert_eq!(dept.code, "B");
        assert_eq!(dept.head_count, 7);
    }

    #[test]
    fn model_table_mirrors_fields() {
        let table = DataTable::from_models(&[Dept {
            code: "Z".into(),
            head_count: 1,
            budget: None,
        }]);
        let names: Vec<_> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Code", "HeadCount", "Budget"]);
        assert_eq!(table.value(0, "budget"), Some(&Value::Null));
    }

    #[test]
    fn rejects_rows_of_wrong_width() {
        let mut table = depts();
        assert!(matches!(
            table.push_row(vec![Value::Null]),
            Err(MvcError::Argument { .. })
        ));
    }
}
