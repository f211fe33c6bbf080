use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use std::collections::HashMap;

/// A sheet representing a 2D grid of cells (row-major storage)
///
/// Once a header has been promoted with [`Sheet::name_columns_by_row`], the
/// header lives in `column_names` and `data` holds only the data rows.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
    column_names: Option<Vec<String>>,
    column_index: Option<HashMap<String, usize>>,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            data: Vec::new(),
            column_names: None,
            column_index: None,
        }
    }

    /// Create a sheet from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let converted: Vec<Vec<CellValue>> = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        Sheet {
            name: "Sheet1".to_string(),
            data: converted,
            column_names: None,
            column_index: None,
        }
    }

    /// Create a sheet with a named header and the given data rows
    pub fn from_columns<S: AsRef<str>>(names: &[S], rows: Vec<Vec<CellValue>>) -> Result<Self> {
        for row in &rows {
            if row.len() != names.len() {
                return Err(SheetError::LengthMismatch {
                    expected: names.len(),
                    actual: row.len(),
                });
            }
        }

        let mut sheet = Sheet::new();
        sheet.data = rows;
        sheet.set_column_names(names.iter().map(|n| n.as_ref().to_string()).collect())?;
        Ok(sheet)
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        match &self.column_names {
            Some(names) => names.len(),
            None => self.data.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    /// Check if the sheet is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.column_names.as_ref().map_or(true, Vec::is_empty)
    }

    // ===== Cell Access =====

    /// Get a cell value by row and column (0-based)
    pub fn get(&self, row: usize, col: usize) -> Result<&CellValue> {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .ok_or(SheetError::IndexOutOfBounds {
                row,
                col,
                rows: self.row_count(),
                cols: self.col_count(),
            })
    }

    /// Set a cell value by row and column (0-based)
    pub fn set<T: Into<CellValue>>(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let rows = self.row_count();
        let cols = self.col_count();
        let cell = self
            .data
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(SheetError::IndexOutOfBounds {
                row,
                col,
                rows,
                cols,
            })?;
        *cell = value.into();
        Ok(())
    }

    /// Get a cell value by row index and column name
    pub fn get_by_name(&self, row: usize, col_name: &str) -> Result<&CellValue> {
        let col = self.column_index_by_name(col_name)?;
        self.get(row, col)
    }

    // ===== Row Operations =====

    /// Get a row by index
    pub fn row(&self, index: usize) -> Result<&Vec<CellValue>> {
        self.data.get(index).ok_or(SheetError::RowIndexOutOfBounds {
            index,
            count: self.row_count(),
        })
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }

    /// Get the raw data
    #[must_use]
    pub fn data(&self) -> &Vec<Vec<CellValue>> {
        &self.data
    }

    /// Get mutable access to the raw data
    ///
    /// Callers that change row widths must re-apply the header afterwards.
    pub fn data_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        &mut self.data
    }

    // ===== Named Access =====

    /// Promote the specified row to column headers and remove it from the data
    ///
    /// Labels are kept as written, surrounding whitespace included. Blank
    /// header cells are named `Unnamed: <index>`. Rows shorter than the header
    /// are padded with nulls.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::DuplicateColumnName` if the header row contains duplicate names.
    pub fn name_columns_by_row(&mut self, row_index: usize) -> Result<()> {
        let header_row = self.row(row_index)?.clone();
        let width = self.data.iter().map(Vec::len).max().unwrap_or(0);

        let names: Vec<String> = (0..width)
            .map(|i| {
                let label = header_row.get(i).map(CellValue::as_str).unwrap_or_default();
                if label.trim().is_empty() {
                    format!("Unnamed: {i}")
                } else {
                    label
                }
            })
            .collect();

        // Validate before mutating so a failed promotion leaves the sheet intact
        build_index(&names)?;

        self.data.remove(row_index);
        self.set_column_names(names)
    }

    /// Get column names (if set)
    #[must_use]
    pub fn column_names(&self) -> Option<&Vec<String>> {
        self.column_names.as_ref()
    }

    /// Check whether a named column exists
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index
            .as_ref()
            .is_some_and(|index| index.contains_key(name))
    }

    /// Get an entire column (data rows only) by name
    pub fn column_by_name(&self, name: &str) -> Result<Vec<CellValue>> {
        let index = self.column_index_by_name(name)?;
        Ok(self
            .data
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or_default())
            .collect())
    }

    /// Append a named column to the end of each row
    pub fn column_append_named<T: Into<CellValue>>(&mut self, name: &str, data: Vec<T>) -> Result<()> {
        let mut names = self.column_names.clone().ok_or_else(|| {
            SheetError::ColumnsNotNamed("Call name_columns_by_row() first".to_string())
        })?;

        if self.has_column(name) {
            return Err(SheetError::ColumnAlreadyExists {
                name: name.to_string(),
            });
        }

        if data.len() != self.row_count() {
            return Err(SheetError::LengthMismatch {
                expected: self.row_count(),
                actual: data.len(),
            });
        }

        for (row, value) in self.data.iter_mut().zip(data) {
            row.push(value.into());
        }

        names.push(name.to_string());
        self.set_column_names(names)
    }

    /// Cherry-pick columns: keep only the specified columns, in the given order
    pub fn select_columns<S: AsRef<str>>(&mut self, columns: &[S]) -> Result<()> {
        let indices = columns
            .iter()
            .map(|name| self.column_index_by_name(name.as_ref()))
            .collect::<Result<Vec<usize>>>()?;

        let new_names: Vec<String> = columns.iter().map(|s| s.as_ref().to_string()).collect();
        build_index(&new_names)?;

        for row in &mut self.data {
            let new_row: Vec<CellValue> = indices
                .iter()
                .map(|&i| row.get(i).cloned().unwrap_or_default())
                .collect();
            *row = new_row;
        }

        self.set_column_names(new_names)
    }

    /// Install a header, padding short rows with nulls
    fn set_column_names(&mut self, names: Vec<String>) -> Result<()> {
        let index = build_index(&names)?;
        let width = names.len();
        for row in &mut self.data {
            if row.len() < width {
                row.resize(width, CellValue::Null);
            }
        }
        self.column_names = Some(names);
        self.column_index = Some(index);
        Ok(())
    }

    /// Get the column index by name
    fn column_index_by_name(&self, name: &str) -> Result<usize> {
        self.column_index
            .as_ref()
            .ok_or_else(|| {
                SheetError::ColumnsNotNamed("Call name_columns_by_row() first".to_string())
            })?
            .get(name)
            .copied()
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })
    }
}

fn build_index(names: &[String]) -> Result<HashMap<String, usize>> {
    let mut index_map = HashMap::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        if index_map.insert(name.clone(), i).is_some() {
            return Err(SheetError::DuplicateColumnName { name: name.clone() });
        }
    }
    Ok(index_map)
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Sheet {
        let mut sheet = Sheet::from_data(vec![
            vec!["Sample", "SiO2", "Al2O3"],
            vec!["GR-01", "72.1", "14.2"],
            vec!["GR-02", "70.4", "15.0"],
        ]);
        sheet.name_columns_by_row(0).unwrap();
        sheet
    }

    #[test]
    fn test_new_sheet() {
        let sheet = Sheet::new();
        assert_eq!(sheet.name(), "Sheet1");
        assert!(sheet.is_empty());
        assert_eq!(sheet.row_count(), 0);
        assert_eq!(sheet.col_count(), 0);
    }

    #[test]
    fn test_name_columns_removes_header_row() {
        let sheet = samples();
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(
            sheet.column_names().unwrap(),
            &vec!["Sample".to_string(), "SiO2".to_string(), "Al2O3".to_string()]
        );
        assert_eq!(sheet.get_by_name(1, "SiO2").unwrap().as_str(), "70.4");
    }

    #[test]
    fn test_blank_headers_are_named_by_position() {
        let mut sheet = Sheet::from_data(vec![
            vec![CellValue::from("Sample"), CellValue::Null, CellValue::from("  ")],
            vec![CellValue::from("A"), CellValue::Int(1), CellValue::Int(2)],
        ]);
        sheet.name_columns_by_row(0).unwrap();
        let names = sheet.column_names().unwrap();
        assert_eq!(names[1], "Unnamed: 1");
        assert_eq!(names[2], "Unnamed: 2");
    }

    #[test]
    fn test_duplicate_header_is_rejected_without_mutation() {
        let mut sheet = Sheet::from_data(vec![vec!["Ba", "Ba"], vec!["1", "2"]]);
        let err = sheet.name_columns_by_row(0).unwrap_err();
        assert!(matches!(err, SheetError::DuplicateColumnName { name } if name == "Ba"));
        assert_eq!(sheet.row_count(), 2);
        assert!(sheet.column_names().is_none());
    }

    #[test]
    fn test_header_labels_keep_whitespace() {
        let mut sheet = Sheet::from_data(vec![vec!["Ba", "Ba ", " SiO2", "  "], vec!["1", "2", "3", "4"]]);
        sheet.name_columns_by_row(0).unwrap();
        assert_eq!(
            sheet.column_names().unwrap(),
            &vec!["Ba".to_string(), "Ba ".to_string(), " SiO2".to_string(), "Unnamed: 3".to_string()]
        );
        assert_eq!(sheet.get_by_name(0, "Ba ").unwrap(), &CellValue::from("2"));
        assert!(!sheet.has_column("SiO2"));
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let mut sheet = Sheet::from_data(vec![
            vec![CellValue::from("a"), CellValue::from("b"), CellValue::from("c")],
            vec![CellValue::Int(1)],
        ]);
        sheet.name_columns_by_row(0).unwrap();
        assert_eq!(sheet.row(0).unwrap().len(), 3);
        assert!(sheet.get(0, 2).unwrap().is_null());
    }

    #[test]
    fn test_column_append_named() {
        let mut sheet = samples();
        sheet
            .column_append_named("TiO2", vec![CellValue::Null, CellValue::Null])
            .unwrap();
        assert_eq!(sheet.col_count(), 4);
        assert!(sheet.has_column("TiO2"));
        assert!(sheet.column_by_name("TiO2").unwrap().iter().all(CellValue::is_null));

        let err = sheet.column_append_named("TiO2", vec![1, 2]).unwrap_err();
        assert!(matches!(err, SheetError::ColumnAlreadyExists { .. }));

        let err = sheet.column_append_named("MgO", vec![1]).unwrap_err();
        assert!(matches!(err, SheetError::LengthMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_select_columns_reorders() {
        let mut sheet = samples();
        sheet.select_columns(&["Al2O3", "Sample"]).unwrap();
        assert_eq!(sheet.col_count(), 2);
        assert_eq!(sheet.get(0, 0).unwrap().as_str(), "14.2");
        assert_eq!(sheet.get(1, 1).unwrap().as_str(), "GR-02");
    }

    #[test]
    fn test_select_unknown_column() {
        let mut sheet = samples();
        let err = sheet.select_columns(&["Sample", "Zr"]).unwrap_err();
        assert!(matches!(err, SheetError::ColumnNotFound { name } if name == "Zr"));
    }

    #[test]
    fn test_from_columns_length_check() {
        let err = Sheet::from_columns(&["a", "b"], vec![vec![CellValue::Int(1)]]).unwrap_err();
        assert!(matches!(err, SheetError::LengthMismatch { expected: 2, actual: 1 }));
    }
}
