use crate::cell::{date_num_format, CellValue};
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Options for reading Excel files
#[derive(Debug, Clone, Default)]
pub struct XlsxReadOptions {
    /// Whether the first row contains headers
    pub has_headers: bool,
}

impl XlsxReadOptions {
    /// Set whether the first row contains headers
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }
}

/// A span of columns whose data cells get a font color on write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnHighlight {
    /// First column of the span (0-based, inclusive)
    pub first_col: usize,
    /// Last column of the span (0-based, inclusive)
    pub last_col: usize,
    /// Font color as 0xRRGGBB
    pub font_color: u32,
}

impl ColumnHighlight {
    #[must_use]
    pub fn contains(&self, col: usize) -> bool {
        (self.first_col..=self.last_col).contains(&col)
    }
}

/// Options for writing Excel files
#[derive(Debug, Clone, Default)]
pub struct XlsxWriteOptions {
    /// Column spans whose data cells (header excluded) are written in a font color
    pub highlights: Vec<ColumnHighlight>,
}

impl XlsxWriteOptions {
    /// Add a highlighted column span
    #[must_use]
    pub fn with_highlight(mut self, highlight: ColumnHighlight) -> Self {
        self.highlights.push(highlight);
        self
    }
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        // Serial days since 1899-12-30; written back with a date number format
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

fn open_xlsx(path: &Path) -> Result<Xlsx<BufReader<File>>> {
    Ok(open_workbook(path)?)
}

/// Get sheet names from an Excel file without loading data
///
/// # Errors
///
/// Returns error if the file cannot be opened as a workbook or has no sheets.
pub fn xlsx_sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let workbook = open_xlsx(path.as_ref())?;
    let names: Vec<String> = workbook.sheet_names().iter().map(|s| s.to_string()).collect();
    if names.is_empty() {
        return Err(SheetError::NoSheets);
    }
    Ok(names)
}

impl Sheet {
    /// Load a specific sheet from an Excel file by name
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened, sheet not found, or read fails.
    pub fn from_xlsx_sheet<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Self> {
        Self::from_xlsx_sheet_with_options(path, sheet_name, XlsxReadOptions::default())
    }

    /// Load a specific sheet from an Excel file with options
    ///
    /// A sheet with no cells loads as an empty sheet (with an empty header
    /// when `has_headers` is set).
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened, sheet not found, or read fails.
    pub fn from_xlsx_sheet_with_options<P: AsRef<Path>>(
        path: P,
        sheet_name: &str,
        options: XlsxReadOptions,
    ) -> Result<Self> {
        let mut workbook = open_xlsx(path.as_ref())?;

        if !workbook.sheet_names().iter().any(|s| s == sheet_name) {
            return Err(SheetError::SheetNotFound {
                name: sheet_name.to_string(),
            });
        }

        let range = workbook.worksheet_range(sheet_name)?;

        let data: Vec<Vec<CellValue>> = range
            .rows()
            .map(|row| row.iter().map(data_to_cell_value).collect())
            .collect();

        let mut sheet = Sheet::with_name(sheet_name);
        *sheet.data_mut() = data;

        if options.has_headers {
            if sheet.row_count() > 0 {
                sheet.name_columns_by_row(0)?;
            } else {
                sheet = Sheet::from_columns::<String>(&[], Vec::new())?;
                sheet.set_name(sheet_name);
            }
        }

        debug!(
            sheet = sheet_name,
            rows = sheet.row_count(),
            cols = sheet.col_count(),
            "loaded xlsx sheet"
        );
        Ok(sheet)
    }

    /// Save the sheet to an Excel file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or written.
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_as_xlsx_with(path, &XlsxWriteOptions::default())
    }

    /// Save the sheet to an Excel file, applying the font highlights in `options`
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or written.
    pub fn save_as_xlsx_with<P: AsRef<Path>>(&self, path: P, options: &XlsxWriteOptions) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        self.write_to_worksheet(worksheet, options)?;

        workbook.save(path.as_ref())?;
        Ok(())
    }

    /// Write header and data rows to a worksheet
    fn write_to_worksheet(&self, worksheet: &mut Worksheet, options: &XlsxWriteOptions) -> Result<()> {
        worksheet.set_name(self.name())?;

        let formats: Vec<(ColumnHighlight, Format)> = options
            .highlights
            .iter()
            .map(|h| (*h, Format::new().set_font_color(Color::RGB(h.font_color))))
            .collect();

        let mut row_offset = 0u32;
        if let Some(names) = self.column_names() {
            for (col_idx, name) in names.iter().enumerate() {
                worksheet.write_string(0, to_col(col_idx)?, name)?;
            }
            row_offset = 1;
        }

        for (row_idx, row) in self.data().iter().enumerate() {
            let row_num = u32::try_from(row_idx)
                .ok()
                .and_then(|r| r.checked_add(row_offset))
                .ok_or_else(|| SheetError::Workbook("Row index overflow".to_string()))?;

            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = to_col(col_idx)?;
                let format = formats
                    .iter()
                    .find(|(h, _)| h.contains(col_idx))
                    .map(|(_, f)| f);

                match (cell, format) {
                    (CellValue::Null, None) => {} // Leave empty
                    (CellValue::Null, Some(format)) => {
                        worksheet.write_blank(row_num, col_num, format)?;
                    }
                    (CellValue::Bool(b), None) => {
                        worksheet.write_boolean(row_num, col_num, *b)?;
                    }
                    (CellValue::Bool(b), Some(format)) => {
                        worksheet.write_boolean_with_format(row_num, col_num, *b, format)?;
                    }
                    // Note: Excel stores all numbers as f64, so integers > 2^53
                    // may lose precision
                    (CellValue::Int(i), None) => {
                        worksheet.write_number(row_num, col_num, *i as f64)?;
                    }
                    (CellValue::Int(i), Some(format)) => {
                        worksheet.write_number_with_format(row_num, col_num, *i as f64, format)?;
                    }
                    (CellValue::Float(f), None) => {
                        worksheet.write_number(row_num, col_num, *f)?;
                    }
                    (CellValue::Float(f), Some(format)) => {
                        worksheet.write_number_with_format(row_num, col_num, *f, format)?;
                    }
                    (CellValue::DateTime(serial), highlight) => {
                        let format = highlight
                            .cloned()
                            .unwrap_or_else(Format::new)
                            .set_num_format(date_num_format(*serial));
                        worksheet.write_number_with_format(row_num, col_num, *serial, &format)?;
                    }
                    (CellValue::String(s), None) => {
                        worksheet.write_string(row_num, col_num, s)?;
                    }
                    (CellValue::String(s), Some(format)) => {
                        worksheet.write_string_with_format(row_num, col_num, s, format)?;
                    }
                }
            }
        }

        Ok(())
    }
}

fn to_col(col_idx: usize) -> Result<u16> {
    u16::try_from(col_idx).map_err(|_| SheetError::Workbook("Column index overflow".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn named(rows: Vec<Vec<CellValue>>) -> Sheet {
        let mut sheet = Sheet::from_data(rows);
        sheet.name_columns_by_row(0).unwrap();
        sheet
    }

    #[test]
    fn test_xlsx_write_and_read_with_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.xlsx");

        let sheet = named(vec![
            vec!["Sample".into(), "SiO2".into(), "Notes".into()],
            vec!["GR-01".into(), 72.1.into(), "fresh".into()],
            vec!["GR-02".into(), 70.4.into(), CellValue::Null],
        ]);
        sheet.save_as_xlsx(&path).unwrap();

        let loaded = Sheet::from_xlsx_sheet_with_options(
            &path,
            "Sheet1",
            XlsxReadOptions::default().with_headers(true),
        )
        .unwrap();

        assert_eq!(loaded.column_names(), sheet.column_names());
        assert_eq!(loaded.row_count(), 2);
        assert!(matches!(loaded.get_by_name(0, "SiO2").unwrap(), CellValue::Float(f) if (*f - 72.1).abs() < 1e-9));
        assert!(loaded.get_by_name(1, "Notes").unwrap().is_null());
    }

    #[test]
    fn test_xlsx_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("types.xlsx");

        let mut sheet = Sheet::new();
        *sheet.data_mut() = vec![vec![
            CellValue::String("text".to_string()),
            CellValue::Int(42),
            CellValue::Float(0.25),
            CellValue::Bool(true),
        ]];
        sheet.save_as_xlsx(&path).unwrap();

        let loaded = Sheet::from_xlsx_sheet(&path, "Sheet1").unwrap();
        assert_eq!(loaded.row_count(), 1);
        assert!(matches!(loaded.get(0, 0).unwrap(), CellValue::String(s) if s == "text"));
        // Int becomes Float in Excel
        assert!(matches!(loaded.get(0, 1).unwrap(), CellValue::Float(f) if (*f - 42.0).abs() < 0.01));
        assert!(matches!(loaded.get(0, 3).unwrap(), CellValue::Bool(true)));
    }

    #[test]
    fn test_header_only_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("header_only.xlsx");

        let sheet = Sheet::from_columns(&["Sample", "SiO2"], Vec::new()).unwrap();
        sheet.save_as_xlsx(&path).unwrap();

        let loaded = Sheet::from_xlsx_sheet_with_options(
            &path,
            "Sheet1",
            XlsxReadOptions::default().with_headers(true),
        )
        .unwrap();
        assert_eq!(loaded.row_count(), 0);
        assert_eq!(loaded.col_count(), 2);
    }

    #[test]
    fn test_xlsx_sheet_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("named.xlsx");

        let mut sheet = Sheet::from_data(vec![vec![1, 2, 3]]);
        sheet.set_name("Granites");
        sheet.save_as_xlsx(&path).unwrap();

        assert_eq!(xlsx_sheet_names(&path).unwrap(), vec!["Granites".to_string()]);
    }

    #[test]
    fn test_missing_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.xlsx");
        Sheet::from_data(vec![vec![1]]).save_as_xlsx(&path).unwrap();

        let err = Sheet::from_xlsx_sheet(&path, "Nope").unwrap_err();
        assert!(matches!(err, SheetError::SheetNotFound { name } if name == "Nope"));
    }

    #[test]
    fn test_not_a_workbook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bogus.xlsx");
        std::fs::write(&path, b"definitely not a zip").unwrap();

        let err = xlsx_sheet_names(&path).unwrap_err();
        assert!(matches!(err, SheetError::Workbook(_)));
    }

    #[test]
    fn test_date_cells_round_trip_as_dates() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("dated.xlsx");

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        worksheet.write_string(0, 0, "Sample").unwrap();
        worksheet.write_string(0, 1, "Collected").unwrap();
        worksheet.write_string(1, 0, "GR-01").unwrap();
        worksheet
            .write_number_with_format(1, 1, 44269.0, &date_format)
            .unwrap();
        workbook.save(&source).unwrap();

        let options = XlsxReadOptions::default().with_headers(true);
        let loaded = Sheet::from_xlsx_sheet_with_options(&source, "Sheet1", options.clone()).unwrap();
        let cell = loaded.get_by_name(0, "Collected").unwrap();
        assert_eq!(cell, &CellValue::DateTime(44269.0));
        assert_eq!(cell.to_string(), "2021-03-14");

        // written back with a date format, inside a highlighted column too
        let out = dir.path().join("out.xlsx");
        let write_options = XlsxWriteOptions::default().with_highlight(ColumnHighlight {
            first_col: 1,
            last_col: 1,
            font_color: 0xFF0000,
        });
        loaded.save_as_xlsx_with(&out, &write_options).unwrap();

        let reloaded = Sheet::from_xlsx_sheet_with_options(&out, "Sheet1", options).unwrap();
        assert_eq!(
            reloaded.get_by_name(0, "Collected").unwrap(),
            &CellValue::DateTime(44269.0)
        );
        let colors = crate::styles::inspect_font_colors(&out).unwrap();
        assert_eq!(colors.get(&(1, 1)), Some(&0xFF0000));
        assert_eq!(colors.len(), 1);
    }

    #[test]
    fn test_highlight_contains() {
        let h = ColumnHighlight {
            first_col: 3,
            last_col: 4,
            font_color: 0xFF0000,
        };
        assert!(!h.contains(2));
        assert!(h.contains(3));
        assert!(h.contains(4));
        assert!(!h.contains(5));
    }
}
