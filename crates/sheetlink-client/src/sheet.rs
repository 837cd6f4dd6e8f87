//! A single worksheet inside a remote spreadsheet.
//!
//! Every mutating call builds one or more [`Request`]s and hands them to the
//! sheet's [`BatchExecutor`]: they run immediately, or wait for
//! [`Sheet::flush`] when a batch is open.

use chrono::NaiveDate;
use sheetlink_batch::{BatchExecutor, RetryPolicy, Sleeper, Transport};
use sheetlink_core::{
    parse_grid_range, BasicFilter, BatchUpdateResponse, CellFormat, Dimension, DimensionProperties,
    DimensionRange, ExtendedValue, GridProperties, GridRange, MergeType, Request, SheetProperties,
};

use crate::error::{Result, SheetError};

pub struct Sheet<T> {
    sheet_id: i32,
    title: Option<String>,
    hidden: bool,
    executor: BatchExecutor<T>,
}

impl<T: Transport> Sheet<T> {
    pub fn new(spreadsheet_id: impl Into<String>, sheet_id: i32, transport: T) -> Self {
        Self {
            sheet_id,
            title: None,
            hidden: false,
            executor: BatchExecutor::new(spreadsheet_id, transport),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.executor = self.executor.with_policy(policy);
        self
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.executor = self.executor.with_sleeper(sleeper);
        self
    }

    pub fn sheet_id(&self) -> i32 {
        self.sheet_id
    }

    pub fn spreadsheet_id(&self) -> &str {
        self.executor.spreadsheet_id()
    }

    /// Last title set through [`Sheet::rename`]. It may not have reached the
    /// remote yet if the rename is still queued.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn executor(&self) -> &BatchExecutor<T> {
        &self.executor
    }

    // Batching

    pub fn start_batch(&mut self) {
        self.executor.start_batch();
    }

    pub fn clear_batch(&mut self) {
        self.executor.clear_batch();
    }

    pub fn is_batching(&self) -> bool {
        self.executor.is_batching()
    }

    pub fn flush(&mut self) -> Result<Option<BatchUpdateResponse>> {
        Ok(self.executor.flush()?)
    }

    // Cell contents

    pub fn set_value(&mut self, range: &str, value: f64) -> Result<Option<BatchUpdateResponse>> {
        self.write(range, ExtendedValue::Number(value))
    }

    pub fn set_text(&mut self, range: &str, text: &str) -> Result<Option<BatchUpdateResponse>> {
        self.write(range, ExtendedValue::text(text))
    }

    pub fn set_boolean(&mut self, range: &str, value: bool) -> Result<Option<BatchUpdateResponse>> {
        self.write(range, ExtendedValue::Boolean(value))
    }

    pub fn set_formula(
        &mut self,
        range: &str,
        formula: &str,
    ) -> Result<Option<BatchUpdateResponse>> {
        if formula.trim().is_empty() {
            return Err(SheetError::InvalidArgument("formula is empty".to_string()));
        }
        self.write(range, ExtendedValue::formula(formula))
    }

    /// Store `date` as a spreadsheet serial number
    pub fn set_date(
        &mut self,
        range: &str,
        date: NaiveDate,
    ) -> Result<Option<BatchUpdateResponse>> {
        self.write(range, ExtendedValue::date(date))
    }

    /// Set the note on every cell of `range`, or remove it with `None`
    pub fn set_note(
        &mut self,
        range: &str,
        note: Option<&str>,
    ) -> Result<Option<BatchUpdateResponse>> {
        let range = self.range(range)?;
        self.submit(Request::set_note(range, note.map(str::to_string)))
    }

    /// Clear contents and formatting of `range`, or of the whole sheet
    pub fn clear(&mut self, range: Option<&str>) -> Result<Option<BatchUpdateResponse>> {
        let range = match range {
            Some(a1) => self.range(a1)?,
            None => GridRange::whole_sheet(self.sheet_id),
        };
        self.submit(Request::clear(range))
    }

    // Layout

    pub fn merge_cells(
        &mut self,
        range: &str,
        merge_type: MergeType,
    ) -> Result<Option<BatchUpdateResponse>> {
        let range = self.range(range)?;
        self.submit(Request::MergeCells { range, merge_type })
    }

    pub fn unmerge_cells(&mut self, range: &str) -> Result<Option<BatchUpdateResponse>> {
        let range = self.range(range)?;
        self.submit(Request::UnmergeCells { range })
    }

    pub fn format_cells(
        &mut self,
        range: &str,
        format: CellFormat,
    ) -> Result<Option<BatchUpdateResponse>> {
        if format.is_empty() {
            return Err(SheetError::InvalidArgument(
                "cell format sets no properties".to_string(),
            ));
        }
        let range = self.range(range)?;
        self.submit(Request::format(range, format))
    }

    /// Freeze leading rows and/or columns. `None` leaves that axis alone and
    /// nothing is sent when both are `None`.
    pub fn freeze(
        &mut self,
        rows: Option<u32>,
        columns: Option<u32>,
    ) -> Result<Option<BatchUpdateResponse>> {
        let mut fields = Vec::new();
        if rows.is_some() {
            fields.push("gridProperties.frozenRowCount");
        }
        if columns.is_some() {
            fields.push("gridProperties.frozenColumnCount");
        }
        if fields.is_empty() {
            return Ok(None);
        }

        self.submit(Request::UpdateSheetProperties {
            properties: SheetProperties {
                sheet_id: self.sheet_id,
                grid_properties: Some(GridProperties {
                    frozen_row_count: rows,
                    frozen_column_count: columns,
                }),
                ..SheetProperties::default()
            },
            fields: fields.join(","),
        })
    }

    /// Set the pixel width of the columns covered by `columns` (e.g. "C" or "B:D")
    pub fn set_column_width(
        &mut self,
        columns: &str,
        width: u32,
    ) -> Result<Option<BatchUpdateResponse>> {
        let range = self.bounded(columns, Dimension::Columns)?;
        self.resize(range, width)
    }

    /// Set the pixel height of the rows covered by `rows` (e.g. "A3" or "A2:A9")
    pub fn set_row_height(
        &mut self,
        rows: &str,
        height: u32,
    ) -> Result<Option<BatchUpdateResponse>> {
        let range = self.bounded(rows, Dimension::Rows)?;
        self.resize(range, height)
    }

    pub fn auto_resize_columns(&mut self, columns: &str) -> Result<Option<BatchUpdateResponse>> {
        let dimensions = self.bounded(columns, Dimension::Columns)?;
        self.submit(Request::AutoResizeDimensions { dimensions })
    }

    // Dimensions

    pub fn append_rows(&mut self, count: u32) -> Result<Option<BatchUpdateResponse>> {
        self.append(Dimension::Rows, count)
    }

    pub fn append_columns(&mut self, count: u32) -> Result<Option<BatchUpdateResponse>> {
        self.append(Dimension::Columns, count)
    }

    /// Insert `count` empty rows before zero-based row `start`
    pub fn insert_rows(&mut self, start: u32, count: u32) -> Result<Option<BatchUpdateResponse>> {
        let range = self.span(Dimension::Rows, start, count)?;
        self.submit(Request::InsertDimension {
            range,
            inherit_from_before: false,
        })
    }

    /// Insert `count` empty columns before zero-based column `start`
    pub fn insert_columns(
        &mut self,
        start: u32,
        count: u32,
    ) -> Result<Option<BatchUpdateResponse>> {
        let range = self.span(Dimension::Columns, start, count)?;
        self.submit(Request::InsertDimension {
            range,
            inherit_from_before: false,
        })
    }

    pub fn delete_rows(&mut self, start: u32, count: u32) -> Result<Option<BatchUpdateResponse>> {
        let range = self.span(Dimension::Rows, start, count)?;
        self.submit(Request::DeleteDimension { range })
    }

    pub fn delete_columns(
        &mut self,
        start: u32,
        count: u32,
    ) -> Result<Option<BatchUpdateResponse>> {
        let range = self.span(Dimension::Columns, start, count)?;
        self.submit(Request::DeleteDimension { range })
    }

    // Filters

    /// Replace the sheet's basic filter. The old filter is cleared in the same
    /// transaction.
    pub fn set_basic_filter(&mut self, range: &str) -> Result<Option<BatchUpdateResponse>> {
        let range = self.range(range)?;
        let requests = vec![
            Request::ClearBasicFilter {
                sheet_id: self.sheet_id,
            },
            Request::SetBasicFilter {
                filter: BasicFilter { range },
            },
        ];
        Ok(self.executor.submit_all(requests)?)
    }

    pub fn clear_basic_filter(&mut self) -> Result<Option<BatchUpdateResponse>> {
        self.submit(Request::ClearBasicFilter {
            sheet_id: self.sheet_id,
        })
    }

    // Sheet properties

    pub fn rename(&mut self, title: &str) -> Result<Option<BatchUpdateResponse>> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SheetError::InvalidArgument("sheet title is empty".to_string()));
        }
        let response = self.submit(Request::UpdateSheetProperties {
            properties: SheetProperties {
                sheet_id: self.sheet_id,
                title: Some(title.to_string()),
                ..SheetProperties::default()
            },
            fields: "title".to_string(),
        })?;
        self.title = Some(title.to_string());
        Ok(response)
    }

    pub fn set_hidden(&mut self, hidden: bool) -> Result<Option<BatchUpdateResponse>> {
        let response = self.submit(Request::UpdateSheetProperties {
            properties: SheetProperties {
                sheet_id: self.sheet_id,
                hidden: Some(hidden),
                ..SheetProperties::default()
            },
            fields: "hidden".to_string(),
        })?;
        self.hidden = hidden;
        Ok(response)
    }

    /// Remove the sheet from its spreadsheet
    pub fn delete(&mut self) -> Result<Option<BatchUpdateResponse>> {
        self.submit(Request::DeleteSheet {
            sheet_id: self.sheet_id,
        })
    }

    // Helpers

    fn submit(&mut self, request: Request) -> Result<Option<BatchUpdateResponse>> {
        Ok(self.executor.submit(request)?)
    }

    fn write(&mut self, range: &str, value: ExtendedValue) -> Result<Option<BatchUpdateResponse>> {
        let range = self.range(range)?;
        self.submit(Request::set_value(range, value))
    }

    fn range(&self, a1: &str) -> Result<GridRange> {
        Ok(parse_grid_range(self.sheet_id, a1)?)
    }

    /// Parse `a1` and project it on `dimension`, which must be bounded on both ends
    fn bounded(&self, a1: &str, dimension: Dimension) -> Result<DimensionRange> {
        let projected = self.range(a1)?.dimension_range(dimension);
        if projected.start_index.is_none() || projected.end_index.is_none() {
            let axis = match dimension {
                Dimension::Rows => "rows",
                Dimension::Columns => "columns",
            };
            return Err(SheetError::InvalidArgument(format!(
                "range '{}' does not specify {}",
                a1, axis
            )));
        }
        Ok(projected)
    }

    fn span(&self, dimension: Dimension, start: u32, count: u32) -> Result<DimensionRange> {
        if count == 0 {
            return Err(SheetError::InvalidArgument("count must be at least 1".to_string()));
        }
        let end = start.checked_add(count).ok_or_else(|| {
            SheetError::InvalidArgument(format!("{} + {} overflows the sheet", start, count))
        })?;
        Ok(DimensionRange::new(self.sheet_id, dimension, start, end))
    }

    fn resize(
        &mut self,
        range: DimensionRange,
        pixels: u32,
    ) -> Result<Option<BatchUpdateResponse>> {
        self.submit(Request::UpdateDimensionProperties {
            range,
            properties: DimensionProperties { pixel_size: pixels },
            fields: "pixelSize".to_string(),
        })
    }

    fn append(&mut self, dimension: Dimension, count: u32) -> Result<Option<BatchUpdateResponse>> {
        if count == 0 {
            return Err(SheetError::InvalidArgument("count must be at least 1".to_string()));
        }
        self.submit(Request::AppendDimension {
            sheet_id: self.sheet_id,
            dimension,
            length: count,
        })
    }
}

impl<T> std::fmt::Debug for Sheet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sheet")
            .field("sheet_id", &self.sheet_id)
            .field("title", &self.title)
            .field("hidden", &self.hidden)
            .field("executor", &self.executor)
            .finish()
    }
}
