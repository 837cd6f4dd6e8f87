//! Structural checks applied to a whole transaction before any of it is recorded

use sheetlink_core::{DimensionRange, GridRange, Request};

fn check_bounds(axis: &str, start: Option<u32>, end: Option<u32>) -> Result<(), String> {
    match (start, end) {
        (Some(start), Some(end)) if end <= start => Err(format!(
            "{} range is empty or inverted (start {}, end {})",
            axis, start, end
        )),
        _ => Ok(()),
    }
}

fn check_grid(range: &GridRange) -> Result<(), String> {
    check_bounds("row", range.start_row_index, range.end_row_index)?;
    check_bounds("column", range.start_column_index, range.end_column_index)
}

/// Dimension operations that move or size rows and columns need both ends
fn check_span(range: &DimensionRange) -> Result<(), String> {
    match (range.start_index, range.end_index) {
        (Some(start), Some(end)) => check_bounds("dimension", Some(start), Some(end)),
        _ => Err("dimension range needs both startIndex and endIndex".to_string()),
    }
}

fn check_fields(fields: &str) -> Result<(), String> {
    if fields.trim().is_empty() {
        return Err("at least one field must be listed in 'fields'".to_string());
    }
    Ok(())
}

/// Validate a single request
pub fn validate_request(request: &Request) -> Result<(), String> {
    match request {
        Request::RepeatCell { range, fields, .. } => {
            check_grid(range)?;
            check_fields(fields)
        }
        Request::UpdateCells { range, fields } => {
            check_grid(range)?;
            check_fields(fields)
        }
        Request::MergeCells { range, .. } | Request::UnmergeCells { range } => check_grid(range),
        Request::UpdateSheetProperties { fields, .. } => check_fields(fields),
        Request::UpdateDimensionProperties { range, fields, .. } => {
            check_span(range)?;
            check_fields(fields)
        }
        Request::AutoResizeDimensions { dimensions } => check_span(dimensions),
        Request::AppendDimension { length, .. } => {
            if *length == 0 {
                return Err("length must be greater than 0".to_string());
            }
            Ok(())
        }
        Request::InsertDimension { range, .. } | Request::DeleteDimension { range } => {
            check_span(range)
        }
        Request::SetBasicFilter { filter } => check_grid(&filter.range),
        Request::ClearBasicFilter { .. } | Request::DeleteSheet { .. } => Ok(()),
    }
}

/// Validate every request of a transaction, reporting the first failure
/// with its position the way the real service does
pub fn validate_batch(requests: &[Request]) -> Result<(), String> {
    if requests.is_empty() {
        return Err("Must specify at least one request.".to_string());
    }
    for (index, request) in requests.iter().enumerate() {
        validate_request(request).map_err(|reason| {
            format!("Invalid requests[{}].{}: {}", index, request.kind(), reason)
        })?;
    }
    Ok(())
}
