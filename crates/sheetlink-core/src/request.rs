//! Wire model for the remote `batchUpdate` transaction.
//!
//! Every [`Request`] serializes to a single-key JSON object named after the
//! operation, e.g. `{"mergeCells": {"range": {...}, "mergeType": "MERGE_ALL"}}`.

use serde::{Deserialize, Serialize};

use crate::format::CellFormat;
use crate::range::{Dimension, DimensionRange, GridRange};
use crate::value::ExtendedValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeType {
    /// Merge all cells in the range into one
    MergeAll,
    /// One merged cell per column
    MergeColumns,
    /// One merged cell per row
    MergeRows,
}

/// Contents written into every cell of a range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_entered_value: Option<ExtendedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_entered_format: Option<CellFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen_row_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen_column_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_properties: Option<GridProperties>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionProperties {
    pub pixel_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicFilter {
    pub range: GridRange,
}

/// A single mutation queued for a remote transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    #[serde(rename_all = "camelCase")]
    RepeatCell {
        range: GridRange,
        cell: CellData,
        fields: String,
    },
    #[serde(rename_all = "camelCase")]
    UpdateCells { range: GridRange, fields: String },
    #[serde(rename_all = "camelCase")]
    MergeCells {
        range: GridRange,
        merge_type: MergeType,
    },
    #[serde(rename_all = "camelCase")]
    UnmergeCells { range: GridRange },
    #[serde(rename_all = "camelCase")]
    UpdateSheetProperties {
        properties: SheetProperties,
        fields: String,
    },
    #[serde(rename_all = "camelCase")]
    UpdateDimensionProperties {
        range: DimensionRange,
        properties: DimensionProperties,
        fields: String,
    },
    #[serde(rename_all = "camelCase")]
    AutoResizeDimensions { dimensions: DimensionRange },
    #[serde(rename_all = "camelCase")]
    AppendDimension {
        sheet_id: i32,
        dimension: Dimension,
        length: u32,
    },
    #[serde(rename_all = "camelCase")]
    InsertDimension {
        range: DimensionRange,
        #[serde(default)]
        inherit_from_before: bool,
    },
    #[serde(rename_all = "camelCase")]
    DeleteDimension { range: DimensionRange },
    #[serde(rename_all = "camelCase")]
    SetBasicFilter { filter: BasicFilter },
    #[serde(rename_all = "camelCase")]
    ClearBasicFilter { sheet_id: i32 },
    #[serde(rename_all = "camelCase")]
    DeleteSheet { sheet_id: i32 },
}

impl Request {
    /// Write `value` into every cell of `range`
    pub fn set_value(range: GridRange, value: ExtendedValue) -> Self {
        Request::RepeatCell {
            range,
            cell: CellData {
                user_entered_value: Some(value),
                ..CellData::default()
            },
            fields: "userEnteredValue".to_string(),
        }
    }

    /// Set, or remove when `None`, the note on every cell of `range`
    pub fn set_note(range: GridRange, note: Option<String>) -> Self {
        Request::RepeatCell {
            range,
            cell: CellData {
                note,
                ..CellData::default()
            },
            fields: "note".to_string(),
        }
    }

    pub fn format(range: GridRange, format: CellFormat) -> Self {
        let fields = format.field_mask();
        Request::RepeatCell {
            range,
            cell: CellData {
                user_entered_format: Some(format),
                ..CellData::default()
            },
            fields,
        }
    }

    /// Clear contents and formatting
    pub fn clear(range: GridRange) -> Self {
        Request::UpdateCells {
            range,
            fields: "*".to_string(),
        }
    }

    /// Operation name as it appears on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Request::RepeatCell { .. } => "repeatCell",
            Request::UpdateCells { .. } => "updateCells",
            Request::MergeCells { .. } => "mergeCells",
            Request::UnmergeCells { .. } => "unmergeCells",
            Request::UpdateSheetProperties { .. } => "updateSheetProperties",
            Request::UpdateDimensionProperties { .. } => "updateDimensionProperties",
            Request::AutoResizeDimensions { .. } => "autoResizeDimensions",
            Request::AppendDimension { .. } => "appendDimension",
            Request::InsertDimension { .. } => "insertDimension",
            Request::DeleteDimension { .. } => "deleteDimension",
            Request::SetBasicFilter { .. } => "setBasicFilter",
            Request::ClearBasicFilter { .. } => "clearBasicFilter",
            Request::DeleteSheet { .. } => "deleteSheet",
        }
    }
}

/// Body of a `batchUpdate` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchUpdateRequest {
    pub requests: Vec<Request>,
}

/// Result of a successful transaction, one reply per request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub replies: Vec<serde_json::Value>,
}

/// Error payload returned by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteErrorBody {
    pub error: RemoteErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteErrorDetail {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::parse_grid_range;
    use serde_json::json;

    #[test]
    fn test_merge_cells_wire_shape() {
        let range = parse_grid_range(7, "A1:B2").unwrap();
        let request = Request::MergeCells {
            range,
            merge_type: MergeType::MergeAll,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "mergeCells": {
                    "range": {
                        "sheetId": 7,
                        "startRowIndex": 0,
                        "startColumnIndex": 0,
                        "endRowIndex": 2,
                        "endColumnIndex": 2
                    },
                    "mergeType": "MERGE_ALL"
                }
            })
        );
    }

    #[test]
    fn test_set_value_wire_shape() {
        let range = parse_grid_range(0, "C3").unwrap();
        let request = Request::set_value(range, ExtendedValue::Number(42.0));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["repeatCell"]["cell"], json!({"userEnteredValue": {"numberValue": 42.0}}));
        assert_eq!(json["repeatCell"]["fields"], "userEnteredValue");
    }

    #[test]
    fn test_delete_dimension_deserialize() {
        let json = json!({
            "deleteDimension": {
                "range": {"sheetId": 1, "dimension": "ROWS", "startIndex": 4, "endIndex": 9}
            }
        });
        let request: Request = serde_json::from_value(json).unwrap();
        assert_eq!(
            request,
            Request::DeleteDimension {
                range: DimensionRange::new(1, Dimension::Rows, 4, 9)
            }
        );
        assert_eq!(request.kind(), "deleteDimension");
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let response: BatchUpdateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.replies.is_empty());
    }
}
