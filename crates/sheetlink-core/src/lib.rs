pub mod error;
pub mod format;
pub mod range;
pub mod request;
pub mod value;

pub use error::RangeError;
pub use format::{
    CellFormat, Color, HorizontalAlign, NumberFormat, NumberType, Padding, TextFormat,
    VerticalAlign, WrapStrategy,
};
pub use range::{
    col_from_label, col_to_label, parse_grid_range, Dimension, DimensionRange, GridRange,
};
pub use request::{
    BasicFilter, BatchUpdateRequest, BatchUpdateResponse, CellData, DimensionProperties,
    GridProperties, MergeType, RemoteErrorBody, RemoteErrorDetail, Request, SheetProperties,
};
pub use value::{serial_date, ExtendedValue};
