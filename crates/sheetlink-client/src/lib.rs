pub mod config;
pub mod error;
pub mod http;
pub mod sheet;

pub use config::ClientConfig;
pub use error::{Result, SheetError};
pub use http::HttpTransport;
pub use sheet::Sheet;

pub use sheetlink_batch::{BatchError, BatchExecutor, RetryPolicy, Transport};
pub use sheetlink_core as model;

/// Open a sheet over HTTP using `config` for the endpoint, credentials and retry policy
pub fn open_sheet(
    config: &ClientConfig,
    spreadsheet_id: &str,
    sheet_id: i32,
) -> anyhow::Result<Sheet<HttpTransport>> {
    let transport = HttpTransport::new(config)?;
    Ok(Sheet::new(spreadsheet_id, sheet_id, transport).with_policy(config.retry_policy()))
}
