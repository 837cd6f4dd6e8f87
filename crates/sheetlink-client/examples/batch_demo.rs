//! Writes a small formatted table in one transaction.
//!
//! Start the emulator (`cargo run -p sheetlink-emulator`) and run with
//! `SHEETLINK_BASE_URL=http://localhost:3000`, or point it at the real
//! service with an access token.

use chrono::NaiveDate;
use sheetlink_client::model::{CellFormat, Color, HorizontalAlign, MergeType, NumberType};
use sheetlink_client::{open_sheet, ClientConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetlink_batch=debug,sheetlink_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let spreadsheet_id =
        std::env::var("SHEETLINK_SPREADSHEET_ID").unwrap_or_else(|_| "demo".to_string());
    let config = ClientConfig::from_env()?;
    let mut sheet = open_sheet(&config, &spreadsheet_id, 0)?;

    sheet.start_batch();
    sheet.set_text("A1", "Quarterly report")?;
    sheet.merge_cells("A1:C1", MergeType::MergeAll)?;
    sheet.format_cells(
        "A1",
        CellFormat::new()
            .bold()
            .font_size(14)
            .align(HorizontalAlign::Center),
    )?;

    let start = NaiveDate::from_ymd_opt(2025, 1, 1)
        .ok_or_else(|| anyhow::anyhow!("invalid date"))?;
    for (row, amount) in [(2, 1200.0), (3, 950.5), (4, 1780.25)] {
        sheet.set_date(&format!("A{}", row), start)?;
        sheet.set_value(&format!("B{}", row), amount)?;
    }
    sheet.set_formula("B5", "=SUM(B2:B4)")?;
    sheet.format_cells(
        "B2:B5",
        CellFormat::new().number(NumberType::Currency, Some("$#,##0.00")),
    )?;
    sheet.format_cells("A5:B5", CellFormat::new().background(Color::rgb(255, 242, 204)))?;
    sheet.freeze(Some(1), None)?;
    sheet.auto_resize_columns("A:B")?;

    let pending = sheet.executor().pending().len();
    let response = sheet.flush()?;
    tracing::info!(
        "Flushed {} requests, {} replies",
        pending,
        response.map(|r| r.replies.len()).unwrap_or(0)
    );

    Ok(())
}
