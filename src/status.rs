//! Per-period row counts for the fact tables.

use anyhow::{Context, Result};

use crate::{
    cli::StatusArgs,
    db::{self, DbConfig},
    layout::TableName,
    period::Period,
};

pub async fn execute(args: &StatusArgs) -> Result<()> {
    let period = Period::new(args.year, args.month)?;
    let pool = db::connect(&DbConfig::new(&args.database_url))
        .await
        .context("Connecting to the database")?;

    let date = period.first_day();
    println!("Period {}-{:02}", period.year, period.month);
    println!("{:<12} {:>12}", "table", "rows");
    for table in TableName::fact_tables() {
        let count = db::count_rows_for_date(&pool, table.as_str(), date).await?;
        println!("{:<12} {count:>12}", table.as_str());
    }
    Ok(())
}
