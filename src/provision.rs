//! One-off database provisioning: the five trade tables, their reference
//! keys, and the vocabulary lookup tables.

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::ProvisionArgs,
    db::{self, DbConfig},
    layout, lookups,
    spec::SpecDocument,
    types::derive_schema,
};

pub async fn execute(args: &ProvisionArgs) -> Result<()> {
    let pool = db::connect(&DbConfig::new(&args.database_url))
        .await
        .context("Connecting to the database")?;

    for layout in &layout::LAYOUTS {
        let spec_path = args.specs_dir.join(layout.spec_file);
        let specs = SpecDocument::load(&spec_path)?;
        let schema = derive_schema(layout.table.as_str(), &specs)?;
        db::create_table(&pool, layout.table.as_str(), &schema)
            .await
            .with_context(|| format!("Creating table '{}'", layout.table))?;
        if let Some(key) = layout.primary_key {
            db::add_primary_key(&pool, layout.table.as_str(), key)
                .await
                .with_context(|| format!("Keying table '{}'", layout.table))?;
        }
        info!(
            "✓ Created table '{}' with {} column(s)",
            layout.table,
            schema.len()
        );
    }

    for lookup in &lookups::LOOKUP_TABLES {
        lookups::replace_lookup_table(&pool, &args.lookups_dir, lookup)
            .await
            .with_context(|| format!("Replacing lookup table '{}'", lookup.table))?;
    }
    Ok(())
}
