use std::fs::File;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use dayview_core::{read_occurrences, EventColumn};

#[derive(Args)]
pub struct LayoutArgs {
    /// JSON file holding an array of occurrences ("-" for stdin)
    input: PathBuf,
    /// Day to lay out (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,
    /// IANA timezone overriding view.timezone
    #[arg(long)]
    tz: Option<String>,
    /// Config file to read instead of the default
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print single-line JSON
    #[arg(long)]
    compact: bool,
}

pub fn run(args: LayoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(args.config.as_deref())?;
    if let Some(tz) = args.tz {
        config.view.timezone = tz;
        config.validate()?;
    }

    let occurrences = if args.input.as_os_str() == "-" {
        read_occurrences(std::io::stdin().lock())?
    } else {
        read_occurrences(File::open(&args.input)?)?
    };
    tracing::info!(count = occurrences.len(), date = %args.date, "laying out occurrences");

    let mut column = EventColumn::from_config(args.date, &config)?;
    column.start_batch();
    for occurrence in occurrences {
        column.add_occurrence(occurrence);
    }
    column.end_batch();

    let tree = column.layout();
    let json = if args.compact {
        serde_json::to_string(tree.as_ref())?
    } else {
        serde_json::to_string_pretty(tree.as_ref())?
    };
    println!("{json}");
    Ok(())
}
