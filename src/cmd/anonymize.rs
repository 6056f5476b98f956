//! CLI handler for anonymizing a dump.

use super::Cli;
use crate::anonymizer::{
    generate_config, AnonymizeConfig, AnonymizeStats, Anonymizer, InsertLayout,
};
use crate::parser::RowSplitMode;
use crate::progress::byte_progress_bar;
use std::time::Instant;

/// Run the anonymizer with the given options
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let file = cli
        .file
        .ok_or_else(|| anyhow::anyhow!("Input file is required"))?;

    let layout = if cli.expand_inserts {
        InsertLayout::Expanded
    } else {
        InsertLayout::Preserve
    };
    let row_split = if cli.literal_row_split {
        RowSplitMode::Literal
    } else {
        RowSplitMode::QuoteAware
    };

    // Build config from YAML file and CLI options
    let config = AnonymizeConfig::builder()
        .input(file)
        .output(cli.output)
        .config_file(cli.config)
        .comments(cli.comments)
        .layout(layout)
        .row_split(row_split)
        .seed(cli.seed)
        .strict(cli.strict)
        .progress(cli.progress)
        .dry_run(cli.dry_run)
        .build()?;
    config.validate()?;

    if cli.generate_config {
        generate_config(&config)?;
        return Ok(());
    }

    if config.spec.is_empty() && !cli.json {
        eprintln!("No columns configured; the dump will be copied unchanged");
    }

    let start_time = Instant::now();
    let file_size = std::fs::metadata(&config.input)?.len();
    let show_progress = config.progress && !cli.json;

    let stats = if show_progress {
        let pb = byte_progress_bar(file_size);
        let pb_clone = pb.clone();
        let stats = Anonymizer::new(config)
            .with_progress(move |bytes| pb_clone.set_position(bytes))
            .run()?;
        pb.finish_with_message("done");
        stats
    } else {
        Anonymizer::new(config).run()?
    };

    output_stats(&stats, cli.json, cli.stats, start_time.elapsed().as_secs_f64())
}

fn output_stats(
    stats: &AnonymizeStats,
    json: bool,
    details: bool,
    elapsed_secs: f64,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    match stats.output {
        Some(ref path) => eprintln!("\n✓ Anonymization completed: {}", path.display()),
        None => eprintln!("\n✓ Dry run completed!"),
    }
    eprintln!("\nStatistics:");
    eprintln!("  Lines read: {}", stats.lines);
    eprintln!("  Tables found: {}", stats.tables);
    eprintln!("  INSERT statements rewritten: {}", stats.inserts_rewritten);
    eprintln!(
        "  INSERT statements passed through: {}",
        stats.inserts_passed_through
    );
    eprintln!("  Rows anonymized: {}", stats.rows_anonymized);
    eprintln!("  Values anonymized: {}", stats.values_anonymized);
    eprintln!("  Elapsed time: {:.3}s", elapsed_secs);

    if details {
        eprintln!("\nTables:");
        for table in &stats.table_stats {
            eprintln!(
                "  {}: {} columns, {} configured, {} rows anonymized",
                table.name, table.columns, table.configured_columns, table.rows_anonymized
            );
        }
        eprintln!("\nDeclared types:");
        for entry in &stats.type_frequency {
            eprintln!("  {:>8}  {}", entry.count, entry.declared_type);
        }
    }

    Ok(())
}
