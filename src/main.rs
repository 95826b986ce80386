use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use parqlens::cli::parse_filter;
use parqlens::{
    AccessPlan, Args, ConfigManager, FileInfo, PlanOverride, RowRange, Session, SortDirection,
    SortSpec, ViewSpec, APP_NAME,
};

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.init_config {
        let config = ConfigManager::new(APP_NAME)?;
        let path = config.write_default()?;
        println!("Wrote default config to {}", path.display());
        return Ok(Some(()));
    }

    Ok(None)
}

fn view_from_args(args: &Args) -> Result<ViewSpec> {
    let filters = args
        .filters
        .iter()
        .map(|raw| parse_filter(raw).map_err(|e| eyre!(e)))
        .collect::<Result<Vec<_>>>()?;

    let sort = match &args.sort {
        Some(column) => {
            let direction = if args.descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            SortSpec::by(column.clone(), direction)
        }
        None => SortSpec::none(),
    };

    Ok(ViewSpec {
        search: args.search.clone(),
        filters,
        sort,
    })
}

fn print_schema(info: &FileInfo, json: bool) -> Result<()> {
    if json {
        let columns: Vec<serde_json::Value> = info
            .schema
            .iter()
            .map(|col| {
                serde_json::json!({
                    "name": col.name,
                    "type": col.type_name(),
                    "nullable": col.nullable,
                    "image": col.is_image,
                })
            })
            .collect();
        let doc = serde_json::json!({
            "file_name": info.file_name,
            "file_size": info.file_size,
            "rows": info.row_count,
            "columns": columns,
            "compression": info.compression,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!(
        "{} ({} rows, {} columns, {})",
        info.file_name, info.row_count, info.column_count, info.compression
    );
    for col in &info.schema {
        let nullable = if col.nullable { "nullable" } else { "required" };
        let image = if col.is_image { ", image" } else { "" };
        println!("  {}: {} ({}{})", col.name, col.type_name(), nullable, image);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let path = args
        .path
        .as_ref()
        .ok_or_else(|| eyre!("No file given. Usage: parqlens <FILE.parquet>"))?;

    let config = ConfigManager::new(APP_NAME)?.load()?;
    let page_size = args.page_size.unwrap_or(config.display.page_size);

    let overrides = if args.full_load {
        PlanOverride::ForceFull
    } else if args.sample {
        PlanOverride::ForceSample
    } else {
        PlanOverride::None
    };

    let mut session = Session::new(config);
    session.open_path(path, overrides)?;

    if args.sample && args.seed.is_some() {
        // Draw the seeded sample up front so stats and paging both see it.
        session.sample_page(args.seed)?;
    }

    if args.schema {
        return print_schema(session.info()?, args.json);
    }

    if let Some(column) = &args.stats {
        let stats = session.stats(column)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print_stats(&stats);
        }
        return Ok(());
    }

    if args.all_stats {
        let stats = session.all_stats()?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            for s in &stats {
                print_stats(s);
            }
        }
        return Ok(());
    }

    let view = view_from_args(args)?;
    let range = RowRange::new(args.page * page_size, (args.page + 1) * page_size);
    let page = session.page(range, &view)?;

    if page.slow_path {
        eprintln!("Note: sorting or filtering this file requires a full read; this may be slow.");
    }

    println!("{}", page.df);
    let label = match session.plan() {
        AccessPlan::Sampled { .. } => " (sampled)",
        _ => "",
    };
    println!(
        "rows {}-{} of {}{}",
        page.start,
        page.end,
        page.total_rows,
        label
    );
    Ok(())
}

fn print_stats(stats: &parqlens::ColumnStats) {
    let sampled = if stats.is_sampled { " (sampled)" } else { "" };
    println!("{} [{}]{}", stats.name, stats.dtype, sampled);
    println!(
        "  count: {}  nulls: {}  unique: {}",
        stats.count, stats.null_count, stats.unique_count
    );
    if let Some(num) = &stats.numeric {
        println!(
            "  min: {}  max: {}  mean: {}  median: {}",
            num.min, num.max, num.mean, num.median
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
