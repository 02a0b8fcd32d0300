//! Export command - convert invoice files to JSON, CSV, or XML.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, error, warn};

use beejak_core::models::config::BeejakConfig;
use beejak_core::models::invoice::Invoice;
use beejak_core::money;

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: ExportFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

#[derive(clap::ValueEnum, Clone, Copy)]
pub enum ExportFormat {
    Json,
    Csv,
    Xml,
}

/// Result of converting a single file.
struct ExportResult {
    path: PathBuf,
    invoice: Option<Invoice>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: ExportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration; export only needs it for parity with the other
    // commands, the content of the invoice files is self-contained
    let _config = if let Some(path) = config_path {
        BeejakConfig::from_file(std::path::Path::new(path))?
    } else {
        BeejakConfig::default()
    };

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("json")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to export",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    // Set up progress bar
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = convert_single_file(&path);

        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(invoice) => {
                results.push(ExportResult {
                    path: path.clone(),
                    invoice: Some(invoice),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to convert {}: {}", path.display(), error_msg);
                    results.push(ExportResult {
                        path: path.clone(),
                        invoice: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to convert {}: {}", path.display(), error_msg);
                    anyhow::bail!("Export failed: {}", error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    // Write outputs
    let successful: Vec<_> = results.iter().filter(|r| r.invoice.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    for result in &successful {
        if let (Some(invoice), Some(output_dir)) = (&result.invoice, &args.output_dir) {
            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("invoice");

            let output_path = output_dir.join(format!("{}.{}", output_name, extension(args.format)));

            let content = match args.format {
                ExportFormat::Json => serde_json::to_string_pretty(invoice)?,
                ExportFormat::Csv => format_invoice_csv(invoice)?,
                ExportFormat::Xml => format_invoice_xml(invoice)?,
            };

            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    // Print summary
    println!();
    println!(
        "{} Exported {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn extension(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Json => "json",
        ExportFormat::Csv => "csv",
        ExportFormat::Xml => "xml",
    }
}

/// Parse one invoice file and stamp freshly computed totals into it.
fn convert_single_file(path: &PathBuf) -> anyhow::Result<Invoice> {
    let raw = fs::read_to_string(path)?;
    let mut invoice: Invoice = serde_json::from_str(&raw)?;

    let issues = invoice.validate();
    for issue in &issues {
        warn!("{}: {}", path.display(), issue);
    }

    invoice.totals = Some(money::compute_totals(&invoice.items));
    Ok(invoice)
}

fn format_invoice_csv(invoice: &Invoice) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Write header
    wtr.write_record([
        "invoice_number",
        "invoice_date",
        "client_name",
        "client_gstin",
        "description",
        "hsn_code",
        "quantity",
        "rate",
        "gst_rate",
        "amount",
    ])?;

    // One row per line item
    for item in &invoice.items {
        wtr.write_record([
            &invoice.invoice_number,
            &invoice.invoice_date.to_string(),
            &invoice.client.name,
            &invoice.client.gstin.clone().unwrap_or_default(),
            &item.description,
            &item.hsn_code,
            &item.quantity.to_string(),
            &item.rate.to_string(),
            &item.gst_rate.to_string(),
            &item.amount.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_invoice_xml(invoice: &Invoice) -> anyhow::Result<String> {
    let mut buffer = String::new();
    let mut serializer = quick_xml::se::Serializer::with_root(&mut buffer, Some("invoice"))?;
    serializer.indent(' ', 2);
    invoice.serialize(serializer)?;
    Ok(buffer)
}

fn write_summary(path: &PathBuf, results: &[ExportResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "invoice_date",
        "client_name",
        "subtotal",
        "gst_amount",
        "payable",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(invoice) = &result.invoice {
            let totals = money::compute_totals(&invoice.items);
            wtr.write_record([
                filename,
                "success",
                &invoice.invoice_number,
                &invoice.invoice_date.to_string(),
                &invoice.client.name,
                &totals.subtotal.to_string(),
                &totals.gst_amount.to_string(),
                &totals.payable().to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
