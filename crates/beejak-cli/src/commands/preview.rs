//! Preview command - render an invoice in the terminal through a template
//! layout.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::debug;

use beejak_core::models::config::BeejakConfig;
use beejak_core::models::invoice::Invoice;
use beejak_core::models::template::{ComponentType, ItemColumn, TemplateComponent, TemplateLayout};
use beejak_core::models::tokens;
use beejak_core::money;

/// Arguments for the preview command.
#[derive(Args)]
pub struct PreviewArgs {
    /// Invoice JSON file
    pub input: PathBuf,

    /// Template layout JSON file (defaults to the starter layout)
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Write the rendered preview to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report consistency issues in the invoice
    #[arg(long)]
    pub validate: bool,
}

pub async fn run(args: PreviewArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = if let Some(path) = config_path {
        BeejakConfig::from_file(std::path::Path::new(path))?
    } else {
        BeejakConfig::default()
    };

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Invoice file not found: {}", args.input.display());
    }

    let raw = fs::read_to_string(&args.input)?;
    let invoice: Invoice = serde_json::from_str(&raw)?;
    debug!(
        "Loaded invoice {} with {} items",
        invoice.invoice_number,
        invoice.items.len()
    );

    // Report consistency issues if requested
    if args.validate {
        let issues = invoice.validate();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let layout = match &args.template {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            TemplateLayout::from_value(serde_json::from_str(&raw)?)?
        }
        None => TemplateLayout::starter(),
    };

    let rendered = render(&invoice, &layout, &config);

    if let Some(output_path) = &args.output {
        fs::write(output_path, &rendered)?;
        println!(
            "{} Preview written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

/// Render the invoice as plain text, walking the layout's visible
/// components in reading order (top to bottom, left to right).
fn render(invoice: &Invoice, layout: &TemplateLayout, config: &BeejakConfig) -> String {
    let values = tokens::project(invoice, &config.business);

    let mut ordered: Vec<&TemplateComponent> =
        layout.components.iter().filter(|c| c.visible).collect();
    ordered.sort_by(|a, b| {
        (a.position.y, a.position.x)
            .partial_cmp(&(b.position.y, b.position.x))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut out = String::new();

    for component in ordered {
        match component.kind {
            ComponentType::Header => {
                if !values["business.name"].is_empty() {
                    out.push_str(&format!("{}\n", values["business.name"]));
                }
                if !values["business.address"].is_empty() {
                    out.push_str(&format!("{}\n", values["business.address"]));
                }
                if !values["business.gstin"].is_empty() {
                    out.push_str(&format!("GSTIN: {}\n", values["business.gstin"]));
                }
                out.push_str("TAX INVOICE\n");
            }
            ComponentType::InvoiceDetails => {
                out.push_str(&format!("Invoice: {}\n", values["invoice.number"]));
                out.push_str(&format!("Date: {}\n", values["invoice.date"]));
                if !values["invoice.dueDate"].is_empty() {
                    out.push_str(&format!("Due: {}\n", values["invoice.dueDate"]));
                }
            }
            ComponentType::ClientInfo => {
                out.push_str("Billed to:\n");
                out.push_str(&format!("  {}\n", values["client.name"]));
                if !values["client.address"].is_empty() {
                    out.push_str(&format!("  {}\n", values["client.address"]));
                }
                if !values["client.gstin"].is_empty() {
                    out.push_str(&format!("  GSTIN: {}\n", values["client.gstin"]));
                }
            }
            ComponentType::ItemsTable => {
                render_items_table(invoice, component, &mut out);
            }
            ComponentType::Totals => {
                out.push_str(&format!("  Subtotal:   {:>14}\n", values["totals.subtotal"]));
                out.push_str(&format!("  GST:        {:>14}\n", values["totals.gstAmount"]));
                out.push_str(&format!("  Round off:  {:>14}\n", values["totals.roundOff"]));
                out.push_str(&format!("  Total:      {:>14}\n", values["totals.total"]));
                if !values["totals.totalInWords"].is_empty() {
                    out.push_str(&format!(
                        "  Amount in words: {}\n",
                        values["totals.totalInWords"]
                    ));
                }
            }
            ComponentType::Notes => {
                if !values["invoice.notes"].is_empty() {
                    out.push_str("Notes:\n");
                    out.push_str(&format!("  {}\n", values["invoice.notes"]));
                }
            }
            ComponentType::Logo => {
                out.push_str("[logo]\n");
            }
            ComponentType::Signature => {
                out.push_str(&format!("For {}\n", values["business.name"]));
                out.push_str("Authorised Signatory\n");
            }
            ComponentType::QrCode => {
                out.push_str("[QR code]\n");
            }
        }
        out.push('\n');
    }

    out
}

fn render_items_table(invoice: &Invoice, component: &TemplateComponent, out: &mut String) {
    let mut columns: Vec<ItemColumn> = component
        .columns
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .filter_map(|name| ItemColumn::parse(name))
        .collect();
    if columns.is_empty() {
        columns = ItemColumn::ALL.to_vec();
    }

    let mut header = String::new();
    for column in &columns {
        header.push_str(&pad(column_label(*column), *column));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&"-".repeat(header.trim_end().len()));
    out.push('\n');

    for item in &invoice.items {
        let mut row = String::new();
        for column in &columns {
            let cell = match column {
                ItemColumn::Description => item.description.clone(),
                ItemColumn::Quantity => item.quantity.to_string(),
                ItemColumn::Rate => money::format_inr(item.rate),
                ItemColumn::HsnCode => item.hsn_code.clone(),
                ItemColumn::GstRate => format!("{}%", item.gst_rate),
                ItemColumn::Amount => money::format_inr(item.amount),
            };
            row.push_str(&pad(&cell, *column));
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }
}

fn column_label(column: ItemColumn) -> &'static str {
    match column {
        ItemColumn::Description => "Description",
        ItemColumn::Quantity => "Qty",
        ItemColumn::Rate => "Rate",
        ItemColumn::HsnCode => "HSN",
        ItemColumn::GstRate => "GST%",
        ItemColumn::Amount => "Amount",
    }
}

/// Fixed column widths; description and HSN align left, numbers right.
fn pad(text: &str, column: ItemColumn) -> String {
    let (width, left) = match column {
        ItemColumn::Description => (28, true),
        ItemColumn::Quantity => (8, false),
        ItemColumn::Rate => (14, false),
        ItemColumn::HsnCode => (8, true),
        ItemColumn::GstRate => (7, false),
        ItemColumn::Amount => (14, false),
    };

    let text: String = if text.chars().count() > width {
        text.chars().take(width).collect()
    } else {
        text.to_string()
    };

    if left {
        format!("{:<width$}  ", text, width = width)
    } else {
        format!("{:>width$}  ", text, width = width)
    }
}
