//! Remote command - session and resource sync against the beejak backend.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Subcommand};
use console::style;
use tracing::debug;
use uuid::Uuid;

use beejak_core::models::client::{ClientCreate, ClientUpdate};
use beejak_core::models::config::BeejakConfig;
use beejak_core::models::invoice::{Invoice, InvoiceCreate, InvoiceUpdate};
use beejak_core::models::template::{InvoiceTemplate, TemplateCreate, TemplateUpdate};
use beejak_core::money;
use beejak_core::session::Session;

use crate::api::{ApiClient, ApiError};
use crate::session_store::FileTokenStore;

/// Arguments for the remote command.
#[derive(Args)]
pub struct RemoteArgs {
    #[command(subcommand)]
    command: RemoteCommand,

    /// Session file (defaults to the user config directory)
    #[arg(long)]
    session_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum RemoteCommand {
    /// Log in and store the session token
    Login {
        /// Account email
        email: String,
    },

    /// Drop the stored session
    Logout,

    /// Show the signed-in user and session state
    Whoami,

    /// Manage clients on the backend
    Clients {
        #[command(subcommand)]
        command: ClientCommand,
    },

    /// Manage invoices on the backend
    Invoices {
        #[command(subcommand)]
        command: InvoiceCommand,
    },

    /// Manage templates on the backend
    Templates {
        #[command(subcommand)]
        command: TemplateCommand,
    },
}

#[derive(Subcommand)]
enum ClientCommand {
    /// List clients
    List,

    /// Add a client
    Add(ClientAddArgs),

    /// Update a client; omitted flags stay unchanged
    Update(ClientUpdateArgs),

    /// Delete a client
    Delete {
        /// Client id
        id: Uuid,
    },
}

#[derive(Args)]
struct ClientAddArgs {
    /// Client name
    name: String,

    /// Contact email
    #[arg(long, default_value = "")]
    email: String,

    /// Contact phone
    #[arg(long, default_value = "")]
    phone: String,

    /// Billing address
    #[arg(long, default_value = "")]
    address: String,

    /// GSTIN, when the client is registered
    #[arg(long)]
    gstin: Option<String>,
}

#[derive(Args)]
struct ClientUpdateArgs {
    /// Client id
    id: Uuid,

    /// New name
    #[arg(long)]
    name: Option<String>,

    /// New contact email
    #[arg(long)]
    email: Option<String>,

    /// New contact phone
    #[arg(long)]
    phone: Option<String>,

    /// New billing address
    #[arg(long)]
    address: Option<String>,

    /// New GSTIN
    #[arg(long)]
    gstin: Option<String>,
}

#[derive(Subcommand)]
enum InvoiceCommand {
    /// List invoices
    List,

    /// Download an invoice as JSON
    Show {
        /// Invoice id
        id: Uuid,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload an invoice file (creates or updates by id)
    Push {
        /// Invoice JSON file
        file: PathBuf,
    },

    /// Delete an invoice
    Delete {
        /// Invoice id
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// List templates
    List,

    /// Download a template as JSON
    Pull {
        /// Template id
        id: Uuid,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a template file (creates, or updates when the file has an id)
    Push {
        /// Template JSON file
        file: PathBuf,
    },

    /// Delete a template
    Delete {
        /// Template id
        id: Uuid,
    },
}

pub async fn run(args: RemoteArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = if let Some(path) = config_path {
        BeejakConfig::from_file(std::path::Path::new(path))?
    } else {
        BeejakConfig::default()
    };

    let session_path = args
        .session_file
        .clone()
        .unwrap_or_else(FileTokenStore::default_path);
    let mut session = Session::new(FileTokenStore::open(&session_path)?);
    debug!("Using session file {}", session_path.display());

    match args.command {
        RemoteCommand::Login { email } => login(&config, &mut session, &email).await,
        RemoteCommand::Logout => {
            session.clear()?;
            println!("{} Logged out", style("✓").green());
            Ok(())
        }
        RemoteCommand::Whoami => whoami(&session),
        RemoteCommand::Clients { command } => match command {
            ClientCommand::List => list_clients(&config, &mut session).await,
            ClientCommand::Add(add) => add_client(&config, &mut session, add).await,
            ClientCommand::Update(update) => update_client(&config, &mut session, update).await,
            ClientCommand::Delete { id } => delete_client(&config, &mut session, id).await,
        },
        RemoteCommand::Invoices { command } => match command {
            InvoiceCommand::List => list_invoices(&config, &mut session).await,
            InvoiceCommand::Show { id, output } => {
                show_invoice(&config, &mut session, id, output).await
            }
            InvoiceCommand::Push { file } => push_invoice(&config, &mut session, &file).await,
            InvoiceCommand::Delete { id } => delete_invoice(&config, &mut session, id).await,
        },
        RemoteCommand::Templates { command } => match command {
            TemplateCommand::List => list_templates(&config, &mut session).await,
            TemplateCommand::Pull { id, output } => {
                pull_template(&config, &mut session, id, output).await
            }
            TemplateCommand::Push { file } => push_template(&config, &mut session, &file).await,
            TemplateCommand::Delete { id } => delete_template(&config, &mut session, id).await,
        },
    }
}

async fn login(
    config: &BeejakConfig,
    session: &mut Session<FileTokenStore>,
    email: &str,
) -> anyhow::Result<()> {
    let password = match std::env::var("BEEJAK_PASSWORD") {
        Ok(password) => password,
        Err(_) => prompt_password()?,
    };

    let client = ApiClient::new(&config.api.base_url, config.api.timeout_secs)?;
    let response = client.login(email, &password).await?;
    session.login(&response.token, &response.user)?;

    println!(
        "{} Logged in as {} ({})",
        style("✓").green(),
        response.user.name,
        response.user.email
    );

    Ok(())
}

fn prompt_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut password = String::new();
    std::io::stdin().read_line(&mut password)?;
    Ok(password.trim_end().to_string())
}

fn whoami(session: &Session<FileTokenStore>) -> anyhow::Result<()> {
    match session.user()? {
        Some(user) => {
            println!("{} {} ({})", style("ℹ").blue(), user.name, user.email);
            if session.is_expired(Utc::now().timestamp())? {
                println!("Session: {}", style("expired").red());
            } else {
                println!("Session: {}", style("active").green());
            }
        }
        None => {
            println!("Not logged in. Run 'beejak remote login <email>'.");
        }
    }
    Ok(())
}

/// Build an authenticated client; a missing or expired session bails with
/// a login hint. An expired session is also cleared on the spot.
fn authed_client(
    config: &BeejakConfig,
    session: &mut Session<FileTokenStore>,
) -> anyhow::Result<ApiClient> {
    let token = session
        .token()?
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run 'beejak remote login <email>'."))?;

    if session.is_expired(Utc::now().timestamp())? {
        session.clear()?;
        anyhow::bail!("Session expired. Run 'beejak remote login <email>'.");
    }

    Ok(ApiClient::new(&config.api.base_url, config.api.timeout_secs)?.with_token(token))
}

/// A 401 means the token was revoked server-side; drop the local session
/// so the next command asks for a fresh login.
fn or_relogin<T>(
    result: Result<T, ApiError>,
    session: &mut Session<FileTokenStore>,
) -> anyhow::Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(ApiError::Unauthorized) => {
            session.clear()?;
            anyhow::bail!("Session rejected by the server. Run 'beejak remote login <email>'.");
        }
        Err(e) => Err(e.into()),
    }
}

async fn list_clients(
    config: &BeejakConfig,
    session: &mut Session<FileTokenStore>,
) -> anyhow::Result<()> {
    let client = authed_client(config, session)?;
    let clients = or_relogin(client.clients().await, session)?;

    if clients.is_empty() {
        println!("No clients on the backend.");
        return Ok(());
    }

    for entry in &clients {
        println!(
            "{:<38} {:<26} {:<28} {}",
            entry.id,
            entry.name,
            entry.email,
            entry.gstin.as_deref().unwrap_or("-")
        );
    }

    println!();
    println!("{} {} clients", style("ℹ").blue(), clients.len());

    Ok(())
}

async fn add_client(
    config: &BeejakConfig,
    session: &mut Session<FileTokenStore>,
    add: ClientAddArgs,
) -> anyhow::Result<()> {
    let payload = ClientCreate {
        name: add.name,
        email: add.email,
        phone: add.phone,
        address: add.address,
        gstin: add.gstin,
    };

    let client = authed_client(config, session)?;
    let created = or_relogin(client.create_client(&payload).await, session)?;
    println!(
        "{} Added client {} ({})",
        style("✓").green(),
        created.name,
        created.id
    );

    Ok(())
}

async fn update_client(
    config: &BeejakConfig,
    session: &mut Session<FileTokenStore>,
    args: ClientUpdateArgs,
) -> anyhow::Result<()> {
    let update = ClientUpdate {
        name: args.name,
        email: args.email,
        phone: args.phone,
        address: args.address,
        gstin: args.gstin,
    };
    if update == ClientUpdate::default() {
        anyhow::bail!(
            "Nothing to update. Pass at least one of --name, --email, --phone, --address, --gstin."
        );
    }

    let client = authed_client(config, session)?;
    let updated = or_relogin(client.update_client(args.id, &update).await, session)?;
    println!("{} Updated client {}", style("✓").green(), updated.name);

    Ok(())
}

async fn delete_client(
    config: &BeejakConfig,
    session: &mut Session<FileTokenStore>,
    id: Uuid,
) -> anyhow::Result<()> {
    let client = authed_client(config, session)?;
    or_relogin(client.delete_client(id).await, session)?;
    println!("{} Deleted client {}", style("✓").green(), id);
    Ok(())
}

async fn list_invoices(
    config: &BeejakConfig,
    session: &mut Session<FileTokenStore>,
) -> anyhow::Result<()> {
    let client = authed_client(config, session)?;
    let invoices = or_relogin(client.invoices().await, session)?;

    if invoices.is_empty() {
        println!("No invoices on the backend.");
        return Ok(());
    }

    for invoice in &invoices {
        let payable = money::compute_totals(&invoice.items).payable();
        println!(
            "{:<18} {}  {:<6} {:<26} {:>14}",
            invoice.invoice_number,
            invoice.invoice_date,
            invoice.status,
            invoice.client.name,
            money::format_inr(payable)
        );
    }

    println!();
    println!("{} {} invoices", style("ℹ").blue(), invoices.len());

    Ok(())
}

async fn show_invoice(
    config: &BeejakConfig,
    session: &mut Session<FileTokenStore>,
    id: Uuid,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let client = authed_client(config, session)?;
    let invoice = or_relogin(client.invoice(id).await, session)?;
    let json = serde_json::to_string_pretty(&invoice)?;

    if let Some(output_path) = output {
        fs::write(&output_path, json)?;
        println!(
            "{} Invoice written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

async fn push_invoice(
    config: &BeejakConfig,
    session: &mut Session<FileTokenStore>,
    file: &PathBuf,
) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("Invoice file not found: {}", file.display());
    }

    let raw = fs::read_to_string(file)?;
    let invoice: Invoice = serde_json::from_str(&raw)?;
    let client = authed_client(config, session)?;

    match invoice.id {
        None => {
            let payload = InvoiceCreate::from_invoice(&invoice);
            let created = or_relogin(client.create_invoice(&payload).await, session)?;
            println!(
                "{} Created invoice {} ({})",
                style("✓").green(),
                created.invoice_number,
                created.id.map(|id| id.to_string()).unwrap_or_default()
            );
        }
        Some(id) => {
            let update = InvoiceUpdate {
                invoice_number: Some(invoice.invoice_number.clone()),
                invoice_date: Some(invoice.invoice_date),
                due_date: invoice.due_date,
                status: Some(invoice.status),
                client_id: Some(invoice.client.id),
                items: Some(invoice.items.clone()),
                notes: invoice.notes.clone(),
            };
            let updated = or_relogin(client.update_invoice(id, &update).await, session)?;
            println!(
                "{} Updated invoice {}",
                style("✓").green(),
                updated.invoice_number
            );
        }
    }

    Ok(())
}

async fn delete_invoice(
    config: &BeejakConfig,
    session: &mut Session<FileTokenStore>,
    id: Uuid,
) -> anyhow::Result<()> {
    let client = authed_client(config, session)?;
    or_relogin(client.delete_invoice(id).await, session)?;
    println!("{} Deleted invoice {}", style("✓").green(), id);
    Ok(())
}

async fn list_templates(
    config: &BeejakConfig,
    session: &mut Session<FileTokenStore>,
) -> anyhow::Result<()> {
    let client = authed_client(config, session)?;
    let templates = or_relogin(client.templates().await, session)?;

    if templates.is_empty() {
        println!("No templates on the backend.");
        return Ok(());
    }

    for template in &templates {
        let marker = if template.is_default { " (default)" } else { "" };
        println!(
            "{:<38} {:<24} {} components{}",
            template.id,
            template.name,
            template.layout.components.len(),
            marker
        );
    }

    Ok(())
}

async fn pull_template(
    config: &BeejakConfig,
    session: &mut Session<FileTokenStore>,
    id: Uuid,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let client = authed_client(config, session)?;
    let template = or_relogin(client.template(id).await, session)?;
    let json = serde_json::to_string_pretty(&template)?;

    if let Some(output_path) = output {
        fs::write(&output_path, json)?;
        println!(
            "{} Template written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

/// Upload a template. A file carrying an `id` updates that template; one
/// without creates a new one. The layout is validated before any request
/// goes out.
async fn push_template(
    config: &BeejakConfig,
    session: &mut Session<FileTokenStore>,
    file: &PathBuf,
) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("Template file not found: {}", file.display());
    }

    let raw = fs::read_to_string(file)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;

    if value.get("id").is_some() {
        let template: InvoiceTemplate = serde_json::from_value(value)?;
        template.layout.validate()?;
        let update = TemplateUpdate {
            name: Some(template.name.clone()),
            layout: Some(template.layout.clone()),
            is_default: Some(template.is_default),
        };
        let client = authed_client(config, session)?;
        let updated = or_relogin(client.update_template(template.id, &update).await, session)?;
        println!("{} Updated template {}", style("✓").green(), updated.name);
    } else {
        let payload: TemplateCreate = serde_json::from_value(value)?;
        payload.layout.validate()?;
        let client = authed_client(config, session)?;
        let created = or_relogin(client.create_template(&payload).await, session)?;
        println!(
            "{} Created template {} ({})",
            style("✓").green(),
            created.name,
            created.id
        );
    }

    Ok(())
}

async fn delete_template(
    config: &BeejakConfig,
    session: &mut Session<FileTokenStore>,
    id: Uuid,
) -> anyhow::Result<()> {
    let client = authed_client(config, session)?;
    or_relogin(client.delete_template(id).await, session)?;
    println!("{} Deleted template {}", style("✓").green(), id);
    Ok(())
}
