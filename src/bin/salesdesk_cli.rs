use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use salesdesk_core::{
    config, AssignmentFilter, EntityId, HttpSalesDataSource, Lead, LeadColumn, LeadFilter,
    OverviewService, StatusBadge,
};
use serde::Serialize;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let source = HttpSalesDataSource::new(cfg.upstream_base_url.clone(), cfg.request_timeout())
        .context("failed to build upstream client")?;
    let service = OverviewService::new(Arc::new(source));

    match cli.command {
        Commands::Overview(command) => handle_overview_command(&service, command, cli.json).await?,
        Commands::Leads(args) => handle_leads_command(&service, args, cli.json).await?,
        Commands::InvoicePreview(args) => {
            handle_invoice_preview(&service, args, cli.json).await?
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "salesdesk",
    about = "SalesDesk CLI for status overviews, lead filtering, and invoice previews",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Overview(OverviewCommands),
    Leads(LeadsArgs),
    InvoicePreview(InvoicePreviewArgs),
}

#[derive(Subcommand)]
enum OverviewCommands {
    /// Quotation counts and per-status lists, deduplicated by customer
    Quotations,
    /// Proforma-invoice counts and per-status lists
    Invoices,
}

#[derive(Clone, Copy, ValueEnum)]
enum BadgeArg {
    Pending,
    Approved,
    Rejected,
}

impl From<BadgeArg> for StatusBadge {
    fn from(badge: BadgeArg) -> Self {
        match badge {
            BadgeArg::Pending => StatusBadge::Pending,
            BadgeArg::Approved => StatusBadge::Approved,
            BadgeArg::Rejected => StatusBadge::Rejected,
        }
    }
}

#[derive(Args)]
struct LeadsArgs {
    #[arg(long, help = "Free-text search over name, email, and business")]
    search: Option<String>,
    #[arg(long, conflicts_with = "unassigned", help = "Only assigned leads")]
    assigned: bool,
    #[arg(long, help = "Only unassigned leads")]
    unassigned: bool,
    #[arg(
        long,
        value_enum,
        help = "Restrict to customers behind a quotation status badge"
    )]
    status_badge: Option<BadgeArg>,
    #[arg(
        long = "column",
        value_name = "COLUMN=SUBSTRING",
        help = "Per-column substring filter, repeatable (e.g. --column state=kerala)"
    )]
    columns: Vec<String>,
}

#[derive(Args)]
struct InvoicePreviewArgs {
    #[arg(long, help = "Proforma invoice identifier")]
    pi: String,
}

async fn handle_overview_command(
    service: &OverviewService,
    command: OverviewCommands,
    json: bool,
) -> Result<()> {
    match command {
        OverviewCommands::Quotations => {
            let overview = service
                .quotation_overview()
                .await
                .context("failed to build quotation overview")?;
            if json {
                print_json(&overview)?;
            } else {
                println!(
                    "Quotations by customer: pending {}, approved {}, rejected {}",
                    overview.counts.pending, overview.counts.approved, overview.counts.rejected
                );
            }
        }
        OverviewCommands::Invoices => {
            let overview = service
                .pi_overview()
                .await
                .context("failed to build invoice overview")?;
            if json {
                print_json(&overview)?;
            } else {
                println!(
                    "Proforma invoices by customer: pending {}, approved {}, rejected {}",
                    overview.counts.pending, overview.counts.approved, overview.counts.rejected
                );
            }
        }
    }
    Ok(())
}

fn parse_column_filters(raw: &[String]) -> Result<Vec<(LeadColumn, String)>> {
    raw.iter()
        .map(|entry| {
            let (column, value) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("expected COLUMN=SUBSTRING, got {entry:?}"))?;
            let column = LeadColumn::from_str(column.trim())
                .map_err(|_| anyhow!("unknown lead column {column:?}"))?;
            Ok((column, value.to_string()))
        })
        .collect()
}

async fn handle_leads_command(service: &OverviewService, args: LeadsArgs, json: bool) -> Result<()> {
    let assignment = if args.assigned {
        Some(AssignmentFilter::Assigned)
    } else if args.unassigned {
        Some(AssignmentFilter::Unassigned)
    } else {
        None
    };
    let filter = LeadFilter {
        search_term: args.search,
        assignment,
        customer_ids: None,
        column_filters: parse_column_filters(&args.columns)?,
    };

    let leads = match args.status_badge {
        Some(badge) => {
            service
                .leads_for_quotation_status(badge.into(), &filter)
                .await
        }
        None => service.filtered_leads(&filter).await,
    }
    .context("failed to filter leads")?;

    if json {
        print_json(&leads)?;
    } else {
        println!("{} lead(s) matched", leads.len());
        for lead in &leads {
            println!("{}", format_lead(lead));
        }
    }
    Ok(())
}

async fn handle_invoice_preview(
    service: &OverviewService,
    args: InvoicePreviewArgs,
    json: bool,
) -> Result<()> {
    let pi_id = EntityId::parse(&args.pi)
        .ok_or_else(|| anyhow!("invalid proforma invoice id {:?}", args.pi))?;
    let preview = service
        .invoice_preview(&pi_id)
        .await
        .context("failed to assemble invoice preview")?;

    if json {
        print_json(&preview)?;
    } else {
        let t = &preview.totals;
        println!("Proforma invoice {}", pi_id);
        if preview.invoice.is_revision() {
            println!("  (revision of {})", display_opt(&preview.invoice.parent_pi_id));
        }
        println!("  subtotal        {}", t.subtotal);
        println!("  discount        {}", t.discount_amount);
        println!("  taxable amount  {}", t.taxable_amount);
        println!("  tax             {}", t.tax_amount);
        println!("  total           {}", t.total);
        println!("  advance paid    {}", t.advance_payment);
        println!("  balance due     {}", t.balance_due);
        println!("  final total     {}", preview.final_total);
    }
    Ok(())
}

fn format_lead(lead: &Lead) -> String {
    format!(
        "  [{}] {} | {}",
        display_opt(&lead.id),
        lead.name,
        lead.business.as_deref().unwrap_or("-")
    )
}

fn display_opt(id: &Option<EntityId>) -> String {
    id.as_ref().map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
