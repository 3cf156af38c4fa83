use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    dashboard::DetailView, format::format_status, new_bill::FileSelection, ui::SelectedFile,
    BillForm, BillStore, BillsController, DashboardController, HttpBillStore, MemorySessionStore,
    NewBillController, Persistence, StatusGroup,
};
use shared::domain::{BillId, UserType};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::{load_settings, Settings};
use terminal::{TerminalBinder, TerminalNavigator, TerminalPreview};

#[derive(Parser, Debug)]
#[command(name = "billed", about = "Expense reports for employees and their reviewers")]
struct Cli {
    /// Settings file; defaults to ./billed.toml
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the signed-in employee's bills, latest first.
    Bills,
    /// Upload a receipt and submit a new bill.
    New {
        #[arg(long = "type")]
        expense_type: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "")]
        vat: String,
        #[arg(long, default_value = "")]
        pct: String,
        #[arg(long, default_value = "")]
        commentary: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Show the admin dashboard's status groups.
    Dashboard {
        /// Groups to expand: 1 pending, 2 accepted, 3 refused.
        #[arg(long = "group")]
        groups: Vec<u8>,
    },
    /// Accept or refuse a pending bill.
    Review {
        bill_id: String,
        decision: Decision,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Open a bill's receipt.
    Preview { bill_id: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Decision {
    Accept,
    Refuse,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    let store: Arc<dyn BillStore> = Arc::new(
        HttpBillStore::new(&settings.api_url)
            .with_context(|| format!("invalid api_url {}", settings.api_url))?
            .with_token(settings.jwt.clone()),
    );

    match cli.command {
        Command::Bills => {
            require_role(&settings, UserType::Employee)?;
            list_bills(store).await?;
        }
        Command::New {
            expense_type,
            name,
            date,
            amount,
            vat,
            pct,
            commentary,
            file,
        } => {
            require_role(&settings, UserType::Employee)?;
            let form = BillForm {
                expense_type,
                name,
                date,
                amount,
                vat,
                pct,
                commentary,
            };
            submit_bill(&settings, store, form, file).await?;
        }
        Command::Dashboard { groups } => {
            require_role(&settings, UserType::Admin)?;
            show_dashboard(&settings, store, &groups).await?;
        }
        Command::Review {
            bill_id,
            decision,
            comment,
        } => {
            require_role(&settings, UserType::Admin)?;
            review_bill(&settings, store, BillId::new(bill_id), decision, &comment).await?;
        }
        Command::Preview { bill_id } => {
            preview_receipt(&settings, store, BillId::new(bill_id)).await?;
        }
    }

    Ok(())
}

fn require_role(settings: &Settings, expected: UserType) -> Result<()> {
    let user = settings.user()?;
    if user.user_type != expected {
        anyhow::bail!(
            "{} is signed in as {:?}; this command needs {:?}",
            user.email,
            user.user_type,
            expected
        );
    }
    Ok(())
}

async fn list_bills(store: Arc<dyn BillStore>) -> Result<()> {
    let controller = BillsController::new(
        Some(store),
        Arc::new(TerminalNavigator::default()),
        Arc::new(TerminalPreview),
    );
    let page = controller.load_page().await;
    if let Some(banner) = page.error_banner() {
        anyhow::bail!("{banner}");
    }
    if page.rows().is_empty() {
        println!("no bills yet");
    }
    for row in page.rows() {
        let id = row.bill.id.as_ref().map(BillId::as_str).unwrap_or("-");
        println!(
            "{id}\t{}\t{}\t{}\t{} €\t{}",
            row.date, row.bill.expense_type, row.bill.name, row.bill.amount, row.status
        );
    }
    Ok(())
}

async fn submit_bill(
    settings: &Settings,
    store: Arc<dyn BillStore>,
    form: BillForm,
    file: Option<PathBuf>,
) -> Result<()> {
    let session = Arc::new(MemorySessionStore::with_user(&settings.user()?)?);
    let navigator = Arc::new(TerminalNavigator::default());
    let mut controller = NewBillController::new(Some(store), navigator.clone(), session)
        .with_policy(settings.navigation_policy());

    if let Some(path) = file {
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read receipt {}", path.display()))?;
        let selection = controller
            .handle_change_file(SelectedFile::new(path.display().to_string(), bytes))
            .await?;
        match selection {
            FileSelection::Rejected => anyhow::bail!("{}", controller.file_error().text()),
            FileSelection::Uploaded(pending) => {
                println!("receipt uploaded as {}", pending.file_name);
            }
            FileSelection::UploadFailed => warn!("receipt upload failed; submitting without a receipt"),
            FileSelection::NotUploaded => {}
        }
    }

    let outcome = controller
        .handle_submit(&form)
        .await
        .context("bill not submitted")?;
    match outcome.persistence {
        Persistence::Stored(bill) => {
            let id = bill.id.as_ref().map(BillId::as_str).unwrap_or("-");
            println!("bill {id} submitted ({})", format_status(bill.status));
        }
        Persistence::Failed(message) => anyhow::bail!("bill update failed: {message}"),
        Persistence::Skipped => println!("bill not saved: no store configured"),
    }
    if let Some(route) = navigator.current() {
        println!("next: {}", route.path());
    }
    Ok(())
}

async fn open_dashboard(
    settings: &Settings,
    store: Arc<dyn BillStore>,
) -> Result<DashboardController> {
    let mut controller = DashboardController::new(
        Some(store),
        Arc::new(TerminalNavigator::default()),
        Arc::new(TerminalPreview),
        Arc::new(TerminalBinder),
        settings.review_filter(),
        Vec::new(),
    )
    .with_policy(settings.navigation_policy());
    let page = controller.load_page().await;
    if let Some(banner) = page.error_banner() {
        anyhow::bail!("{banner}");
    }
    Ok(controller)
}

async fn show_dashboard(settings: &Settings, store: Arc<dyn BillStore>, groups: &[u8]) -> Result<()> {
    let mut controller = open_dashboard(settings, store).await?;

    let groups = if groups.is_empty() {
        StatusGroup::ALL.to_vec()
    } else {
        groups
            .iter()
            .map(|index| {
                StatusGroup::from_index(*index)
                    .with_context(|| format!("unknown status group {index}; expected 1, 2 or 3"))
            })
            .collect::<Result<Vec<_>>>()?
    };

    for group in groups {
        let state = controller.handle_show_tickets(group);
        println!(
            "[{}] {} ({})",
            group.index(),
            format_status(group.status()),
            state.cards().len()
        );
        for card in state.cards() {
            println!(
                "  {}\t{} {}\t{}\t{} €\t{}\t{}",
                card.bill_id,
                card.first_name,
                card.last_name,
                card.name,
                card.amount,
                card.date,
                card.expense_type
            );
        }
    }
    Ok(())
}

async fn review_bill(
    settings: &Settings,
    store: Arc<dyn BillStore>,
    bill_id: BillId,
    decision: Decision,
    comment: &str,
) -> Result<()> {
    let mut controller = open_dashboard(settings, store).await?;

    if let DetailView::Form(bill) = controller.handle_edit_ticket(&bill_id)? {
        println!(
            "{}\t{}\t{}\t{} €\t{}",
            bill.email, bill.expense_type, bill.name, bill.amount, bill.date
        );
    }

    let report = match decision {
        Decision::Accept => controller.handle_accept_submit(&bill_id, comment).await?,
        Decision::Refuse => controller.handle_refuse_submit(&bill_id, comment).await?,
    };
    match report.persistence {
        Persistence::Stored(_) => {
            println!("bill {bill_id} {}", format_status(report.bill.status));
        }
        Persistence::Failed(message) => anyhow::bail!("review not saved: {message}"),
        Persistence::Skipped => println!("bill {bill_id} reviewed locally only"),
    }
    Ok(())
}

async fn preview_receipt(settings: &Settings, store: Arc<dyn BillStore>, bill_id: BillId) -> Result<()> {
    let shown = match settings.user()?.user_type {
        UserType::Admin => {
            let mut controller = open_dashboard(settings, store).await?;
            controller.handle_edit_ticket(&bill_id)?;
            controller.handle_click_icon_eye()
        }
        UserType::Employee => {
            let controller = BillsController::new(
                Some(store),
                Arc::new(TerminalNavigator::default()),
                Arc::new(TerminalPreview),
            );
            let bills = controller.get_bills().await?.unwrap_or_default();
            let row = bills
                .iter()
                .find(|row| row.bill.id.as_ref() == Some(&bill_id))
                .with_context(|| format!("no bill {bill_id}"))?;
            controller.handle_click_icon_eye(row.bill.file_url.as_deref())
        }
    };
    if shown.is_none() {
        anyhow::bail!("receipt preview unavailable");
    }
    Ok(())
}
