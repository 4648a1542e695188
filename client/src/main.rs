use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use estcoin_wallet_lib::controllers::TransactionRow;
use estcoin_wallet_lib::{
    DashboardController, LoadOutcome, NotificationEvent, SubmitOutcome, WalletApp, WalletError,
};

#[derive(Parser)]
#[command(name = "estcoin")]
#[command(version)]
#[command(about = "EstCoin custodial wallet client")]
struct Cli {
    /// Data directory (default: $ESTCOIN_HOME or ~/.estcoin)
    #[arg(long, value_name = "DIR")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account; a new account is credited with 10 EST
    Register {
        username: String,
        #[arg(short, long)]
        password: String,
        /// Password confirmation (defaults to --password)
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Log in and persist the session
    Login {
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the stored session
    Status,
    /// Show balance and recent transactions
    Dashboard,
    /// Send tokens to another address
    Transfer {
        /// Recipient address (0x followed by 40 hex characters)
        recipient: String,
        amount: String,
    },
    /// List recent transactions
    History {
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Talk directly to a wallet-enabled node
    Chain {
        #[command(subcommand)]
        command: ChainCommands,
    },
}

#[derive(Subcommand)]
enum ChainCommands {
    /// Accounts managed by the node
    Accounts,
    /// Balance of an address in ether
    Balance { address: String },
    /// Send ether from a node-managed account
    Send {
        from: String,
        to: String,
        amount: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let app = match cli.home {
        Some(home) => WalletApp::initialize(home),
        None => WalletApp::from_env(),
    }
    .context("failed to open wallet client")?;
    init_tracing(&app.config().log_level);

    let mut events = app.notifications().subscribe();
    let result = dispatch(&app, cli.command).await;
    print_notifications(&mut events);
    result
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn print_notifications(events: &mut broadcast::Receiver<NotificationEvent>) {
    loop {
        match events.try_recv() {
            Ok(NotificationEvent::Shown(notification)) => println!(
                "{} {}: {}",
                notification.kind.icon(),
                notification.kind.title(),
                notification.message
            ),
            Ok(NotificationEvent::Dismissed { .. }) => {}
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "notifications dropped");
            }
            Err(_) => break,
        }
    }
}

async fn dispatch(app: &WalletApp, command: Commands) -> Result<()> {
    match command {
        Commands::Register {
            username,
            password,
            confirm,
        } => {
            let controller = app.register();
            controller.set_username(username);
            controller.set_confirm_password(confirm.unwrap_or_else(|| password.clone()));
            controller.set_password(password);
            expect_completed(controller.submit().await)
        }
        Commands::Login { username, password } => {
            let controller = app.login();
            controller.set_username(username);
            controller.set_password(password);
            expect_completed(controller.submit().await)
        }
        Commands::Logout => {
            app.api().logout()?;
            println!("Signed out.");
            Ok(())
        }
        Commands::Status => {
            match app.sessions().current_user() {
                Some(user) => {
                    println!("Logged in as {}", user.username);
                    println!("Address: {}", user.ethereum_address);
                }
                None => println!("Not logged in."),
            }
            println!("API: {}", app.api().base_url());
            println!("Screen: {}", app.router().current());
            Ok(())
        }
        Commands::Dashboard => {
            let dashboard = app.dashboard();
            let outcome = dashboard.mount().await;
            print_dashboard(&dashboard);
            match outcome {
                LoadOutcome::Redirected => bail!("not logged in"),
                LoadOutcome::Failed(err) => Err(err.into()),
                _ => Ok(()),
            }
        }
        Commands::Transfer { recipient, amount } => {
            if !app.sessions().is_authenticated() {
                bail!("not logged in");
            }
            let dashboard = app.dashboard();
            dashboard.toggle_transfer();
            dashboard.transfer().set_recipient(recipient);
            dashboard.transfer().set_amount(amount);
            let outcome = dashboard.submit_transfer().await;
            if outcome.is_completed() {
                print_dashboard(&dashboard);
            }
            expect_completed(outcome)
        }
        Commands::History { limit } => {
            let history = app.api().get_history(limit).await?;
            let own_address = app.sessions().ethereum_address();
            print_rows(
                history
                    .transactions
                    .iter()
                    .map(|record| TransactionRow::from_record(record, own_address.as_deref())),
            );
            Ok(())
        }
        Commands::Chain { command } => run_chain(app, command).await,
    }
}

async fn run_chain(app: &WalletApp, command: ChainCommands) -> Result<()> {
    let chain = app.chain()?;
    match command {
        ChainCommands::Accounts => {
            for account in chain.accounts().await? {
                println!("{}", account);
            }
        }
        ChainCommands::Balance { address } => {
            println!("{} ETH", chain.get_balance(&address).await?);
        }
        ChainCommands::Send { from, to, amount } => {
            let hash = chain.send_transaction(&from, &to, &amount).await?;
            println!("Transaction sent: {}", hash);
        }
    }
    Ok(())
}

fn expect_completed(outcome: SubmitOutcome) -> Result<()> {
    match outcome {
        SubmitOutcome::Completed => Ok(()),
        SubmitOutcome::Rejected(err) | SubmitOutcome::Failed(err) => Err(err.into()),
        SubmitOutcome::Busy | SubmitOutcome::Discarded => {
            Err(WalletError::Unknown("request was not completed".to_string()).into())
        }
    }
}

fn print_dashboard(dashboard: &DashboardController) {
    let state = dashboard.state();
    if let Some(user) = &state.user {
        println!("User: {}", user.username);
        println!("Address: {}", user.ethereum_address);
    }
    println!(
        "Balance: {}",
        dashboard.balance_display().as_deref().unwrap_or("-")
    );
    print_rows(dashboard.rows().into_iter());
}

fn print_rows(rows: impl Iterator<Item = TransactionRow>) {
    let mut empty = true;
    for row in rows {
        empty = false;
        println!(
            "{:<20} {} -> {}  {}",
            row.timestamp.as_deref().unwrap_or("-"),
            row.from,
            row.to,
            row.amount
        );
    }
    if empty {
        println!("No transactions yet.");
    }
}
