//! ScratchForge command line
//!
//! Usage:
//!   scratchforge status                 - Balance, rounds and verification
//!   scratchforge deposit 20.00          - Sandbox deposit, paid and credited
//!   scratchforge play [--forfeit]       - Buy and settle one card
//!   scratchforge verify --cpf ..        - Identity step of the gate
//!   scratchforge claim                  - Credit the grand prize
//!   scratchforge withdraw 50.00         - Withdraw once verified
//!   scratchforge simulate --cards N     - Losing-card line check
//!   scratchforge register ..            - Check a registration form
//!   scratchforge config                 - Print the effective config

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use sf_card_lab::{Card, CardEngine, GRID_SIDE, PrizeSchedule, simulate_losing_cards};
use sf_core::Money;
use sf_state::{
    IdentityInput, JsonFileStore, LedgerError, PaymentGateway, PaymentOutcome, RegistrationInput,
    SandboxGateway, SessionLedger, Settlement, DEFAULT_SESSION_KEY, default_data_dir,
    validate_registration,
};

use crate::config::AppConfig;

type Ledger = SessionLedger<JsonFileStore, CardEngine<PrizeSchedule>>;

#[derive(Parser)]
#[command(name = "scratchforge", about = "ScratchForge scratch card session", version)]
struct Cli {
    /// Directory holding the session file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON config file (card, schedule, ledger sections)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed the card RNG for reproducible grids
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show balance, rounds and verification
    Status,
    /// Buy one card, reveal it and settle
    Play {
        /// Settle without revealing the cells
        #[arg(long)]
        forfeit: bool,
    },
    /// Create a sandbox deposit, mark it paid and credit it
    Deposit {
        /// Amount, e.g. 20.00
        amount: Money,
    },
    /// Submit identity details
    Verify {
        #[arg(long)]
        cpf: String,
        /// Full name
        #[arg(long)]
        name: String,
        /// DD/MM/YYYY
        #[arg(long)]
        birth_date: String,
    },
    /// Credit a won grand prize
    Claim,
    /// Withdraw from the balance
    Withdraw {
        amount: Money,
    },
    /// Measure accidental lines on losing cards
    Simulate {
        #[arg(long, default_value_t = 10_000)]
        cards: u64,
    },
    /// Validate a registration form
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Print the effective configuration as JSON
    Config,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate { cards } => simulate(&config, cli.seed, cards),
        Commands::Register {
            name,
            email,
            password,
        } => register(name, email, password),
        Commands::Config => {
            println!("{}", config.to_json()?);
            Ok(())
        }
        command => {
            let mut ledger = open_ledger(&config, cli.data_dir, cli.seed);
            run(&mut ledger, command)
        }
    }
}

fn open_ledger(config: &AppConfig, data_dir: Option<PathBuf>, seed: Option<u64>) -> Ledger {
    let dir = data_dir.unwrap_or_else(default_data_dir);
    let store = JsonFileStore::in_dir(&dir, DEFAULT_SESSION_KEY);
    log::info!("Session file: {}", store.path().display());

    SessionLedger::open(store, engine(config, seed), config.ledger_config())
}

fn engine(config: &AppConfig, seed: Option<u64>) -> CardEngine<PrizeSchedule> {
    let mut engine = CardEngine::with_schedule(config.card.clone(), config.schedule.clone());
    if let Some(seed) = seed {
        engine.seed(seed);
    }
    engine
}

fn run(ledger: &mut Ledger, command: Commands) -> Result<()> {
    match command {
        Commands::Status => {
            print_status(ledger);
            Ok(())
        }
        Commands::Play { forfeit } => play(ledger, forfeit),
        Commands::Deposit { amount } => deposit(ledger, amount),
        Commands::Verify {
            cpf,
            name,
            birth_date,
        } => verify(ledger, cpf, name, birth_date),
        Commands::Claim => {
            let value = ledger.claim_grand_prize()?;
            println!("Grand prize of {} credited. Balance: {}", value, ledger.balance());
            Ok(())
        }
        Commands::Withdraw { amount } => withdraw(ledger, amount),
        Commands::Simulate { .. } | Commands::Register { .. } | Commands::Config => {
            bail!("command does not use a session")
        }
    }
}

fn print_status(ledger: &Ledger) {
    let state = ledger.state();
    let verification = &state.verification;

    println!("Balance:        {}", state.balance);
    println!("Plays:          {}", state.plays_completed);
    println!("Next round:     {}", state.next_round());
    println!(
        "Grand prize:    {}",
        match (state.grand_prize_won, state.grand_prize_claimed) {
            (true, true) => "won, claimed",
            (true, false) => "won, not claimed",
            _ => "-",
        }
    );
    println!(
        "Verification:   {}% (identity {}, deposit {})",
        verification.progress_percent(),
        yes_no(verification.identity_verified),
        yes_no(verification.deposit_verified)
    );
    if !ledger.can_play() {
        println!(
            "Missing {} for the next card; suggested deposit {}",
            ledger.missing_amount(),
            ledger.suggested_deposit()
        );
    }
}

fn play(ledger: &mut Ledger, forfeit: bool) -> Result<()> {
    let mut card = match ledger.start_play() {
        Ok(card) => card,
        Err(LedgerError::InsufficientFunds { balance, required }) => {
            bail!(
                "Balance {} is below the card price {}; deposit at least {}",
                balance,
                required,
                ledger.suggested_deposit()
            );
        }
        Err(e) => return Err(e.into()),
    };

    if !forfeit {
        card.reveal_all();
    }
    print_card(&card);

    match ledger.complete_card(&card)? {
        Settlement::NoPrize => println!("No prize this time."),
        Settlement::Cash(amount) => println!("You won {}!", amount),
        Settlement::GrandPrize(value) => {
            println!("Grand prize won ({}). Run `scratchforge claim` to credit it.", value)
        }
    }
    println!("Balance: {}", ledger.balance());
    Ok(())
}

fn print_card(card: &Card) {
    println!("Card {} (round {})", card.id, card.round);
    for row in card.cells.chunks(GRID_SIDE) {
        let line: Vec<&str> = row
            .iter()
            .map(|cell| if cell.revealed { cell.symbol.label() } else { "▒▒" })
            .collect();
        println!("  {}", line.join("  "));
    }
}

fn deposit(ledger: &mut Ledger, amount: Money) -> Result<()> {
    let gateway = SandboxGateway::new();
    let intent = gateway
        .create_deposit(amount)
        .context("Failed to create deposit")?;
    println!("Deposit {} created, code {}", intent.id, intent.qr_code);

    gateway.mark_paid(&intent.id)?;
    match ledger.confirm_deposit(&gateway, &intent.id)? {
        PaymentOutcome::Credited(value) => {
            println!("Credited {}. Balance: {}", value, ledger.balance())
        }
        PaymentOutcome::Duplicate => println!("Deposit already credited."),
        PaymentOutcome::Ignored(status) => println!("Deposit is {}, nothing credited.", status),
    }
    Ok(())
}

fn verify(ledger: &mut Ledger, cpf: String, full_name: String, birth_date: String) -> Result<()> {
    let input = IdentityInput {
        cpf,
        full_name,
        birth_date,
    };
    match ledger.set_verification(&input) {
        Ok(verification) => {
            println!("Identity accepted ({}%).", verification.progress_percent());
            if !verification.is_verified {
                println!("Make a deposit to complete verification.");
            }
            Ok(())
        }
        Err(LedgerError::InvalidIdentity(errors)) => {
            for error in errors.iter() {
                eprintln!("  {}", error);
            }
            bail!("identity rejected");
        }
        Err(e) => Err(e.into()),
    }
}

fn withdraw(ledger: &mut Ledger, amount: Money) -> Result<()> {
    match ledger.withdraw(amount) {
        Ok(withdrawal) => {
            println!(
                "Withdrawal of {} requested at {}. Balance: {}",
                withdrawal.amount,
                withdrawal.requested_at.format("%Y-%m-%d %H:%M:%S UTC"),
                withdrawal.balance_after
            );
            Ok(())
        }
        Err(LedgerError::NotVerified) => {
            let progress = ledger.verification().progress_percent();
            bail!("account not verified ({}%): verify identity and make a deposit", progress)
        }
        Err(e) => Err(e.into()),
    }
}

fn simulate(config: &AppConfig, seed: Option<u64>, cards: u64) -> Result<()> {
    let mut engine = engine(config, seed);
    let report = simulate_losing_cards(&mut engine, cards);
    println!("{}", serde_json::to_string_pretty(&report)?);
    println!(
        "Clean: {:.2}%  Residual: {:.4}%  Exhausted draws: {}",
        report.clean_rate() * 100.0,
        report.residual_rate() * 100.0,
        engine.exhausted_draws()
    );
    Ok(())
}

fn register(name: String, email: String, password: String) -> Result<()> {
    let input = RegistrationInput {
        name,
        email,
        password,
    };
    match validate_registration(&input) {
        Ok(registration) => {
            println!("Registration valid for {} <{}>", registration.name, registration.email);
            Ok(())
        }
        Err(errors) => {
            for error in errors.iter() {
                eprintln!("  {}", error);
            }
            bail!("registration rejected");
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
