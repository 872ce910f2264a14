//! # Panierr CLI
//!
//! A terminal front end for the cart engine. Each invocation loads the
//! stored cart, runs one command, and lets the engine persist the result.
//!
//! ## Usage
//! ```text
//! panierr [--config <file>] [--data-dir <dir>] <command>
//!
//!   add <id> <name> <price> [quantity]   Add an item (or add to its quantity)
//!   remove <id>                          Remove an item
//!   qty <id> <quantity>                  Set a quantity (0 or less removes)
//!   discount <code>                      Apply a catalog discount
//!   undiscount                           Remove the active discount
//!   clear                                Empty the cart
//!   show [--json]                        Print items and totals
//!   codes                                List the discount catalog
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (`RUST_LOG`, default `info`)
//! 2. Load `PanierrConfig` (file, then `PANIERR_*` environment)
//! 3. Open the file store (platform data dir, or `--data-dir`)
//! 4. Build the engine with an error callback, which runs autoload
//! 5. Run the command; any reported cart error makes the exit code non-zero

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};

use panierr::{CartItem, FileStorage, Panierr, PanierrConfig, StorageError};
use panierr_core::{validation, ValidationError};
use thiserror::Error;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: panierr [--config <file>] [--data-dir <dir>] \
<add|remove|qty|discount|undiscount|clear|show|codes> [args]";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}\n{}", USAGE)]
    Usage(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Cannot open cart storage: {0}")]
    Storage(#[from] StorageError),

    #[error("Cannot render cart: {0}")]
    Json(#[from] serde_json::Error),

    /// The engine reported failures through its error callback.
    #[error("{}", .0.join("\n"))]
    Cart(Vec<String>),
}

type CliResult<T> = Result<T, CliError>;

// =============================================================================
// Command Line
// =============================================================================

#[derive(Debug, PartialEq)]
enum Command {
    Add(CartItem),
    Remove(String),
    Quantity(String, i64),
    Discount(String),
    Undiscount,
    Clear,
    Show { json: bool },
    Codes,
}

#[derive(Debug, PartialEq)]
struct Invocation {
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    command: Command,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> CliResult<Invocation> {
    let mut args = args.into_iter();
    let mut config_path = None;
    let mut data_dir = None;

    let name = loop {
        match args.next() {
            Some(flag) if flag == "--config" => config_path = Some(flag_value(&mut args, &flag)?),
            Some(flag) if flag == "--data-dir" => data_dir = Some(flag_value(&mut args, &flag)?),
            Some(name) => break name,
            None => return Err(CliError::Usage("missing command".into())),
        }
    };

    let rest: Vec<String> = args.collect();
    let command = match (name.as_str(), rest.as_slice()) {
        ("add", [id, item_name, price]) => Command::Add(new_item(id, item_name, price, None)?),
        ("add", [id, item_name, price, quantity]) => {
            Command::Add(new_item(id, item_name, price, Some(quantity))?)
        }
        ("remove", [id]) => Command::Remove(id.clone()),
        ("qty", [id, quantity]) => {
            Command::Quantity(id.clone(), validation::parse_quantity(quantity)?)
        }
        ("discount", [code]) => Command::Discount(code.trim().to_string()),
        ("undiscount", []) => Command::Undiscount,
        ("clear", []) => Command::Clear,
        ("show", []) => Command::Show { json: false },
        ("show", [flag]) if flag == "--json" => Command::Show { json: true },
        ("codes", []) => Command::Codes,
        (name, _) => {
            return Err(CliError::Usage(format!(
                "unknown command or wrong arguments: {}",
                name
            )))
        }
    };

    Ok(Invocation {
        config_path,
        data_dir,
        command,
    })
}

fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> CliResult<PathBuf> {
    args.next()
        .map(PathBuf::from)
        .ok_or_else(|| CliError::Usage(format!("{} needs a value", flag)))
}

fn new_item(id: &str, name: &str, price: &str, quantity: Option<&String>) -> CliResult<CartItem> {
    validation::validate_item_id(id)?;
    validation::validate_item_name(name)?;
    let price = validation::parse_price(price)?;

    let quantity = match quantity {
        Some(raw) => {
            let parsed = validation::parse_quantity(raw)?;
            u32::try_from(parsed).map_err(|_| ValidationError::OutOfRange {
                field: "quantity".into(),
                min: 1,
                max: i64::from(u32::MAX),
            })?
        }
        None => 1,
    };
    validation::validate_quantity(quantity)?;

    Ok(CartItem::new(id, name, price, quantity))
}

// =============================================================================
// Running
// =============================================================================

fn main() -> ExitCode {
    init_tracing();

    match parse_args(std::env::args().skip(1)).and_then(run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(invocation: Invocation) -> CliResult<()> {
    let config = PanierrConfig::load_or_default(invocation.config_path);
    let storage = match invocation.data_dir {
        Some(dir) => FileStorage::new(dir)?,
        None => FileStorage::at_default_location()?,
    };
    debug!(dir = ?storage.dir(), key = %config.storage_key, "opening cart");

    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failures);
    let mut cart = Panierr::builder(config)
        .storage(storage)
        .on_error(move |e| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(e.to_string())
        })
        .build();

    execute(&mut cart, invocation.command)?;

    let failures = std::mem::take(&mut *failures.lock().unwrap_or_else(PoisonError::into_inner));
    if failures.is_empty() {
        Ok(())
    } else {
        Err(CliError::Cart(failures))
    }
}

fn execute(cart: &mut Panierr, command: Command) -> CliResult<()> {
    match command {
        Command::Add(item) => cart.add_item(item),
        Command::Remove(id) => cart.remove_item(&id),
        Command::Quantity(id, quantity) => cart.update_item_quantity(&id, quantity),
        Command::Discount(code) => cart.apply_discount(&code),
        Command::Undiscount => cart.remove_discount(),
        Command::Clear => cart.clear_cart(),
        Command::Show { json: false } => print!("{}", render_cart(cart)),
        Command::Show { json: true } => println!("{}", render_json(cart)?),
        Command::Codes => print!("{}", render_codes(cart.config())),
    }
    Ok(())
}

// =============================================================================
// Output
// =============================================================================

fn render_cart(cart: &Panierr) -> String {
    let mut out = String::new();
    let items = cart.get_cart_items();
    if items.is_empty() {
        out.push_str("Cart is empty\n");
    }
    for item in &items {
        out.push_str(&format!(
            "{:<12} {:<24} {:>4} x {:>12} = {:>12}\n",
            item.id,
            item.name,
            item.quantity,
            cart.format_price(item.price),
            cart.format_price(item.line_total()),
        ));
    }

    let totals = cart.calculate_totals();
    out.push_str(&format!("Items:    {}\n", totals.total_items));
    out.push_str(&format!("Subtotal: {}\n", cart.format_price(totals.total_price)));
    for discount in cart.applied_discounts() {
        out.push_str(&format!(
            "Discount: {} (-{})\n",
            discount.code,
            cart.format_price(totals.discount_amount)
        ));
    }
    out.push_str(&format!("Total:    {}\n", cart.format_price(totals.final_price)));
    out
}

fn render_json(cart: &Panierr) -> CliResult<String> {
    let body = serde_json::json!({
        "cartItems": cart.get_cart_items(),
        "discountsApplied": cart.applied_discounts(),
        "totals": cart.calculate_totals(),
    });
    Ok(serde_json::to_string_pretty(&body)?)
}

fn render_codes(config: &PanierrConfig) -> String {
    if config.discounts.is_empty() {
        return "No discount codes configured\n".to_string();
    }
    config
        .discounts
        .iter()
        .map(|d| format!("{:<16} {:<10} {}\n", d.code, d.kind, d.amount))
        .collect()
}

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so stdout stays clean for `show --json`.
/// - `RUST_LOG=debug` - Show every engine operation
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
