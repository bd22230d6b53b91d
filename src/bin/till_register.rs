//! till-register: standalone register loop.
//!
//! Drives the reconciliation engine from stdin against the configured
//! backend: each line is resolved as scanned/typed input and the projected
//! receipt is printed after every cart mutation. Useful for smoke-testing
//! a backend without a browser front end.
//!
//! ## Commands
//! - `:qty CODE N` sets a line quantity (zero removes it)
//! - `:clear` empties the cart
//! - `:quit` exits
//!
//! Anything else is resolved as scan/search input.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use till::clients::{BackendClient, BackendSettings};
use till::config::{self, RegisterConfig};
use till::engine::{Reconciler, ResolveOutcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::init_tracing();

    let config = RegisterConfig::load(None).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(backend = %config.backend.base_url, "Starting till register");

    let backend = Arc::new(BackendClient::new(BackendSettings {
        base_url: config.backend.base_url.clone(),
        timeout: config.backend.timeout(),
    })?);

    let mut engine = Reconciler::new(&config, backend.clone(), backend.clone(), backend);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => {}
            ":quit" => break,
            ":clear" => {
                engine.clear_cart();
                println!("cart cleared");
            }
            _ if input.starts_with(":qty") => {
                set_quantity(&mut engine, input);
            }
            _ => match engine.resolve_and_add(input).await {
                Ok(outcome) => report(&engine, outcome),
                Err(e) => println!("rejected: {e}"),
            },
        }
    }
    Ok(())
}

fn set_quantity(engine: &mut Reconciler, input: &str) {
    let rest = input.trim_start_matches(":qty").trim();
    let mut parts = rest.split_whitespace();
    match (
        parts.next(),
        parts.next().and_then(|q| q.parse::<Decimal>().ok()),
    ) {
        (Some(code), Some(quantity)) => {
            engine.update_quantity(code, quantity);
            print_receipt(engine);
        }
        _ => println!("usage: :qty CODE QUANTITY"),
    }
}

fn report(engine: &Reconciler, outcome: ResolveOutcome) {
    match outcome {
        ResolveOutcome::Added { item_code } => {
            println!("added {item_code}");
            print_receipt(engine);
        }
        ResolveOutcome::SearchTerm(term) => println!("no match, search for: {term}"),
        ResolveOutcome::NotFound { code } => println!("unknown item {code}"),
        ResolveOutcome::OutOfStock { item_code } => println!("{item_code} is out of stock"),
        ResolveOutcome::Ignored => {}
    }
}

fn print_receipt(engine: &Reconciler) {
    let receipt = engine.receipt();
    for line in &receipt.lines {
        println!(
            "  {:<20} {:>10} x {:>10} = {:>12}",
            line.item_code, line.quantity, line.effective_price, line.total
        );
    }
    println!(
        "  subtotal {}  coupons -{}  total {}",
        receipt.subtotal, receipt.coupon_discount, receipt.total
    );
}
