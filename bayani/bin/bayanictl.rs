//! Command-line utility for inspecting the Bayani delivery rules
//!
//! Every command answers a question the storefront asks, either right now or
//! at a pinned `--at` instant:
//! - Which delivery options checkout offers, and at what fee
//! - When a standard delivery would arrive
//! - When the next weekly delivery run is, and how long ordering stays open
//! - What the order history says about a past order

#![allow(clippy::too_many_lines)]

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use bayani::config::Config;
use bayani_common::{
    Signal,
    clock::{Clock, SystemClock},
};
use bayani_delivery::{
    Amount, CountdownConfig, CountdownTicker, DeliveryKind, DeliveryOption, DeliveryRules,
    ScheduleSnapshot, format_delivery_date, parse_local_instant,
};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::sync::broadcast;

/// Command-line utility for inspecting the Bayani delivery rules
#[derive(Parser, Debug)]
#[command(name = "bayanictl")]
#[command(about = "Inspect the Bayani delivery schedule", long_about = None)]
#[command(version)]
struct Cli {
    /// Reference instant in storefront local time, e.g. 2025-10-11T09:00
    /// (defaults to the current time)
    #[arg(long, global = true, value_parser = parse_instant)]
    at: Option<NaiveDateTime>,

    /// RON config file with rule overrides (defaults to the stock rules)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the delivery options offered at checkout
    Options {
        /// Apply the large-basket fee waiver for this cart total
        #[arg(long)]
        cart_total: Option<Amount>,
    },
    /// Show when a standard delivery placed now would arrive
    Standard,
    /// Show the same-day fee for a cart total
    Fee {
        /// Cart total, e.g. 999.50 or ₱1,000
        total: Amount,
    },
    /// Show the next delivery run and its order cutoff
    Cycle,
    /// Show the time left before the order cutoff
    Countdown {
        /// Watch mode - keep updating until Ctrl+C
        #[arg(long)]
        watch: bool,

        /// Update interval in milliseconds (for watch mode)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Show the order-history status line for an order
    Status {
        /// Delivery kind (standard, same-day)
        kind: DeliveryKind,

        /// When the order was placed
        #[arg(value_parser = parse_instant)]
        order: NaiveDateTime,

        /// When the order is (or was) delivered
        #[arg(value_parser = parse_instant)]
        delivery: NaiveDateTime,
    },
    /// Check whether a product category can be delivered same-day right now
    Eligible {
        /// Product category, e.g. produce
        category: String,
    },
    /// Show the same-day delivery estimate
    Eta,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Ron,
}

fn parse_instant(s: &str) -> Result<NaiveDateTime, String> {
    parse_local_instant(s).map_err(|e| format!("Invalid local date/time '{s}': {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.validate()?;

    let clock = config.clock.system_clock()?;
    let now = cli.at.unwrap_or_else(|| clock.now());
    let rules = &config.rules;
    let format = cli.format;

    match cli.command {
        Commands::Options { cart_total } => {
            let options = cart_total.map_or_else(
                || rules.list_delivery_options(now),
                |total| rules.list_delivery_options_for_cart(now, total),
            );
            cmd_options(&options, format)?;
        }
        Commands::Standard => {
            let date = rules.next_standard_delivery_date(now);
            match format {
                Format::Ron => print_ron(&date)?,
                Format::Text => println!("{}", format_delivery_date(date, false)),
            }
        }
        Commands::Fee { total } => cmd_fee(rules, now, total, format)?,
        Commands::Cycle => cmd_cycle(&rules.schedule(now), format)?,
        Commands::Countdown { watch, interval_ms } => {
            if watch {
                anyhow::ensure!(
                    cli.at.is_none(),
                    "--watch counts down from the current time, drop --at"
                );
                let countdown = CountdownConfig {
                    tick_interval_ms: interval_ms.unwrap_or(config.countdown.tick_interval_ms),
                };
                cmd_watch(config.rules.clone(), clock, &countdown, format).await?;
            } else {
                display_countdown(&rules.schedule(now), format)?;
            }
        }
        Commands::Status {
            kind,
            order,
            delivery,
        } => {
            let message = rules.delivery_status_message(kind, order, delivery, now);
            match format {
                Format::Ron => print_ron(&message)?,
                Format::Text => println!("{message}"),
            }
        }
        Commands::Eligible { category } => {
            let eligible = rules.is_eligible_for_same_day(&category, now);
            match format {
                Format::Ron => print_ron(&eligible)?,
                Format::Text if eligible => println!("{category}: same-day delivery available"),
                Format::Text => println!("{category}: same-day delivery not available"),
            }
        }
        Commands::Eta => {
            let eta = rules.same_day_eta(now);
            match format {
                Format::Ron => print_ron(&eta)?,
                Format::Text if rules.is_same_day_available(now) => println!("{eta}"),
                Format::Text => println!("Same-day delivery is not offered right now"),
            }
        }
    }

    Ok(())
}

fn print_ron<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let output = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
        .context("Failed to serialise output")?;
    println!("{output}");
    Ok(())
}

/// List the checkout options
fn cmd_options(options: &[DeliveryOption], format: Format) -> anyhow::Result<()> {
    if format == Format::Ron {
        return print_ron(options);
    }

    println!("{:<10} {:>10}  {:<36} DESCRIPTION", "KIND", "FEE", "ARRIVES");
    println!("{}", "-".repeat(96));

    for option in options {
        let arrives = option.window.as_ref().map_or_else(
            || format_delivery_date(option.delivery_at, false),
            |window| format!("today, {window}"),
        );
        let kind = option.kind.to_string();
        let fee = option.fee.to_string();
        println!("{kind:<10} {fee:>10}  {arrives:<36} {}", option.description);
    }

    Ok(())
}

/// Show the same-day fee for a cart
fn cmd_fee(
    rules: &DeliveryRules,
    now: NaiveDateTime,
    total: Amount,
    format: Format,
) -> anyhow::Result<()> {
    let fee = rules.same_day_fee(total);

    if format == Format::Ron {
        return print_ron(&fee);
    }

    println!("Same-day fee for a {total} cart: {fee}");
    if !rules.is_same_day_available(now) {
        println!("Same-day delivery is not offered right now");
    }

    Ok(())
}

/// Show the next delivery run
fn cmd_cycle(snapshot: &ScheduleSnapshot, format: Format) -> anyhow::Result<()> {
    if format == Format::Ron {
        return print_ron(snapshot);
    }

    println!(
        "Next delivery: {}",
        format_delivery_date(snapshot.next_delivery, true)
    );
    println!(
        "Order cutoff:  {}",
        format_delivery_date(snapshot.cutoff, true)
    );
    println!("Ordering:      {}", snapshot.state);

    Ok(())
}

fn display_countdown(snapshot: &ScheduleSnapshot, format: Format) -> anyhow::Result<()> {
    if format == Format::Ron {
        return print_ron(snapshot);
    }

    if snapshot.remaining.is_zero() {
        println!(
            "Ordering closed for the {} delivery",
            format_delivery_date(snapshot.next_delivery, false)
        );
    } else {
        println!(
            "{} left to order for the {} delivery",
            snapshot.remaining,
            format_delivery_date(snapshot.next_delivery, false)
        );
    }

    Ok(())
}

/// Follow the live countdown until Ctrl+C
async fn cmd_watch(
    rules: DeliveryRules,
    clock: SystemClock,
    countdown: &CountdownConfig,
    format: Format,
) -> anyhow::Result<()> {
    let (ticker, mut receiver) = CountdownTicker::new(Arc::new(rules), Arc::new(clock), countdown)?;
    let (shutdown, signals) = broadcast::channel(1);
    let task = tokio::spawn(async move { ticker.serve(signals).await });

    loop {
        if format == Format::Text {
            // Clear screen
            print!("\x1B[2J\x1B[1;1H");
        }

        let snapshot = *receiver.borrow_and_update();
        display_countdown(&snapshot, format)?;

        if format == Format::Text {
            println!("\nPress Ctrl+C to exit");
        }

        tokio::select! {
            changed = receiver.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    // The ticker may already have stopped on its own
    let _ = shutdown.send(Signal::Shutdown);
    task.await.context("Countdown task failed")?;

    Ok(())
}
