// RWA-Settlement — Operator quoting CLI
// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Moroya Sakamoto

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use rwa_settlement::{
    day_of_month_utc, estimate_returns, SettlementBreakdown, SettlementCalculator,
    SettlementConfig,
};

const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

#[derive(Parser, Debug)]
#[command(
    name = "rwa-settle",
    version,
    about = "Settlement quotes for fractional asset sales"
)]
struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[arg(
        long,
        global = true,
        help = "JSON config file (defaults overlaid with RWA_* variables otherwise)"
    )]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the active settlement constants
    Config,
    /// Quote a primary-market purchase
    Primary {
        #[arg(long)]
        units: u64,
    },
    /// Quote a purchase from a listing
    Secondary {
        #[arg(long, help = "Listing price per unit in lamports")]
        price: u64,
        #[arg(long)]
        units: u64,
    },
    /// Print the minimum resale price per unit
    MinPrice,
    /// Check a listing price against the resale floor
    ValidatePrice {
        #[arg(long)]
        price: u64,
    },
    /// Check whether distribution claims are open
    CanClaim {
        #[arg(long, help = "Day of month (defaults to today, UTC)")]
        day: Option<u8>,
    },
    /// Compute a holder's share of a distribution pool
    Share {
        #[arg(long, help = "Pool balance in lamports")]
        pool: u64,
        #[arg(long, help = "Units held")]
        units: u64,
    },
    /// Project simple-interest returns at an annual yield
    Estimate {
        #[arg(long, help = "Principal in lamports")]
        amount: u64,
        #[arg(long, help = "Annual yield in percent")]
        apy: u16,
        #[arg(long, help = "Days held")]
        days: u32,
    },
}

#[derive(Serialize)]
struct JsonOut<T> {
    ok: bool,
    data: T,
}

#[derive(Serialize)]
struct ConfigView<'a> {
    #[serde(flatten)]
    config: &'a SettlementConfig,
    minimum_resale_price: u64,
}

#[derive(Serialize)]
struct MinPriceView {
    minimum_resale_price: u64,
}

#[derive(Serialize)]
struct PriceCheckView {
    price: u64,
    minimum_resale_price: u64,
}

#[derive(Serialize)]
struct ClaimView {
    day: u8,
    distribution_day: u8,
    can_claim: bool,
}

#[derive(Serialize)]
struct EstimateView {
    amount: u64,
    apy_percent: u16,
    days_held: u32,
    estimated_returns: u64,
}

#[derive(Serialize)]
struct ShareView {
    pool: u64,
    units_held: u64,
    share: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SettlementConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SettlementConfig::from_env().context("loading RWA_* environment")?,
    };
    let calc = SettlementCalculator::new(config)?;

    match cli.command {
        Commands::Config => {
            let view = ConfigView {
                config: calc.config(),
                minimum_resale_price: calc.compute_minimum_resale_price(),
            };
            print_one(cli.json, view, |v| {
                [
                    row("token price", &lamports(v.config.token_price)),
                    row("primary fee", &format!("{} bps", v.config.primary_fee_bps)),
                    row(
                        "secondary fee",
                        &format!("{} bps", v.config.secondary_fee_bps),
                    ),
                    row("early sale penalty", &lamports(v.config.early_sale_penalty)),
                    row(
                        "units per asset",
                        &v.config.total_units_per_asset.to_string(),
                    ),
                    row("distribution day", &v.config.distribution_day.to_string()),
                    row("minimum resale", &lamports(v.minimum_resale_price)),
                ]
                .join("\n")
            })
        }
        Commands::Primary { units } => {
            let breakdown = calc.compute_primary_purchase(units)?;
            print_one(cli.json, breakdown, render_breakdown)
        }
        Commands::Secondary { price, units } => {
            let breakdown = calc.compute_secondary_purchase(price, units)?;
            print_one(cli.json, breakdown, render_breakdown)
        }
        Commands::MinPrice => {
            let view = MinPriceView {
                minimum_resale_price: calc.compute_minimum_resale_price(),
            };
            print_one(cli.json, view, |v| lamports(v.minimum_resale_price))
        }
        Commands::ValidatePrice { price } => {
            calc.validate_listing_price(price)?;
            let view = PriceCheckView {
                price,
                minimum_resale_price: calc.compute_minimum_resale_price(),
            };
            print_one(cli.json, view, |v| {
                format!(
                    "price ok: {} >= {}",
                    lamports(v.price),
                    lamports(v.minimum_resale_price)
                )
            })
        }
        Commands::CanClaim { day } => {
            let day = match day {
                Some(d) => d,
                None => today_utc()?,
            };
            let view = ClaimView {
                day,
                distribution_day: calc.config().distribution_day,
                can_claim: calc.can_claim_distribution(day),
            };
            print_one(cli.json, view, |v| {
                if v.can_claim {
                    format!("claims open (day {})", v.day)
                } else {
                    format!(
                        "claims closed (day {}, opens on day {})",
                        v.day, v.distribution_day
                    )
                }
            })
        }
        Commands::Share { pool, units } => {
            let share = calc.compute_distribution_share(pool, units)?;
            let view = ShareView {
                pool,
                units_held: units,
                share,
            };
            print_one(cli.json, view, |v| lamports(v.share))
        }
        Commands::Estimate { amount, apy, days } => {
            let view = EstimateView {
                amount,
                apy_percent: apy,
                days_held: days,
                estimated_returns: estimate_returns(amount, apy, days)?,
            };
            print_one(cli.json, view, |v| lamports(v.estimated_returns))
        }
    }
}

fn print_one<T: Serialize>(json: bool, data: T, render: impl Fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", render(&data));
    }
    Ok(())
}

fn render_breakdown(b: &SettlementBreakdown) -> String {
    let market = match b.market {
        rwa_settlement::Market::Primary => "primary",
        rwa_settlement::Market::Secondary => "secondary",
    };
    [
        row("market", market),
        row("units", &b.units.to_string()),
        row("unit price", &lamports(b.unit_price)),
        row("base cost", &lamports(b.base_cost)),
        row("fee", &lamports(b.fee)),
        row("penalty", &lamports(b.penalty)),
        row("buyer pays", &lamports(b.total_buyer_pays)),
        row("seller receives", &lamports(b.seller_receives)),
        row("platform receives", &lamports(b.platform_receives)),
    ]
    .join("\n")
}

fn row(label: &str, value: &str) -> String {
    format!("{label:<20}{value}")
}

fn lamports(amount: u64) -> String {
    format!("{amount} lamports ({} SOL)", sol(amount))
}

fn sol(amount: u64) -> String {
    let whole = amount / LAMPORTS_PER_SOL;
    let frac = amount % LAMPORTS_PER_SOL;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:09}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

fn today_utc() -> anyhow::Result<u8> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before 1970")?
        .as_secs();
    let secs = i64::try_from(secs).context("system clock out of range")?;
    Ok(day_of_month_utc(secs))
}
