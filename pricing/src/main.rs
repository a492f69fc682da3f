//! cpmm-quote - command line front end for the pricing engine
//!
//! Takes a reserve snapshot on the command line and prints one JSON object
//! with the computed value, or `null` when the pool cannot price the request.

use clap::{error::ErrorKind, Arg, ArgMatches, Command};
use serde_json::json;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cpmm_pricing::{
    minimum_acceptable_output, Direction, EngineConfig, LiquidityAction, PoolReserves,
    PricingEngine, PricingError, Result, SubsidyPolicy, BASE_DECIMALS, DEFAULT_SUBSIDY, VERSION,
};

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    init_logging(log_level)?;

    if let Some(output_path) = matches.get_one::<String>("generate-config") {
        EngineConfig::liquidity_baking().save_to_file(output_path)?;
        info!("Generated example config at: {}", output_path);
        return Ok(());
    }

    let mut config = EngineConfig::load(matches.get_one::<String>("config").map(String::as_str))?;
    if matches.get_flag("subsidy") && !config.subsidy.enabled {
        config.subsidy = SubsidyPolicy::enabled(DEFAULT_SUBSIDY);
    }
    debug!(?config, "Pricing configuration");
    let engine = PricingEngine::validated(config)?;

    let report = match matches.subcommand() {
        Some(("swap", args)) => swap(&engine, args)?,
        Some(("add-liquidity", args)) => add_liquidity(&engine, args)?,
        Some(("remove-liquidity", args)) => remove_liquidity(&engine, args)?,
        Some(("rate", args)) => rate(&engine, args)?,
        Some(("market-rate", args)) => market_rate(&engine, args)?,
        Some(("impact", args)) => impact(&engine, args)?,
        Some(("min-out", args)) => min_out(args)?,
        Some(("route", args)) => route(&engine, args)?,
        _ => missing_subcommand().exit(),
    };

    if report["result"].is_null() {
        warn!("Unable to price this request");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cli() -> Command {
    Command::new("cpmm-quote")
        .version(VERSION)
        .about("Exact constant-product AMM quotes")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .global(true)
                .help("Log level (trace, debug, info, warn, error)")
                .default_value("info"),
        )
        .arg(
            Arg::new("subsidy")
                .long("subsidy")
                .global(true)
                .help("Credit the per-block subsidy to the base reserve")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("OUTPUT")
                .help("Generate example config and exit"),
        )
        .subcommand(
            Command::new("swap")
                .about("Quote a swap (exact input or exact output)")
                .arg(direction_arg())
                .arg(value_arg("amount-in", "Amount sold").conflicts_with("amount-out"))
                .arg(
                    value_arg("amount-out", "Amount wanted")
                        .required_unless_present("amount-in"),
                )
                .arg(decimals_arg("decimals", "Quote token decimals", "0"))
                .args(reserve_args()),
        )
        .subcommand(
            Command::new("add-liquidity")
                .about("Liquidity minted and quote required for a base deposit")
                .arg(value_arg("base-in", "Base deposited").required(true))
                .arg(value_arg("total-supply", "Outstanding liquidity supply").required(true))
                .args(reserve_args()),
        )
        .subcommand(
            Command::new("remove-liquidity")
                .about("Assets returned for burning liquidity")
                .arg(value_arg("burned", "Liquidity burned").required(true))
                .arg(value_arg("total-supply", "Outstanding liquidity supply").required(true))
                .args(reserve_args()),
        )
        .subcommand(
            Command::new("rate")
                .about("Effective exchange rate for a trade size, in whole tokens")
                .arg(direction_arg())
                .arg(value_arg("amount-in", "Amount sold").required(true))
                .arg(decimals_arg("base-decimals", "Base decimals", "6"))
                .arg(decimals_arg("quote-decimals", "Quote token decimals", "0"))
                .args(reserve_args()),
        )
        .subcommand(
            Command::new("market-rate")
                .about("Fee-free mid-market rate in whole tokens")
                .arg(direction_arg())
                .arg(decimals_arg("base-decimals", "Base decimals", "6"))
                .arg(decimals_arg("quote-decimals", "Quote token decimals", "0"))
                .args(reserve_args()),
        )
        .subcommand(
            Command::new("impact")
                .about("Price impact of a trade as a fraction")
                .arg(direction_arg())
                .arg(value_arg("amount-in", "Amount sold").required(true))
                .args(reserve_args()),
        )
        .subcommand(
            Command::new("min-out")
                .about("Minimum acceptable output for a slippage tolerance")
                .arg(value_arg("desired", "Quoted output").required(true))
                .arg(value_arg("slippage", "Allowed slippage in [0, 1]").required(true)),
        )
        .subcommand(
            Command::new("route")
                .about("Quote token of one pool into quote token of another via base")
                .arg(value_arg("amount-in", "Quote tokens sold into the first pool").required(true))
                .arg(value_arg("from-base", "First pool base reserve").required(true))
                .arg(value_arg("from-quote", "First pool quote reserve").required(true))
                .arg(value_arg("to-base", "Second pool base reserve").required(true))
                .arg(value_arg("to-quote", "Second pool quote reserve").required(true)),
        )
}

/// Every run needs a subcommand unless it only generates a config file
fn missing_subcommand() -> clap::Error {
    cli().error(
        ErrorKind::MissingSubcommand,
        "a subcommand is required unless --generate-config is given",
    )
}

fn value_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).value_name("AMOUNT").help(help)
}

fn decimals_arg(name: &'static str, help: &'static str, default: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("DECIMALS")
        .help(help)
        .value_parser(clap::value_parser!(u8))
        .default_value(default)
}

fn direction_arg() -> Arg {
    Arg::new("direction")
        .short('d')
        .long("direction")
        .value_name("DIRECTION")
        .help("base-to-quote or quote-to-base")
        .required(true)
}

fn reserve_args() -> Vec<Arg> {
    vec![
        value_arg("base", "Base reserve in smallest units").required(true),
        value_arg("quote", "Quote reserve in smallest units").required(true),
    ]
}

fn text<'a>(args: &'a ArgMatches, name: &str) -> Option<&'a str> {
    args.get_one::<String>(name).map(String::as_str)
}

fn decimals(args: &ArgMatches, name: &str) -> u8 {
    args.get_one::<u8>(name).copied().unwrap_or(BASE_DECIMALS)
}

fn direction(args: &ArgMatches) -> Result<Direction> {
    text(args, "direction")
        .ok_or_else(|| PricingError::internal("--direction is required"))?
        .parse()
}

fn reserves(args: &ArgMatches, base: &str, quote: &str) -> Option<PoolReserves> {
    let parsed = PoolReserves::parse(text(args, base), text(args, quote));
    if parsed.is_none() {
        warn!("Reserves must be non-negative numbers");
    }
    parsed
}

fn swap(engine: &PricingEngine, args: &ArgMatches) -> Result<serde_json::Value> {
    let direction = direction(args)?;
    let pool = reserves(args, "base", "quote");
    let result = match text(args, "amount-in") {
        Some(amount_in) => pool
            .as_ref()
            .and_then(|pool| engine.quote_output(direction, amount_in, pool)),
        None => pool.as_ref().and_then(|pool| {
            engine.required_input_for_exact_output(
                direction,
                text(args, "amount-out"),
                pool,
                decimals(args, "decimals"),
            )
        }),
    };
    Ok(json!({ "operation": "swap", "direction": direction, "result": result }))
}

fn add_liquidity(engine: &PricingEngine, args: &ArgMatches) -> Result<serde_json::Value> {
    let result = action_amounts(args, "base-in").and_then(|(base_in, supply)| {
        let pool = reserves(args, "base", "quote")?;
        engine.apply_liquidity(&LiquidityAction::add(base_in, supply), &pool)
    });
    Ok(json!({ "operation": "add_liquidity", "result": result }))
}

fn remove_liquidity(engine: &PricingEngine, args: &ArgMatches) -> Result<serde_json::Value> {
    let result = action_amounts(args, "burned").and_then(|(burned, supply)| {
        let pool = reserves(args, "base", "quote")?;
        engine.apply_liquidity(&LiquidityAction::remove(burned, supply), &pool)
    });
    Ok(json!({ "operation": "remove_liquidity", "result": result }))
}

fn action_amounts(
    args: &ArgMatches,
    amount: &str,
) -> Option<(cpmm_pricing::Decimal, cpmm_pricing::Decimal)> {
    let amount = text(args, amount)?.parse().ok()?;
    let supply = text(args, "total-supply")?.parse().ok()?;
    Some((amount, supply))
}

fn rate(engine: &PricingEngine, args: &ArgMatches) -> Result<serde_json::Value> {
    let direction = direction(args)?;
    let result = reserves(args, "base", "quote").and_then(|pool| {
        engine.display_exchange_rate(
            direction,
            text(args, "amount-in"),
            &pool,
            decimals(args, "base-decimals"),
            decimals(args, "quote-decimals"),
        )
    });
    Ok(json!({ "operation": "rate", "direction": direction, "result": result }))
}

fn market_rate(engine: &PricingEngine, args: &ArgMatches) -> Result<serde_json::Value> {
    let direction = direction(args)?;
    let result = reserves(args, "base", "quote").and_then(|pool| {
        engine.market_rate(
            direction,
            &pool,
            decimals(args, "base-decimals"),
            decimals(args, "quote-decimals"),
        )
    });
    Ok(json!({ "operation": "market_rate", "direction": direction, "result": result }))
}

fn impact(engine: &PricingEngine, args: &ArgMatches) -> Result<serde_json::Value> {
    let direction = direction(args)?;
    let result = reserves(args, "base", "quote")
        .and_then(|pool| engine.price_impact(direction, text(args, "amount-in"), &pool));
    Ok(json!({ "operation": "impact", "direction": direction, "result": result }))
}

fn min_out(args: &ArgMatches) -> Result<serde_json::Value> {
    let result = minimum_acceptable_output(text(args, "desired"), text(args, "slippage"));
    Ok(json!({ "operation": "min_out", "result": result }))
}

fn route(engine: &PricingEngine, args: &ArgMatches) -> Result<serde_json::Value> {
    let result = reserves(args, "from-base", "from-quote").and_then(|from| {
        let to = reserves(args, "to-base", "to-quote")?;
        engine.cross_pool_output(text(args, "amount-in"), &from, &to)
    });
    Ok(json!({ "operation": "route", "result": result }))
}

/// Initialize logging
fn init_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => {
            eprintln!("Invalid log level: {}. Using 'info'", log_level);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("cpmm_pricing={level},cpmm_quote={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
