use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ap2",
    version,
    about = "Agent Payments Protocol mandate exchange: eligibility checks and an in-process demo"
)]
pub struct Cli {
    /// YAML config file (defaults to AP2_* environment variables)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long = "json-logs", global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the payment methods of an account that match merchant criteria
    Eligible(EligibleArgs),
    /// Run the full shopping -> merchant -> processor -> credentials flow in-process
    Demo(DemoArgs),
    /// Print the effective configuration as YAML
    Config,
}

#[derive(Args, Debug)]
pub struct EligibleArgs {
    /// Account id (email)
    #[arg(long)]
    pub account: String,

    /// JSON file with one PaymentMethodData object or an array of them
    #[arg(long)]
    pub criteria: PathBuf,

    /// YAML accounts file (defaults to the demo accounts)
    #[arg(long)]
    pub accounts: Option<PathBuf>,

    /// Print the result as a JSON array
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Challenge response to submit (defaults to the configured code)
    #[arg(long)]
    pub otp: Option<String>,

    /// Shopping account
    #[arg(long, default_value = "bugsbunny@gmail.com")]
    pub user: String,

    /// What to shop for
    #[arg(long, default_value = "red shoes")]
    pub query: String,

    /// Payment method alias (defaults to the first eligible one)
    #[arg(long)]
    pub payment_method: Option<String>,
}
