//! Archer Audit CLI

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing_subscriber::EnvFilter;
use url::Url;

use archer_audit::config;
use archer_audit::report::{self, ParameterReport};
use archer_audit::transport::{SystemRunner, Transport, TransportSettings};
use archer_audit::{ArcherClient, ClientConfig, TransportKind};

/// Archer Audit - inspect RSA Archer security parameters
#[derive(Parser)]
#[command(name = "archer-audit", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Archer base URL
    #[arg(long)]
    url: Option<String>,

    /// Archer instance name
    #[arg(short, long)]
    instance: Option<String>,

    /// Login username
    #[arg(short, long)]
    username: Option<String>,

    /// Login user domain
    #[arg(short, long)]
    domain: Option<String>,

    /// Login password (defaults to $ARCHER_PASSWORD)
    #[arg(long)]
    password: Option<String>,

    /// Skip TLS certificate validation
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Force a transport (curl or powershell)
    #[arg(long)]
    transport: Option<TransportKind>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate and confirm the credentials are accepted
    Login {
        #[command(flatten)]
        conn: ConnectionArgs,
    },

    /// Fetch the administrative user, general user and services parameters
    Params {
        #[command(flatten)]
        conn: ConnectionArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show which transport would carry requests on this host
    Transport {
        #[command(flatten)]
        conn: ConnectionArgs,
    },

    /// Print a previously saved JSON report
    Report {
        /// Path to the JSON report
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "archer_audit=debug"
    } else {
        "archer_audit=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();
}

fn build_config(conn: ConnectionArgs) -> archer_audit::Result<ClientConfig> {
    let mut client_config = if let Some(ref path) = conn.config {
        config::load_config(path)?
    } else {
        let default_path = Path::new("config/default.toml");
        if default_path.exists() {
            config::load_config(default_path)?
        } else {
            ClientConfig::default()
        }
    };

    config::merge_cli_args(
        &mut client_config,
        conn.url,
        conn.instance,
        conn.username,
        conn.domain,
        conn.password,
        conn.insecure,
        conn.transport,
    );

    Ok(client_config)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn print_report(report: &ParameterReport) {
    println!(
        "\n  {} {}",
        "Instance:".bold(),
        report.instance.as_deref().unwrap_or("-").green()
    );
    println!("  {} {}", "URL:".bold(), report.url.cyan());
    println!(
        "  {} {}",
        "Collected:".bold(),
        report.collected_at.format("%Y-%m-%d %H:%M:%S")
    );

    for entry in &report.parameters {
        println!("\n{}", format!("  {}", entry.label).bold());
        println!("  {}", "─".repeat(35));

        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        if let Value::Object(fields) = &entry.fields {
            for (key, value) in fields {
                builder.push_record([key.clone(), display_value(value)]);
            }
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        println!("{table}");
    }
}

async fn run(cli: Cli) -> archer_audit::Result<()> {
    match cli.command {
        Commands::Login { conn } => {
            init_tracing(conn.verbose);
            let client_config = build_config(conn)?;
            let client = ArcherClient::connect(client_config).await?;
            println!(
                "  {} {} via {}",
                "Authenticated:".green().bold(),
                client,
                client.transport_kind().to_string().cyan()
            );
        }

        Commands::Params {
            conn,
            format,
            output,
        } => {
            init_tracing(conn.verbose);
            let client_config = build_config(conn)?;
            let mut client = ArcherClient::connect(client_config).await?;
            let parameter_report = ParameterReport::collect(&mut client).await?;

            if let Some(ref path) = output {
                report::json::export(&parameter_report, path)?;
                println!(
                    "\n  {} {}",
                    "Report saved to:".bold(),
                    path.display().to_string().green()
                );
            } else if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&parameter_report)?);
            } else {
                print_report(&parameter_report);
            }
        }

        Commands::Transport { conn } => {
            init_tracing(conn.verbose);
            let client_config = build_config(conn)?;
            let settings = TransportSettings {
                base_url: Url::parse(&client_config.url)?,
                ssl_verify: client_config.ssl_verify,
            };
            let transport = Transport::select(&SystemRunner::new(), settings, client_config.transport)?;
            println!(
                "  {} {} ({})",
                "Transport:".bold(),
                transport.kind().to_string().cyan(),
                transport.kind().program()
            );
        }

        Commands::Report { input } => {
            init_tracing(false);
            let parameter_report = report::json::load(&input)?;
            print_report(&parameter_report);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("  {} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_defaults_to_table() {
        let cli = Cli::try_parse_from(["archer-audit", "params"]).expect("parses");
        match cli.command {
            Commands::Params { format, .. } => assert_eq!(format, OutputFormat::Table),
            _ => panic!("expected params command"),
        }
    }

    #[test]
    fn test_format_json_accepted() {
        let cli = Cli::try_parse_from(["archer-audit", "params", "--format", "json"]).expect("parses");
        match cli.command {
            Commands::Params { format, .. } => assert_eq!(format, OutputFormat::Json),
            _ => panic!("expected params command"),
        }
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["archer-audit", "params", "--format", "jsn"]).is_err());
    }
}
