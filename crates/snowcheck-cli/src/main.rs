use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use snowcheck_catalog::fetch::{
    fetch_database_properties, fetch_schema_properties, fetch_warehouse_properties, object_exists,
};
use snowcheck_catalog::{
    fetch_all_grants, filter_grants, GrantTarget, IntrospectionConnection, ObjectLookup,
    SnowflakeConnection,
};
use snowcheck_core::{Config, ConnectionSettings, ProvisioningConfig, Report, Severity};
use snowcheck_engine::{Scenario, WarehouseExpectation};

/// Snowcheck - verify provisioned Snowflake objects against their configuration
#[derive(Parser)]
#[command(name = "snowcheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: snowcheck.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify one or more provisioning configuration files (run in parallel)
    Verify {
        /// Provisioning configuration files (JSON)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file for report.json
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Override the settle delay from the config file (seconds)
        #[arg(long)]
        settle_delay: Option<u64>,

        /// Also verify this warehouse
        #[arg(long)]
        warehouse: Option<String>,

        /// Expected size of --warehouse
        #[arg(long, requires = "warehouse")]
        warehouse_size: Option<String>,
    },

    /// Check whether an object exists
    Exists {
        kind: Kind,
        name: String,

        /// Containing database (schemas only)
        #[arg(short, long)]
        database: Option<String>,
    },

    /// Print the properties of an object as JSON
    Show {
        kind: Kind,
        name: String,

        /// Containing database (schemas only)
        #[arg(short, long)]
        database: Option<String>,
    },

    /// List grants on a database or schema
    Grants {
        database: String,

        #[arg(short, long)]
        schema: Option<String>,

        /// Only grants to this principal (defaults to verify.principal)
        #[arg(short, long)]
        principal: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Database,
    Schema,
    Warehouse,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "snowcheck=debug,snowcheck_catalog=debug,snowcheck_engine=debug,info"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    // Credentials may live in a .env file next to the config
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(anyhow::anyhow!("Failed to read .env: {}", e));
        }
    }

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("snowcheck.toml").exists() {
        Config::from_file(Path::new("snowcheck.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    let settings = ConnectionSettings::from_env()?.with_overrides(&config);
    tracing::debug!(?settings, "connection settings");

    match cli.command {
        Commands::Verify { files, output, settle_delay, warehouse, warehouse_size } => {
            let warehouse = warehouse.map(|name| {
                let expected = WarehouseExpectation::new(name);
                match warehouse_size {
                    Some(size) => expected.with_size(size),
                    None => expected,
                }
            });
            verify_command(&config, settings, &files, &output, settle_delay, warehouse, cli.verbose).await
        }
        Commands::Exists { kind, name, database } => {
            exists_command(&settings, kind, &name, database.as_deref()).await
        }
        Commands::Show { kind, name, database } => {
            show_command(&settings, kind, &name, database.as_deref()).await
        }
        Commands::Grants { database, schema, principal } => {
            let principal = principal.or_else(|| config.verify.principal.clone());
            grants_command(&settings, &database, schema.as_deref(), principal.as_deref()).await
        }
    }
}

/// Open and test a connection
async fn connect(settings: &ConnectionSettings) -> Result<SnowflakeConnection> {
    let conn = SnowflakeConnection::connect(settings)?;
    conn.ping().await
        .map_err(|e| anyhow::anyhow!("Failed to connect to warehouse: {}", e))?;
    tracing::debug!(account = conn.account(), driver = conn.name(), "connection ready");
    Ok(conn)
}

fn lookup(kind: Kind, name: &str, database: Option<&str>) -> Result<ObjectLookup> {
    Ok(match kind {
        Kind::Database => ObjectLookup::database(name),
        Kind::Warehouse => ObjectLookup::warehouse(name),
        Kind::Schema => {
            let database = database
                .ok_or_else(|| anyhow::anyhow!("Schemas need --database"))?;
            ObjectLookup::schema(database, name)
        }
    })
}

/// Verify command - one scenario per file, each on its own connection
async fn verify_command(
    config: &Config,
    settings: ConnectionSettings,
    files: &[PathBuf],
    output: &Path,
    settle_delay: Option<u64>,
    warehouse: Option<WarehouseExpectation>,
    verbose: bool,
) -> Result<()> {
    let settings = Arc::new(settings);
    let verify = Arc::new(config.verify.clone());

    let mut scenarios = JoinSet::new();

    for file in files {
        let provisioning = ProvisioningConfig::from_file(file)?;
        if verbose {
            eprintln!(
                "{} {} ({} objects)",
                "Loaded".cyan(),
                file.display(),
                provisioning.object_count()
            );
        }

        let mut scenario = Scenario::new(provisioning);
        if let Some(secs) = settle_delay {
            scenario = scenario.with_settle_delay(Duration::from_secs(secs));
        }
        if let Some(expected) = &warehouse {
            scenario = scenario.with_warehouse(expected.clone());
        }

        let file = file.clone();
        let settings = Arc::clone(&settings);
        let verify = Arc::clone(&verify);

        scenarios.spawn(async move {
            let result = isolated(async move {
                let conn = connect(&settings).await?;
                let report = scenario.run(&conn, &verify).await?;
                Ok::<Report, anyhow::Error>(report)
            })
            .await;
            (file, result)
        });
    }

    let mut report = Report::new();
    let mut failed = Vec::new();

    while let Some(joined) = scenarios.join_next().await {
        let (file, result) = match joined {
            Ok(outcome) => outcome,
            Err(e) => (PathBuf::from("<scenario>"), Err(anyhow::anyhow!("scenario task failed: {}", e))),
        };
        match result {
            Ok(scenario_report) => {
                if verbose {
                    let status = if scenario_report.has_errors() { "✗".red() } else { "✓".green() };
                    eprintln!("  {} {}", status, file.display());
                }
                report.merge(scenario_report);
            }
            Err(e) => {
                eprintln!("  {} {}: {}", "✗ Aborted".red().bold(), file.display(), e);
                failed.push(file);
            }
        }
    }

    report.save_to_file(output)?;

    if verbose {
        eprintln!("{} {}", "Report saved to:".green(), output.display());
    }

    print_summary(&report, files.len(), &failed);

    // Exit with error code if there are errors
    if report.has_errors() || !failed.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

/// Run one scenario on its own task so a panic aborts only that scenario
async fn isolated<F>(scenario: F) -> Result<Report>
where
    F: std::future::Future<Output = Result<Report>> + Send + 'static,
{
    tokio::spawn(scenario)
        .await
        .unwrap_or_else(|e| Err(anyhow::anyhow!("scenario task failed: {}", e)))
}

/// Exists command
async fn exists_command(
    settings: &ConnectionSettings,
    kind: Kind,
    name: &str,
    database: Option<&str>,
) -> Result<()> {
    let lookup = lookup(kind, name, database)?;
    let conn = connect(settings).await?;

    if object_exists(&conn, &lookup).await? {
        println!("{} {}", "✓".green(), lookup);
        Ok(())
    } else {
        println!("{} no {}", "✗".red(), lookup);
        std::process::exit(1);
    }
}

/// Show command
async fn show_command(
    settings: &ConnectionSettings,
    kind: Kind,
    name: &str,
    database: Option<&str>,
) -> Result<()> {
    let lookup = lookup(kind, name, database)?;
    let conn = connect(settings).await?;

    let json = match kind {
        Kind::Database => serde_json::to_string_pretty(&fetch_database_properties(&conn, name).await?)?,
        Kind::Warehouse => serde_json::to_string_pretty(&fetch_warehouse_properties(&conn, name).await?)?,
        Kind::Schema => {
            let database = lookup.container.as_deref().unwrap_or_default();
            serde_json::to_string_pretty(&fetch_schema_properties(&conn, database, name).await?)?
        }
    };

    println!("{}", json);
    Ok(())
}

/// Grants command
async fn grants_command(
    settings: &ConnectionSettings,
    database: &str,
    schema: Option<&str>,
    principal: Option<&str>,
) -> Result<()> {
    let target = match schema {
        Some(schema) => GrantTarget::schema(database, schema),
        None => GrantTarget::database(database),
    };
    let conn = connect(settings).await?;

    let mut grants = fetch_all_grants(&conn, &target).await?;
    if let Some(principal) = principal {
        grants = filter_grants(grants, principal);
    }

    println!("{} {}", "Grants on".bold(), target);
    if grants.is_empty() {
        println!("  (none)");
    }
    for grant in &grants {
        println!(
            "  {:<20} {} {}",
            grant.privilege,
            grant.granted_to.to_lowercase(),
            grant.grantee.cyan()
        );
    }

    Ok(())
}

fn print_summary(report: &Report, files: usize, failed: &[PathBuf]) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Provisioning Verification Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Scenarios run: {}", files);
    println!("Scenarios aborted: {}", failed.len());
    println!("Objects checked: {}", report.summary.objects_checked);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Total diagnostics: {}", report.summary.total);

    if report.summary.errors > 0 {
        println!("  Errors:   {}", format!("{}", report.summary.errors).red().bold());
    } else {
        println!("  Errors:   {}", format!("{}", report.summary.errors).green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).yellow());
    } else {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).green());
    }

    println!("  Info:     {}", report.summary.info);
    println!();

    if report.diagnostics.is_empty() && failed.is_empty() {
        println!("{}", "✓ Everything matches the configuration!".green().bold());
    } else {
        println!("{}", "Details:".bold());
        for diag in &report.diagnostics {
            let severity_str = match diag.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Warn => "WARN".yellow().bold(),
                Severity::Info => "INFO".cyan(),
            };

            println!("  [{}] {}: {}", severity_str, diag.code, diag.message);

            if let Some(exp) = &diag.expected {
                println!("    Expected: {}", exp);
            }
            if let Some(act) = &diag.actual {
                println!("    Actual:   {}", act);
            }
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}
