//! mcpconf - MCP server definitions across AI coding clients
//!
//! Usage:
//!   mcpconf platforms                          # List supported clients
//!   mcpconf list --platform codex              # Show a client's servers
//!   mcpconf convert --from claude-code --to opencode ~/.claude.json
//!   mcpconf add fs --platform vscode -- npx -y @modelcontextprotocol/server-filesystem

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcpconf_core::client::TranslatorRegistry;
use mcpconf_core::manage::{
    CanonicalFile, ConfigFile, PlatformFile, add_server, remove_server, set_disabled,
};
use mcpconf_core::model::{Config, Server};
use mcpconf_core::validate::{Issue, Report, Validator};
use mcpconf_core::{fs, parser};

/// Pseudo-platform id for the tool's own canonical format.
const CANONICAL: &str = "canonical";

#[derive(Parser)]
#[command(name = "mcpconf")]
#[command(about = "Manage MCP server definitions across AI coding clients", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported platforms
    Platforms,

    /// Validate a config file
    Validate {
        /// Config file (defaults to the platform's usual location)
        file: Option<PathBuf>,

        /// Format of the file
        #[arg(long, short, default_value = CANONICAL)]
        platform: String,

        /// Accept a config with no servers
        #[arg(long)]
        allow_empty: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// List the servers in a config file
    List {
        /// Config file (defaults to the platform's usual location)
        file: Option<PathBuf>,

        /// Format of the file
        #[arg(long, short, default_value = CANONICAL)]
        platform: String,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Convert a config file from one platform's format to another's
    Convert {
        /// Source format
        #[arg(long)]
        from: String,

        /// Target format
        #[arg(long)]
        to: String,

        /// Source file
        input: PathBuf,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail instead of dropping fields the target cannot represent
        #[arg(long)]
        strict: bool,
    },

    /// Add a server
    Add(AddArgs),

    /// Remove a server
    #[command(alias = "rm")]
    Remove(TargetArgs),

    /// Enable a server
    Enable(TargetArgs),

    /// Disable a server
    Disable(TargetArgs),
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Args)]
struct FileArgs {
    /// Format of the file
    #[arg(long, short, default_value = CANONICAL)]
    platform: String,

    /// Config file (defaults to the platform's usual location)
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Args)]
struct TargetArgs {
    /// Server name
    name: String,

    #[command(flatten)]
    target: FileArgs,
}

#[derive(Args)]
struct AddArgs {
    /// Server name
    name: String,

    #[command(flatten)]
    target: FileArgs,

    /// URL of a remote server
    #[arg(long)]
    url: Option<String>,

    /// Explicit transport (inferred from command / url when omitted)
    #[arg(long, value_parser = ["stdio", "sse"])]
    transport: Option<String>,

    /// Environment variable (KEY=VALUE)
    #[arg(long, value_name = "KEY=VALUE")]
    env: Vec<String>,

    /// HTTP header (KEY=VALUE)
    #[arg(long = "header", value_name = "KEY=VALUE")]
    headers: Vec<String>,

    /// Restrict to operating systems (darwin, linux, windows)
    #[arg(long = "os", value_name = "OS")]
    platforms: Vec<String>,

    /// Overwrite an existing server with the same name
    #[arg(long)]
    replace: bool,

    /// Command line of a local server (after --)
    #[arg(last = true)]
    command: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "mcpconf=debug,info"
    } else {
        "mcpconf=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let registry = TranslatorRegistry::with_builtins();
    run_cli(cli.command, &registry)
}

fn run_cli(command: Commands, registry: &TranslatorRegistry) -> Result<()> {
    match command {
        Commands::Platforms => {
            println!("{CANONICAL}");
            for platform in registry.platforms() {
                println!("{platform}");
            }
            Ok(())
        }
        Commands::Validate {
            file,
            platform,
            allow_empty,
            format,
        } => run_validate(registry, &platform, file, allow_empty, format),
        Commands::List {
            file,
            platform,
            format,
        } => run_list(registry, &platform, file, format),
        Commands::Convert {
            from,
            to,
            input,
            output,
            strict,
        } => run_convert(registry, &from, &to, &input, output.as_deref(), strict),
        Commands::Add(args) => run_add(registry, args),
        Commands::Remove(args) => {
            let file = open_file(registry, &args.target)?;
            let mut config = load(file.as_ref())?;
            remove_server(&mut config, &args.name)?;
            save(file.as_ref(), &config)?;
            println!("✓ Removed server '{}' from {}", args.name, file.path().display());
            Ok(())
        }
        Commands::Enable(args) => run_toggle(registry, args, false),
        Commands::Disable(args) => run_toggle(registry, args, true),
    }
}

fn run_validate(
    registry: &TranslatorRegistry,
    platform: &str,
    file: Option<PathBuf>,
    allow_empty: bool,
    format: OutputFormat,
) -> Result<()> {
    let file = open_file(
        registry,
        &FileArgs {
            platform: platform.to_string(),
            file,
        },
    )?;
    let config = load(file.as_ref())?;
    let report = Validator::new().allow_empty(allow_empty).validate(&config);

    match format {
        OutputFormat::Table => print_report(file.path(), &config, &report),
        OutputFormat::Json => {
            let issues: Vec<_> = report.issues().iter().map(issue_json).collect();
            let output = serde_json::json!({
                "path": file.path(),
                "servers": config.servers.len(),
                "valid": !report.has_errors(),
                "issues": issues,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    let errors = report.errors().count();
    if errors > 0 {
        anyhow::bail!("{} has {errors} error(s)", file.path().display());
    }
    Ok(())
}

fn print_report(path: &Path, config: &Config, report: &Report) {
    if report.is_valid() {
        println!(
            "✓ {} ({} servers): no issues",
            path.display(),
            config.servers.len()
        );
        return;
    }
    println!("{}:", path.display());
    for issue in report.issues() {
        println!("  {issue}");
    }
}

fn issue_json(issue: &Issue) -> serde_json::Value {
    serde_json::json!({
        "severity": issue.severity.to_string(),
        "server": issue.server,
        "field": issue.field,
        "message": issue.message,
    })
}

fn run_list(
    registry: &TranslatorRegistry,
    platform: &str,
    file: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let file = open_file(
        registry,
        &FileArgs {
            platform: platform.to_string(),
            file,
        },
    )?;
    let config = load(file.as_ref())?;

    match format {
        OutputFormat::Table => print_servers(&config),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}

fn print_servers(config: &Config) {
    if config.is_empty() {
        println!("No servers configured.");
        return;
    }

    println!("{:<24} {:<10} {:<9} Endpoint", "Name", "Transport", "Status");
    println!("{}", "-".repeat(80));
    for (name, server) in &config.servers {
        let transport = server
            .effective_transport()
            .map(|t| t.as_str())
            .unwrap_or("?");
        let status = if server.disabled { "disabled" } else { "enabled" };
        println!(
            "{:<24} {:<10} {:<9} {}",
            name,
            transport,
            status,
            endpoint(server)
        );
    }
}

fn endpoint(server: &Server) -> String {
    if server.is_remote() {
        return server.url.clone();
    }
    std::iter::once(server.command.as_str())
        .chain(server.args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

fn run_convert(
    registry: &TranslatorRegistry,
    from: &str,
    to: &str,
    input: &Path,
    output: Option<&Path>,
    strict: bool,
) -> Result<()> {
    let bytes = std::fs::read(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let config = if from == CANONICAL {
        parser::parse(&bytes)
    } else {
        registry.require(from)?.to_canonical(&bytes)
    }
    .with_context(|| format!("Failed to parse {} as {from}", input.display()))?;

    let converted = if to == CANONICAL {
        parser::write(&config)?
    } else {
        let translator = registry.require(to)?;
        let losses = translator.unsupported_fields(&config);
        if strict && !losses.is_empty() {
            let details: Vec<String> = losses.iter().map(ToString::to_string).collect();
            anyhow::bail!("Conversion would drop fields:\n  {}", details.join("\n  "));
        }
        for loss in &losses {
            tracing::warn!("{loss}");
        }
        translator.from_canonical(&config)?
    };

    match output {
        Some(path) => {
            fs::write_atomic(path, &converted)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(
                from,
                to,
                servers = config.servers.len(),
                path = %path.display(),
                "converted config"
            );
        }
        None => std::io::stdout()
            .write_all(&converted)
            .context("Failed to write to stdout")?,
    }
    Ok(())
}

fn run_add(registry: &TranslatorRegistry, args: AddArgs) -> Result<()> {
    let mut command = args.command.into_iter();
    let mut server = Server::new(&args.name);
    server.command = command.next().unwrap_or_default();
    server.args = command.collect();
    server.url = args.url.unwrap_or_default();
    server.transport = args.transport.unwrap_or_default();
    server.env = parse_key_values(&args.env, "env")?;
    server.headers = parse_key_values(&args.headers, "header")?;
    server.platforms = args.platforms;

    let mut single = Config::new();
    single.insert(server.clone());
    let report = Validator::new().validate(&single);
    if report.has_errors() {
        let details: Vec<String> = report.errors().map(ToString::to_string).collect();
        anyhow::bail!("Invalid server '{}':\n  {}", args.name, details.join("\n  "));
    }
    for warning in report.warnings() {
        println!("  ⚠ {}", warning);
    }

    let file = open_file(registry, &args.target)?;
    let mut config = load(file.as_ref())?;
    let replaced = add_server(&mut config, server, args.replace)?;
    save(file.as_ref(), &config)?;

    let verb = if replaced.is_some() { "Replaced" } else { "Added" };
    println!("✓ {verb} server '{}' in {}", args.name, file.path().display());
    Ok(())
}

fn run_toggle(registry: &TranslatorRegistry, args: TargetArgs, disabled: bool) -> Result<()> {
    let file = open_file(registry, &args.target)?;
    let mut config = load(file.as_ref())?;
    let changed = set_disabled(&mut config, &args.name, disabled)?;
    let state = if disabled { "disabled" } else { "enabled" };
    if !changed {
        println!("• Server '{}' is already {state}", args.name);
        return Ok(());
    }
    save(file.as_ref(), &config)?;
    println!("✓ Server '{}' {state} in {}", args.name, file.path().display());
    Ok(())
}

/// Resolve the file a command operates on: the explicit `--file`, or the
/// platform's default location.
fn open_file(registry: &TranslatorRegistry, args: &FileArgs) -> Result<Box<dyn ConfigFile>> {
    if args.platform == CANONICAL {
        let path = match &args.file {
            Some(path) => path.clone(),
            None => dirs::config_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
                .join("mcpconf")
                .join("servers.json"),
        };
        return Ok(Box::new(CanonicalFile::new(path)));
    }

    let translator = registry.require(&args.platform)?;
    let file = match &args.file {
        Some(path) => PlatformFile::new(path, translator),
        None => {
            let home = dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
            PlatformFile::at_default_path(&home, translator)
        }
    };
    Ok(Box::new(file))
}

fn load(file: &dyn ConfigFile) -> Result<Config> {
    file.load()
        .with_context(|| format!("Failed to load {}", file.path().display()))
}

fn save(file: &dyn ConfigFile, config: &Config) -> Result<()> {
    file.save(config)
        .with_context(|| format!("Failed to write {}", file.path().display()))
}

fn parse_key_values(pairs: &[String], label: &str) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for pair in pairs {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            anyhow::anyhow!("Invalid {} entry (expected KEY=VALUE): {}", label, pair)
        })?;
        if key.is_empty() {
            anyhow::bail!("Invalid {} entry (empty key): {}", label, pair);
        }
        map.insert(key.to_string(), value.to_string());
    }
    Ok(map)
}
