use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use drone_provider::config::{Config, ProviderConfig, SERVER_ENV, TOKEN_ENV};
use drone_provider::drone::http::format_drone_error;
use drone_provider::drone::DroneClient;
use drone_provider::resource::dispatch::{self, Attributes, ResourceState};
use drone_provider::resource::{get_schema, resource_types};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Manage Drone CI resources declaratively
#[derive(Parser, Debug)]
#[command(name = "drone-provider", version = drone_provider::VERSION, about, long_about = None)]
struct Args {
    /// Drone server URL
    #[arg(long, env = SERVER_ENV, global = true)]
    server: Option<String>,

    /// Drone API token
    #[arg(long, env = TOKEN_ENV, global = true, hide_env_values = true)]
    token: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a resource from an attribute file
    Create {
        /// Resource type (e.g. drone_repo)
        resource_type: String,
        /// Attribute file (JSON, or YAML for .yaml/.yml; "-" reads JSON from stdin)
        #[arg(long)]
        attrs: PathBuf,
    },
    /// Refresh a resource from the server
    Read {
        resource_type: String,
        id: String,
        /// Previously persisted attributes (keeps write-only values)
        #[arg(long)]
        attrs: Option<PathBuf>,
    },
    /// Apply an attribute file to an existing resource
    Update {
        resource_type: String,
        id: String,
        #[arg(long)]
        attrs: PathBuf,
        /// Previously persisted attributes, checked for force-new changes
        #[arg(long)]
        prior: Option<PathBuf>,
    },
    /// Delete a resource
    Delete { resource_type: String, id: String },
    /// Check whether a resource exists
    Exists { resource_type: String, id: String },
    /// Adopt an existing resource by identity
    Import { resource_type: String, id: String },
    /// Show registered resource types, or one type's attributes
    Schema { resource_type: Option<String> },
    /// Verify the server and token, then save them to the config file
    Login,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Logging disabled, cannot open {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("drone-provider started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("drone-provider").join("drone-provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".drone-provider").join("drone-provider.log");
    }
    PathBuf::from("drone-provider.log")
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_guard = setup_logging(args.log_level);

    if let Err(err) = run(args).await {
        tracing::error!("{:#}", err);
        eprintln!("Error: {err:#}");
        if let Some(api_err) = err.downcast_ref::<drone_provider::error::Error>() {
            if api_err.status().is_some() {
                eprintln!("Hint: {}", format_drone_error(api_err));
            }
        }
        drop(log_guard);
        std::process::exit(1);
    }
}

/// Lazily resolved connection settings; only resource commands need a client
struct Session {
    config: Config,
    server: Option<String>,
    token: Option<String>,
}

impl Session {
    fn provider(&self) -> Result<ProviderConfig> {
        self.config
            .resolve(self.server.as_deref(), self.token.as_deref())
    }

    async fn client(&self) -> Result<DroneClient> {
        DroneClient::connect(&self.provider()?)
            .await
            .context("drone client failed")
    }
}

async fn run(args: Args) -> Result<()> {
    let session = Session {
        config: Config::load(),
        server: args.server,
        token: args.token,
    };

    match args.command {
        Command::Create {
            resource_type,
            attrs,
        } => {
            let attrs = load_attributes(&attrs)?;
            let client = session.client().await?;
            let state = dispatch::create(&client, &resource_type, &attrs).await?;
            print_json(&state)
        }
        Command::Read {
            resource_type,
            id,
            attrs,
        } => {
            let prior = ResourceState {
                id,
                attributes: load_optional_attributes(attrs.as_deref())?,
            };
            let client = session.client().await?;
            let state = dispatch::read(&client, &resource_type, &prior).await?;
            print_json(&state)
        }
        Command::Update {
            resource_type,
            id,
            attrs,
            prior,
        } => {
            let attrs = load_attributes(&attrs)?;
            let prior = ResourceState {
                id,
                attributes: load_optional_attributes(prior.as_deref())?,
            };
            let client = session.client().await?;
            let state = dispatch::update(&client, &resource_type, &prior, &attrs).await?;
            print_json(&state)
        }
        Command::Delete { resource_type, id } => {
            let client = session.client().await?;
            dispatch::delete(&client, &resource_type, &id).await?;
            println!("Deleted {} {}", resource_type, id);
            Ok(())
        }
        Command::Exists { resource_type, id } => {
            let client = session.client().await?;
            let exists = dispatch::exists(&client, &resource_type, &id).await?;
            print_json(&serde_json::json!({ "exists": exists }))
        }
        Command::Import { resource_type, id } => {
            let client = session.client().await?;
            let state = dispatch::import(&client, &resource_type, &id).await?;
            print_json(&state)
        }
        Command::Schema { resource_type } => match resource_type {
            Some(resource_type) => print_json(get_schema(&resource_type)?),
            None => print_json(&resource_types()),
        },
        Command::Login => {
            let provider = session.provider()?;
            session.client().await?;
            let saved = Config {
                server: Some(provider.server.to_string()),
                token: Some(provider.token.clone()),
            };
            saved.save()?;
            println!("Logged in to {}", provider.server);
            Ok(())
        }
    }
}

fn load_optional_attributes(path: Option<&Path>) -> Result<Attributes> {
    match path {
        Some(path) => load_attributes(path),
        None => Ok(Attributes::new()),
    }
}

/// Read an attribute bag from JSON, YAML (.yaml/.yml) or stdin ("-")
fn load_attributes(path: &Path) -> Result<Attributes> {
    let value: Value = if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read attributes from stdin")?;
        serde_json::from_str(&content).context("Failed to parse attributes JSON")?
    } else {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))?
        } else {
            serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))?
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Attributes in {:?} must be an object", path),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
