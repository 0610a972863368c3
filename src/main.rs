use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{error, info, subscriber};
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

use recordform::cli::FormCli;
use recordform::config::context::build_context;
use recordform::config::schema::{load_config, DEFAULT_CONFIG_PATH};
use recordform::context::FormContext;
use recordform::form::{RecordForm, RecordFormProps};
use recordform::nav::RecordingNavigator;
use recordform::schema::Record;

#[derive(Debug, Parser)]
#[clap(name = "recordform", version, about = "Fill in and create records of a schema-driven backend")]
struct Args {
    #[clap(short, long, default_value = DEFAULT_CONFIG_PATH, help = "Path to the config file")]
    config_path: PathBuf,

    #[clap(long, help = "Output logs in JSON format")]
    json_logs: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fill in a new record
    Create {
        db: String,
        table: String,
        /// Prefill a column (repeatable); the value is read as JSON when it parses
        #[clap(long = "where", value_parser = parse_where)]
        where_: Vec<(String, Value)>,
        /// Close instead of navigating to the new record
        #[clap(long)]
        close_on_create: bool,
    },
    /// Open an existing record
    Edit { db: String, table: String, id: String },
    /// Print the columns of a table
    Schema { db: String, table: String },
}

// JSON when it parses (numbers, booleans, null), a plain string otherwise
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_where(raw: &str) -> Result<(String, Value), String> {
    match raw.split_once('=') {
        Some((column, value)) if !column.is_empty() => {
            Ok((column.to_string(), parse_value(value)))
        }
        _ => Err(format!("expected column=value, got {raw:?}")),
    }
}

fn prepare_tracing(json_logs: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("recordform=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let result = if json_logs {
        subscriber::set_global_default(builder.json().finish())
    } else {
        subscriber::set_global_default(builder.finish())
    };
    if let Err(e) = result.map_err(|e| e.to_string()).and_then(|_| {
        LogTracer::init().map_err(|e| e.to_string())
    }) {
        eprintln!("Error setting up logging: {e}");
    }
}

async fn print_schema(ctx: &FormContext, db: &str, table: &str) -> Result<(), String> {
    let schema = ctx
        .client
        .schema_get(db, table)
        .await
        .map_err(|e| e.to_string())?;

    println!("{} ({db}.{table})", schema.name);
    for (column_id, settings) in &schema.columns {
        println!(
            "  {:20} {:10} {}",
            column_id,
            ctx.registry.resolve(settings).as_ref(),
            settings.label(column_id)
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    prepare_tracing(args.json_logs);

    info!("Starting recordform {}", env!("CARGO_PKG_VERSION"));

    let config = match load_config(&args.config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Error loading the config from {:?}: {e}", args.config_path);
            exit(1);
        }
    };

    let navigator = Arc::new(RecordingNavigator::new());
    let ctx = match build_context(&config, navigator.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error setting up the backend: {e}");
            exit(1);
        }
    };

    let props = match args.command {
        Commands::Schema { db, table } => {
            if let Err(e) = print_schema(&ctx, &db, &table).await {
                error!("{e}");
                exit(1);
            }
            return;
        }
        Commands::Create {
            db,
            table,
            where_,
            close_on_create,
        } => {
            let prefill: Record = where_.into_iter().collect();
            let where_ = if prefill.is_empty() { vec![] } else { vec![prefill] };
            RecordFormProps::create(&db, &table)
                .with_where(where_)
                .close_on_create(close_on_create)
        }
        Commands::Edit { db, table, id } => {
            RecordFormProps::edit(&db, &table, parse_value(&id))
        }
    };

    let on_close = Box::new(|id: Option<Value>| match id {
        Some(id) => info!("Record {id} created"),
        None => info!("Form closed"),
    });
    let form = RecordForm::new(ctx.clone(), props).with_on_close(on_close);

    let mut cli = FormCli::new(ctx, form);
    if let Err(e) = cli.repl_loop().await {
        error!("{e}");
        exit(1);
    }

    for path in navigator.history() {
        println!("Visited {path}");
    }
}
