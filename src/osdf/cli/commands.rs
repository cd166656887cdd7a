use super::prompt::{ask_credentials, confirm_overwrite};
use super::render::{print_error, print_json, print_messages};
use super::setup::{Cli, Commands};
use clap::Parser;
use osdf::api::{CmdResult, OsdfApi, Query, SchemaKind};
use osdf::client::http::HttpClient;
use osdf::commands::init;
use osdf::config::{self, Credentials};
use osdf::editor::ExternalEditor;
use osdf::error::Result;
use std::error::Error as _;
use std::io::IsTerminal;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

struct AppContext {
    api: OsdfApi<HttpClient>,
    credentials: Credentials,
}

/// Parses the command line, runs the command and returns the process exit status.
pub fn run() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(cli) {
        Ok(()) => 0,
        Err(e) => {
            let mut cause = e.source();
            while let Some(inner) = cause {
                debug!(cause = %inner, "caused by");
                cause = inner.source();
            }
            print_error(&e);
            e.exit_code()
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "osdf=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

fn execute(cli: Cli) -> Result<()> {
    let path = config::locate(cli.config)?;
    let context = || init_context(&path);

    match cli.command {
        Commands::Init => handle_init(&path),
        Commands::Cat { node, version } => handle_cat(&context()?, &node, version),
        Commands::Info => handle_info(&context()?),
        Commands::Rm { node } => handle_rm(&context()?, &node),
        Commands::Oql { ns, query, all } => {
            handle_query(&context()?, &ns, &Query::oql(query), all)
        }
        Commands::Search { ns, query, all } => {
            let query = Query::dsl(&query)?;
            handle_query(&context()?, &ns, &query, all)
        }
        Commands::Schemas { ns, schema } => {
            handle_schemas(&context()?, &ns, SchemaKind::Base, schema.as_deref())
        }
        Commands::Aux { ns, aux_schema } => {
            handle_schemas(&context()?, &ns, SchemaKind::Aux, aux_schema.as_deref())
        }
        Commands::Edit { node } => handle_edit(&context()?, &node),
    }
}

fn init_context(path: &Path) -> Result<AppContext> {
    let credentials = Credentials::load(path)?;
    let client = HttpClient::new(&credentials)?;
    debug!(server = %client.base_url(), user = %credentials.username, "connecting");

    Ok(AppContext {
        api: OsdfApi::new(client),
        credentials,
    })
}

fn print_result(result: &CmdResult) -> Result<()> {
    if let Some(document) = &result.document {
        print_json(document)?;
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_init(path: &Path) -> Result<()> {
    let overwrite = if path.exists() {
        match confirm_overwrite(path)? {
            Some(true) => true,
            _ => {
                println!("Aborted.");
                return Ok(());
            }
        }
    } else {
        false
    };

    let Some(credentials) = ask_credentials()? else {
        println!("Aborted.");
        return Ok(());
    };

    let result = init::run(path, &credentials, overwrite)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_cat(ctx: &AppContext, node: &str, version: Option<u32>) -> Result<()> {
    let result = ctx.api.cat(node, version)?;
    print_result(&result)
}

fn handle_info(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.info()?;
    println!("Server: {}", ctx.credentials.address());
    print_result(&result)
}

fn handle_rm(ctx: &AppContext, node: &str) -> Result<()> {
    let result = ctx.api.delete(node)?;
    print_result(&result)
}

fn handle_query(ctx: &AppContext, ns: &str, query: &Query, all: bool) -> Result<()> {
    let result = ctx.api.query(ns, query, all)?;
    print_result(&result)
}

fn handle_schemas(
    ctx: &AppContext,
    ns: &str,
    kind: SchemaKind,
    name: Option<&str>,
) -> Result<()> {
    let result = ctx.api.schemas(ns, kind, name)?;
    print_result(&result)
}

fn handle_edit(ctx: &AppContext, node: &str) -> Result<()> {
    let editor = ExternalEditor::from_env()?;
    let result = ctx.api.edit(node, &editor)?;
    print_result(&result)
}
