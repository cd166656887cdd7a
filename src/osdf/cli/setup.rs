use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "osdf", bin_name = "osdf", version)]
#[command(about = "Command-line client for OSDF document servers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Credential file to use instead of ~/.osdf (also $OSDF_CONFIG)
    #[arg(long, global = true, value_name = "PATH", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Log requests and edit stages to stderr
    #[arg(long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Create the credential file interactively
    Init,

    /// Print a node as JSON
    Cat {
        /// Node ID
        node: String,

        /// Node version to retrieve (defaults to the latest)
        #[arg(short = 'v', long = "version", value_name = "VERSION")]
        version: Option<u32>,
    },

    /// Print information about the server
    Info,

    /// Delete a node
    Rm {
        /// Node ID
        node: String,
    },

    /// Run an OQL query against a namespace
    Oql {
        /// Namespace
        ns: String,

        /// OQL query text, e.g. '"project"[node_type]'
        query: String,

        /// Retrieve every page of results instead of the first
        #[arg(short, long)]
        all: bool,
    },

    /// Run a query-DSL (JSON) search against a namespace
    Search {
        /// Namespace
        ns: String,

        /// Query document, e.g. '{"term": {"node_type": "project"}}'
        query: String,

        /// Retrieve every page of results instead of the first
        #[arg(short, long)]
        all: bool,
    },

    /// Print the schemas of a namespace, or one named schema
    Schemas {
        /// Namespace
        ns: String,

        /// Schema name
        schema: Option<String>,
    },

    /// Print the auxiliary schemas of a namespace, or one named auxiliary schema
    Aux {
        /// Namespace
        ns: String,

        /// Auxiliary schema name
        aux_schema: Option<String>,
    },

    /// Edit a node in $EDITOR and submit the changes
    Edit {
        /// Node ID
        node: String,
    },
}
