use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "fetchgraph",
    about = "Fetchgraph: check, resolve and merge entity graphs from a catalog",
    version
)]
pub struct Cli {
    /// Catalog document (JSON, or TOML by extension)
    #[arg(long, global = true)]
    pub catalog: Option<String>,

    /// Config file; defaults to ./fetchgraph.toml when present
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the catalog and resolve every named graph
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List named graphs
    List {
        /// Only graphs applicable to instances of this type
        #[arg(long = "type")]
        type_name: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve one named graph and print its tree
    Resolve {
        /// Graph name
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decide which attributes a load would fetch under a graph
    Plan {
        /// Graph name
        name: String,

        /// Runtime type of the loaded instance; defaults to the graph root
        #[arg(long = "as")]
        runtime_type: Option<String>,

        /// How the graph is applied
        #[arg(long, value_enum, default_value_t = SemanticArg::Fetch)]
        semantic: SemanticArg,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge two or more named graphs into one dynamic graph
    Merge {
        /// Graph names, merged left to right
        #[arg(required = true, num_args = 2..)]
        names: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SemanticArg {
    Fetch,
    Load,
}
