use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use envlink_domain::VariableValue;

/// Command-line interface for `envlink`.
#[derive(Debug, Parser)]
#[command(
    name = "envlink",
    version,
    about = "Project-scoped variables with cross-project links and concatenations"
)]
pub struct Cli {
    /// Settings file (TOML). Defaults to `./envlink.toml` when present.
    #[arg(long, global = true, value_name = "PATH", env = "ENVLINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Raises log verbosity (`-v` debug, `-vv` trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available `envlink` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manages projects.
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Manages variables.
    #[command(subcommand)]
    Var(VarCommand),

    /// Prints every resolved variable of a project as `.env` lines.
    Resolve {
        /// Project name (falls back to `default_project`).
        project: Option<String>,
        #[command(flatten)]
        affixes: AffixArgs,
    },

    /// Lists the variables that link to or concatenate a variable.
    Dependents {
        /// Project name.
        project: String,
        /// Variable name.
        name: String,
    },

    /// Reports everything a change to a variable would affect.
    Impact {
        /// Project name.
        project: String,
        /// Variable name.
        name: String,
    },

    /// Writes a project's resolved values to a `.env` file and records a snapshot.
    Export {
        /// Project name (falls back to `default_project`).
        project: Option<String>,
        /// Output directory.
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,
        /// File name inside the output directory (overrides `env_file_name`).
        #[arg(long, value_name = "NAME")]
        file_name: Option<String>,
        #[command(flatten)]
        affixes: AffixArgs,
    },

    /// Compares a recorded export with the current values.
    Diff {
        /// Export id.
        export_id: String,
    },

    /// Lists the exports of a project and whether they are outdated.
    Check {
        /// Project name (falls back to `default_project`).
        project: Option<String>,
    },
}

/// `envlink project ...`
#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Creates a project.
    Add {
        /// Unique name; letters, digits, `_` and `-`.
        name: String,
        /// Optional description.
        #[arg(long)]
        description: Option<String>,
    },
    /// Lists projects.
    List,
}

/// `envlink var ...`
#[derive(Debug, Subcommand)]
pub enum VarCommand {
    /// Creates a variable, or updates it (changing its type if needed).
    Set {
        /// Project name.
        project: String,
        /// Variable name.
        name: String,
        #[command(flatten)]
        value: ValueArgs,
        /// Optional description.
        #[arg(long)]
        description: Option<String>,
    },
    /// Prints the resolved value of a variable.
    Get {
        /// Project name.
        project: String,
        /// Variable name.
        name: String,
    },
    /// Lists the variables of a project with their stored shape.
    List {
        /// Project name (falls back to `default_project`).
        project: Option<String>,
    },
    /// Deletes a variable nothing references.
    Rm {
        /// Project name.
        project: String,
        /// Variable name.
        name: String,
    },
}

/// Exactly one value shape for `var set`.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct ValueArgs {
    /// Literal value.
    #[arg(long, value_name = "VALUE")]
    pub raw: Option<String>,
    /// Reference to another variable, `PROJECT:VAR`.
    #[arg(long, value_name = "PROJECT:VAR")]
    pub link: Option<String>,
    /// Concatenation expression, e.g. `"API:HOST":"API:PORT"`.
    #[arg(long, value_name = "EXPR")]
    pub concat: Option<String>,
    /// No value.
    #[arg(long)]
    pub empty: bool,
}

impl ValueArgs {
    /// Returns the selected shape.
    pub fn into_value(self) -> VariableValue {
        match (self.raw, self.link, self.concat) {
            (Some(raw), _, _) => VariableValue::Raw(raw),
            (_, Some(link), _) => VariableValue::Linked(link),
            (_, _, Some(concat)) => VariableValue::Concatenated(concat),
            _ => VariableValue::Empty,
        }
    }
}

/// Name prefix/suffix applied to exported variables.
#[derive(Debug, Args)]
pub struct AffixArgs {
    /// Prepended to every variable name.
    #[arg(long)]
    pub prefix: Option<String>,
    /// Appended to every variable name.
    #[arg(long)]
    pub suffix: Option<String>,
}
