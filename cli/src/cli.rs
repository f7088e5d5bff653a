//! Command-line surface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wren_shared::query::{DEFAULT_CHART_SAMPLE_SIZE, DEFAULT_SUMMARY_SAMPLE_SIZE};
use wren_shared::{Expression, RelationType};

use crate::output::OutputMode;

#[derive(Parser, Debug)]
#[command(name = "wren")]
#[command(version, about = "Command-line client for the Wren semantic layer and NL-to-SQL server", long_about = None)]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file to use instead of ~/.wren/config.toml
    #[arg(long, global = true, env = "WREN_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log HTTP requests and config access to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings that apply to every command, fixed after parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub output: OutputMode,
    pub config_path: Option<PathBuf>,
}

impl Cli {
    pub fn options(&self) -> GlobalOptions {
        GlobalOptions {
            output: if self.json {
                OutputMode::Json
            } else {
                OutputMode::Text
            },
            config_path: self.config.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate and save a server endpoint and API key
    Login(LoginArgs),

    /// Show who the configured API key belongs to
    Whoami,

    /// Read or change local configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage projects and the active project
    #[command(alias = "projects")]
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Inspect semantic models
    #[command(alias = "models")]
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Manage saved views
    #[command(alias = "views")]
    View {
        #[command(subcommand)]
        action: ViewAction,
    },

    /// Manage relations between models
    #[command(alias = "relations")]
    Relation {
        #[command(subcommand)]
        action: RelationAction,
    },

    /// Manage calculated fields
    #[command(alias = "calc-fields")]
    CalcField {
        #[command(subcommand)]
        action: CalcFieldAction,
    },

    /// Manage instructions that guide SQL generation
    #[command(alias = "instructions")]
    Instruction {
        #[command(subcommand)]
        action: InstructionAction,
    },

    /// Manage question/SQL example pairs
    #[command(alias = "sql-pairs")]
    SqlPair {
        #[command(subcommand)]
        action: SqlPairAction,
    },

    /// Browse and manage conversation threads
    #[command(alias = "threads")]
    Thread {
        #[command(subcommand)]
        action: ThreadAction,
    },

    /// Manage organization API keys
    #[command(alias = "api-keys")]
    ApiKey {
        #[command(subcommand)]
        action: ApiKeyAction,
    },

    /// Manage API keys scoped to one project
    #[command(alias = "project-keys")]
    ProjectKey(ProjectKeyArgs),

    /// Browse the API call history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Ask a question and get SQL, results summary and thread
    Ask(AskArgs),

    /// Generate SQL for a question without running it
    Sql(SqlArgs),

    /// Execute SQL against the deployed model
    RunSql(RunSqlArgs),

    /// Summarize the result of a SQL query in natural language
    Summary(SummaryArgs),

    /// Generate a Vega-Lite chart spec for a SQL query
    Chart(ChartArgs),

    /// Deploy the semantic model, or show what is deployed
    Deploy(DeployArgs),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Server endpoint URL; prompted for when omitted
    #[arg(long)]
    pub endpoint: Option<String>,

    /// API key; prompted for when omitted
    #[arg(long, env = "WREN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show one key, or the whole configuration
    Get {
        /// endpoint, api-key or project-id
        key: Option<String>,
    },
    /// Set a key; an empty value clears it
    Set { key: String, value: String },
    /// Print the config file location
    Path,
}

#[derive(Subcommand, Debug)]
pub enum ProjectAction {
    /// List projects, marking the active one
    #[command(alias = "ls")]
    List,
    /// Make a project the active one
    Use { id: i64 },
    /// Show the active project
    Current,
    /// Show project details (defaults to the active project)
    Info { id: Option<i64> },
    /// Create a project
    Create { name: String },
    /// Update a project's name, language or timezone
    Update {
        /// Defaults to the active project
        id: Option<i64>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        timezone: Option<String>,
    },
    /// Delete a project
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ModelAction {
    /// List models with field counts
    #[command(alias = "ls")]
    List,
    /// Show a model with its fields and relations
    #[command(alias = "show")]
    Describe { id: i64 },
    /// List a model's fields
    Fields { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ViewAction {
    #[command(alias = "ls")]
    List,
    Show {
        id: i64,
    },
    /// Save a thread response as a view
    Create {
        #[arg(long)]
        name: String,
        /// Thread response whose SQL backs the view
        #[arg(long)]
        response_id: i64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum RelationAction {
    #[command(alias = "ls")]
    List,
    Create {
        #[arg(long)]
        from_model: i64,
        #[arg(long)]
        from_column: i64,
        #[arg(long)]
        to_model: i64,
        #[arg(long)]
        to_column: i64,
        /// ONE_TO_ONE, ONE_TO_MANY or MANY_TO_ONE
        #[arg(long = "type")]
        relation_type: RelationType,
    },
    /// Change a relation's type
    Update {
        id: i64,
        #[arg(long = "type")]
        relation_type: RelationType,
    },
    Delete {
        id: i64,
    },
}

/// Column ids from the owning model to the source column, e.g. `12,15`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineage(pub Vec<i64>);

pub fn parse_lineage(raw: &str) -> Result<Lineage, String> {
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = part
            .parse()
            .map_err(|_| format!("invalid lineage ID {:?}: must be a number", part))?;
        ids.push(id);
    }
    if ids.is_empty() {
        return Err("lineage must contain at least one column ID".to_string());
    }
    Ok(Lineage(ids))
}

#[derive(Subcommand, Debug)]
pub enum CalcFieldAction {
    /// List a model's calculated fields
    #[command(alias = "ls")]
    List { model_id: i64 },
    Create {
        #[arg(long = "model")]
        model_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        expression: Expression,
        /// Comma-separated column ids, e.g. 12,15
        #[arg(long, value_parser = parse_lineage)]
        lineage: Lineage,
    },
    /// Replace a calculated field's definition
    Update {
        field_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        expression: Expression,
        #[arg(long, value_parser = parse_lineage)]
        lineage: Lineage,
    },
    Delete {
        field_id: i64,
    },
    /// Check whether a name is available on a model
    Validate {
        #[arg(long = "model")]
        model_id: i64,
        #[arg(long)]
        name: String,
        /// Existing field being renamed
        #[arg(long = "column")]
        column_id: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum InstructionAction {
    #[command(alias = "ls")]
    List,
    Create {
        #[arg(long)]
        text: String,
        /// Apply to every question
        #[arg(long)]
        global: bool,
        /// Question the instruction applies to; repeatable
        #[arg(long = "question")]
        questions: Vec<String>,
    },
    Update {
        id: i64,
        #[arg(long)]
        text: Option<String>,
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        global: Option<bool>,
        /// Replaces the question list; repeatable
        #[arg(long = "question")]
        questions: Vec<String>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum SqlPairAction {
    #[command(alias = "ls")]
    List,
    Show {
        id: i64,
    },
    Create {
        #[arg(short, long)]
        question: String,
        #[arg(short, long)]
        sql: String,
    },
    Update {
        id: i64,
        #[arg(short, long)]
        question: Option<String>,
        #[arg(short, long)]
        sql: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ThreadAction {
    #[command(alias = "ls")]
    List,
    /// Show a thread's questions and SQL
    Show { id: i64 },
    /// Change a thread's summary
    Rename { id: i64, summary: String },
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ApiKeyAction {
    #[command(alias = "ls")]
    List,
    /// Create a key; the secret is shown only once
    Create { name: String },
    Revoke { id: i64 },
    Delete { id: i64 },
}

#[derive(Args, Debug)]
pub struct ProjectKeyArgs {
    /// Project to act on; defaults to the active project
    #[arg(long, global = true)]
    pub project_id: Option<i64>,

    #[command(subcommand)]
    pub action: ApiKeyAction,
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List API calls, newest first
    #[command(alias = "ls")]
    List(HistoryListArgs),
}

#[derive(Args, Debug)]
pub struct HistoryListArgs {
    /// API type, e.g. ASK or RUN_SQL
    #[arg(long = "type")]
    pub api_type: Option<String>,
    /// HTTP status code
    #[arg(long)]
    pub status: Option<i64>,
    #[arg(long)]
    pub thread: Option<String>,
    /// ISO 8601 date or timestamp
    #[arg(long)]
    pub start_date: Option<String>,
    #[arg(long)]
    pub end_date: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
    #[arg(long, default_value_t = 20)]
    pub limit: u32,
    /// Include request and response payloads
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    pub question: String,
    /// Max rows used for the answer
    #[arg(long)]
    pub sample_size: Option<u32>,
    /// Language for the answer, e.g. English
    #[arg(long)]
    pub language: Option<String>,
    /// Continue an existing thread
    #[arg(long)]
    pub thread_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct SqlArgs {
    pub question: String,
    /// Return SQL in the data source's dialect
    #[arg(long)]
    pub dialect: bool,
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long)]
    pub thread_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct RunSqlArgs {
    pub sql: String,
    /// Max rows to return
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub thread_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[arg(short, long)]
    pub question: String,
    #[arg(short, long)]
    pub sql: String,
    #[arg(long, default_value_t = DEFAULT_SUMMARY_SAMPLE_SIZE)]
    pub sample_size: u32,
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long)]
    pub thread_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct ChartArgs {
    #[arg(short, long)]
    pub question: String,
    #[arg(short, long)]
    pub sql: String,
    #[arg(long, default_value_t = DEFAULT_CHART_SAMPLE_SIZE)]
    pub sample_size: u32,
    #[arg(long)]
    pub thread_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Deploy even if nothing changed
    #[arg(long)]
    pub force: bool,

    #[command(subcommand)]
    pub action: Option<DeployAction>,
}

#[derive(Subcommand, Debug)]
pub enum DeployAction {
    /// Show the currently deployed models
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_lineage() {
        assert_eq!(parse_lineage("5"), Ok(Lineage(vec![5])));
        assert_eq!(parse_lineage("12,15"), Ok(Lineage(vec![12, 15])));
        assert_eq!(parse_lineage(" 12 , ,15 "), Ok(Lineage(vec![12, 15])));
        assert_eq!(
            parse_lineage(""),
            Err("lineage must contain at least one column ID".to_string())
        );
        assert_eq!(
            parse_lineage(" , "),
            Err("lineage must contain at least one column ID".to_string())
        );
        assert_eq!(
            parse_lineage("12,abc"),
            Err("invalid lineage ID \"abc\": must be a number".to_string())
        );
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["wren", "project", "list", "--json"]).unwrap();
        assert_eq!(cli.options().output, OutputMode::Json);
        assert!(matches!(
            cli.command,
            Command::Project {
                action: ProjectAction::List
            }
        ));
    }

    #[test]
    fn test_numeric_ids_validated_before_dispatch() {
        let err = Cli::try_parse_from(["wren", "project", "use", "seven"]).unwrap_err();
        assert!(err.to_string().contains("seven"));
    }

    #[test]
    fn test_expression_rejected_with_valid_tokens() {
        let err = Cli::try_parse_from([
            "wren", "calc-field", "create", "--model", "1", "--name", "x", "--expression",
            "MEDIAN", "--lineage", "3",
        ])
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("MEDIAN"));
        assert!(message.contains("COUNT_IF"));
        assert!(message.contains("REVERSE"));
    }

    #[test]
    fn test_expression_accepted_in_any_case() {
        let cli = Cli::try_parse_from([
            "wren", "calc-field", "create", "--model", "1", "--name", "x", "--expression",
            "count", "--lineage", "12,15",
        ])
        .unwrap();
        match cli.command {
            Command::CalcField {
                action:
                    CalcFieldAction::Create {
                        expression,
                        lineage,
                        ..
                    },
            } => {
                assert_eq!(expression, Expression::Count);
                assert_eq!(lineage, Lineage(vec![12, 15]));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_instruction_update_global_flag() {
        let cli = Cli::try_parse_from(["wren", "instruction", "update", "4", "--global"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Instruction {
                action: InstructionAction::Update {
                    global: Some(true),
                    ..
                }
            }
        ));

        let cli =
            Cli::try_parse_from(["wren", "instruction", "update", "4", "--global", "false"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Command::Instruction {
                action: InstructionAction::Update {
                    global: Some(false),
                    ..
                }
            }
        ));
    }

    #[test]
    fn test_summary_defaults() {
        let cli =
            Cli::try_parse_from(["wren", "summary", "-q", "How many?", "-s", "SELECT 1"]).unwrap();
        match cli.command {
            Command::Summary(args) => assert_eq!(args.sample_size, 500),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
