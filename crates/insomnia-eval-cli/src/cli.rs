use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "insomnia-eval",
    version,
    about = "Score insomnia detection predictions against a gold standard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Note-level insomnia classification (binary F1)
    #[command(name = "subtask1")]
    Subtask1(EvalArgs),

    /// Definition and rule classification (micro F1)
    #[command(name = "subtask2a")]
    Subtask2a(EvalArgs),

    /// Evidence span extraction (ROUGE-L)
    #[command(name = "subtask2b")]
    Subtask2b(EvalArgs),

    /// Any task described by a YAML or JSON task config
    Custom(CustomArgs),
}

#[derive(Args, Debug, Clone)]
pub struct EvalArgs {
    /// Path to the gold standard JSON file
    #[arg(short = 'g', long = "gs_path")]
    pub gs_path: PathBuf,

    /// Path to the predictions JSON file
    #[arg(short = 'p', long = "pred_path")]
    pub pred_path: PathBuf,

    /// Report every schema error instead of stopping at the first
    #[arg(long, default_value_t = false)]
    pub aggregate_errors: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct CustomArgs {
    /// Task config file (.yaml, .yml or .json)
    #[arg(long)]
    pub task_config: PathBuf,

    #[command(flatten)]
    pub eval: EvalArgs,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_short_flags() {
        let cli = Cli::try_parse_from(["insomnia-eval", "subtask1", "-g", "gold.json", "-p", "preds.json"])
            .unwrap();

        let Commands::Subtask1(args) = cli.command else {
            panic!("expected subtask1");
        };
        assert_eq!(args.gs_path, PathBuf::from("gold.json"));
        assert_eq!(args.pred_path, PathBuf::from("preds.json"));
        assert!(!args.aggregate_errors);
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn test_parses_long_flags_and_format() {
        let cli = Cli::try_parse_from([
            "insomnia-eval",
            "subtask2b",
            "--gs_path",
            "gold.json",
            "--pred_path",
            "preds.json",
            "--aggregate-errors",
            "--format",
            "json",
        ])
        .unwrap();

        let Commands::Subtask2b(args) = cli.command else {
            panic!("expected subtask2b");
        };
        assert!(args.aggregate_errors);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_custom_requires_task_config() {
        let missing = Cli::try_parse_from(["insomnia-eval", "custom", "-g", "a.json", "-p", "b.json"]);
        assert!(missing.is_err());

        let cli = Cli::try_parse_from([
            "insomnia-eval",
            "custom",
            "--task-config",
            "task.yaml",
            "-g",
            "a.json",
            "-p",
            "b.json",
        ])
        .unwrap();
        let Commands::Custom(args) = cli.command else {
            panic!("expected custom");
        };
        assert_eq!(args.task_config, PathBuf::from("task.yaml"));
        assert_eq!(args.eval.gs_path, PathBuf::from("a.json"));
    }

    #[test]
    fn test_both_paths_required() {
        assert!(Cli::try_parse_from(["insomnia-eval", "subtask2a", "-g", "gold.json"]).is_err());
    }
}
