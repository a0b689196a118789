use crate::demo::{run_demo, run_rubric, run_score, DemoArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use underwrite_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Underwriting Risk Assessor",
    about = "Score insurance applicants and serve the underwriting API from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score an applicant form export and print the assessment
    Score(ScoreArgs),
    /// Print the active scoring rubric as JSON
    Rubric,
    /// Score the built-in sample applicant and print the report
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args).await,
        Command::Rubric => run_rubric(),
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::OutputFormat;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["underwrite-ai-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn score_accepts_data_file_and_format() {
        let cli = Cli::try_parse_from([
            "underwrite-ai-api",
            "score",
            "--data-file",
            "applicant.json",
            "--format",
            "csv",
            "--assessed-on",
            "2025-01-15",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Score(args)) => {
                assert_eq!(args.data_file.to_str(), Some("applicant.json"));
                assert_eq!(args.format, OutputFormat::Csv);
                assert!(args.assessed_on.is_some());
                assert!(!args.with_advice);
            }
            other => panic!("expected score command, got {other:?}"),
        }
    }

    #[test]
    fn score_rejects_malformed_dates() {
        let result = Cli::try_parse_from([
            "underwrite-ai-api",
            "score",
            "--data-file",
            "applicant.json",
            "--assessed-on",
            "15/01/2025",
        ]);
        assert!(result.is_err());
    }
}
