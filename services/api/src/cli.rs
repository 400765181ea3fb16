use crate::console::{self, ChatArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use medscore::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "medscore",
    about = "Run APACHE severity-scoring questionnaires over HTTP or in the terminal",
    version
)]
struct Cli {
    /// Override the configured test definitions file
    #[arg(long, global = true)]
    tests_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Take a test interactively in the terminal
    Chat(ChatArgs),
    /// List the loaded tests and their commands
    Tests,
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
        Command::Serve(args) => server::run(args, cli.tests_path).await,
        Command::Chat(args) => console::run(args, cli.tests_path).await,
        Command::Tests => console::list_tests(cli.tests_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["medscore"]).expect("parses");
        assert!(cli.command.is_none());
        assert!(cli.tests_path.is_none());
    }

    #[test]
    fn tests_path_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from([
            "medscore",
            "chat",
            "--chat-id",
            "bed-4",
            "--tests-path",
            "custom.json",
        ])
        .expect("parses");

        assert_eq!(cli.tests_path, Some(PathBuf::from("custom.json")));
        match cli.command {
            Some(Command::Chat(args)) => assert_eq!(args.chat_id, "bed-4"),
            other => panic!("expected chat command, got {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_host_and_port() {
        let cli = Cli::try_parse_from(["medscore", "serve", "--host", "0.0.0.0", "--port", "8080"])
            .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(args.port, Some(8080));
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }
}
