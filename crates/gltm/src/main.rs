use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use gltm::app::{self, Invocation, Session};
use gltm::cli::{self, Cli};
use gltm::config;
use gltm::host::GitlabClient;
use gltm::logging;
use gltm::model::today;
use gltm::output::print_error;
use gltm::secret::SecretSink;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(cli::parse_exit_code(&err));
        }
    };
    logging::init(&cli.log_level);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // Everything that can be rejected locally is rejected before the first
    // request goes out.
    let invocation = Invocation::from_cli(&cli)?;
    let settings = config::resolve_settings(&cli)?;

    let client = GitlabClient::new(&settings.url, &settings.private_token);
    let session = Session {
        host: &client,
        sink: SecretSink::new(invocation.secret_target.clone()),
        format: settings.format,
        today: today(),
    };

    let mut stdout = io::stdout().lock();
    let outcome = app::run(&session, &invocation, &mut stdout).await?;
    Ok(ExitCode::from(outcome.exit_code()))
}
