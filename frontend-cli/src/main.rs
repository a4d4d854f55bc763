use anyhow::Result;
use backend::NativeSystem;
use clap::error::ErrorKind;
use cli::Config;
use dispatcher::Dispatcher;
use std::io;
use std::process::ExitCode;

mod cli;
mod dispatcher;
mod report;

fn main() -> Result<ExitCode> {
    let program = std::env::args()
        .next()
        .unwrap_or_else(|| "memwarden".to_string());

    let cli = match cli::parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            if let Some(reason) = e.to_string().lines().next() {
                eprintln!("{}", reason);
            }
            print!("{}", report::usage(&program));
            return Ok(ExitCode::from(1));
        }
    };

    let config = Config::from(&cli);
    env_logger::Builder::new()
        .filter_level(config.log_level)
        .format_timestamp(None)
        .init();

    let stdin = io::stdin();
    let mut dispatcher = Dispatcher::new(
        NativeSystem::new(),
        stdin.lock(),
        io::stdout().lock(),
        io::stderr().lock(),
    );

    match cli.command {
        Some(command) => dispatcher.run_command(command)?,
        None => dispatcher.run_interactive()?,
    }

    Ok(ExitCode::SUCCESS)
}
