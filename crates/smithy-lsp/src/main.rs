//! Process entry point: CLI parsing (§6), logging init, and handing off to
//! [`smithy_lsp::LanguageServer`].

use std::io::{self, BufReader};
use std::process::ExitCode;

use smithy_lsp::{LanguageServer, ServerConfig, TransportMode};

const USAGE: &str = "\
smithy-lsp - Language Server Protocol backend for the Smithy IDL

USAGE:
    smithy-lsp [OPTIONS] [PORT]

OPTIONS:
    -h, --help               Print this help and exit
    -p, --port-number <PORT> Start in websocket mode on the given port

A bare positional argument is interpreted as the port. Port 0 selects
stdio transport (the default when no port is given).";

enum Cli {
    Help,
    Run { port: u16 },
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Cli, String> {
    args.next(); // skip argv[0]
    let mut port: Option<u16> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Cli::Help),
            "--port-number" | "-p" => {
                let value = args.next().ok_or_else(|| "Invalid port number.".to_string())?;
                port = Some(parse_port(&value)?);
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unexpected CLI argument: {arg}"));
            }
            _ => {
                port = Some(parse_port(&arg)?);
            }
        }
    }

    Ok(Cli::Run { port: port.unwrap_or(0) })
}

fn parse_port(value: &str) -> Result<u16, String> {
    value.parse::<u32>().ok().filter(|p| *p <= 65535).map(|p| p as u16).ok_or_else(|| "Invalid port number.".to_string())
}

fn main() -> ExitCode {
    let cli = match parse_args(std::env::args()) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let port = match cli {
        Cli::Help => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Cli::Run { port } => port,
    };

    let transport = if port == 0 { TransportMode::Stdio } else { TransportMode::WebSocket { port } };
    let config = ServerConfig::from_env(transport);

    let workspace_root = std::env::current_dir().ok();
    let _logging_guard = smithy_lsp::logging::init(&config, workspace_root.as_deref());

    let exit_code = match transport {
        TransportMode::Stdio => {
            let server = LanguageServer::new(config, Box::new(io::stdout()));
            server.run_stdio(BufReader::new(io::stdin()))
        }
        TransportMode::WebSocket { port } => {
            let server = LanguageServer::new(config.clone(), Box::new(io::sink()));
            server.run_websocket(port, &config.websocket_host)
        }
    };

    match exit_code {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("smithy-lsp exited with an I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        std::iter::once("smithy-lsp".to_string()).chain(raw.iter().map(|s| s.to_string())).collect()
    }

    #[test]
    fn no_arguments_selects_stdio() {
        let cli = parse_args(args(&[]).into_iter()).expect("parse");
        assert!(matches!(cli, Cli::Run { port: 0 }));
    }

    #[test]
    fn bare_positional_argument_is_the_port() {
        let cli = parse_args(args(&["3000"]).into_iter()).expect("parse");
        assert!(matches!(cli, Cli::Run { port: 3000 }));
    }

    #[test]
    fn port_number_flag_sets_the_port() {
        let cli = parse_args(args(&["--port-number", "4000"]).into_iter()).expect("parse");
        assert!(matches!(cli, Cli::Run { port: 4000 }));

        let cli = parse_args(args(&["-p", "4000"]).into_iter()).expect("parse");
        assert!(matches!(cli, Cli::Run { port: 4000 }));
    }

    #[test]
    fn help_flag_is_recognized_in_either_form() {
        assert!(matches!(parse_args(args(&["--help"]).into_iter()), Ok(Cli::Help)));
        assert!(matches!(parse_args(args(&["-h"]).into_iter()), Ok(Cli::Help)));
    }

    #[test]
    fn out_of_range_port_is_rejected() {
        let err = parse_args(args(&["70000"]).into_iter()).unwrap_err();
        assert_eq!(err, "Invalid port number.");
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let err = parse_args(args(&["abc"]).into_iter()).unwrap_err();
        assert_eq!(err, "Invalid port number.");
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let err = parse_args(args(&["--bogus"]).into_iter()).unwrap_err();
        assert_eq!(err, "Unexpected CLI argument: --bogus");
    }
}
