use std::process::ExitCode;

use clap::Parser;
use sm_service_instances::Error;
use sm_service_instances::commands::instances::InstancesCommand;
use sm_service_instances::host::cf::{CfCli, DEFAULT_HOST_CLI};
use sm_service_instances::http::client::HttpClient;
use sm_service_instances::http::config::{HttpConfig, ProxyConfig};
use sm_service_instances::parameters::{Commands, normalize_flag_style};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "sm-service-instances", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug information on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Host platform CLI used to manage the temporary service key
    #[arg(long, env = "SM_HOST_CLI", default_value = DEFAULT_HOST_CLI, global = true)]
    host_cli: String,

    /// Proxy for the HTTP calls. HTTPS_PROXY, then HTTP_PROXY, are used when not set
    #[arg(long, global = true)]
    proxy: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_flag_style(std::env::args_os()));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .init();

    match run(cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, Error> {
    let Commands::ServiceManagerServiceInstances(args) = cli.command;
    let request = match args.into_request() {
        Ok(request) => request,
        Err(usage) => return Ok(format!("{usage}\n")),
    };

    let proxy = ProxyConfig::new(cli.proxy)?.try_with_url_from_env()?;
    let http_client = HttpClient::new(HttpConfig::new(proxy))?;
    let host = CfCli::new(cli.host_cli);

    InstancesCommand::new(&host, &http_client).execute(&request)
}
