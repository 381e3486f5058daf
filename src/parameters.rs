use std::ffi::OsString;

use clap::{ArgAction, Args, Subcommand};
use thiserror::Error;

use crate::commands::instances::InstancesRequest;
use crate::output::{OutputFormat, UnknownOutputFormat};

pub const DEFAULT_OFFERING: &str = "hana";
pub const DEFAULT_PLAN: &str = "hdi-shared";
pub const DEFAULT_OUTPUT_FORMAT: &str = "Txt";

/// Long flags the host plugin convention also accepts with a single dash.
const SINGLE_DASH_LONG_FLAGS: [&str; 3] = ["offering", "plan", "credentials"];

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the service instances of a service offering plan, with their connection details.
    #[command(visible_alias = "smsi")]
    ServiceManagerServiceInstances(InstancesArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct InstancesArgs {
    /// Service Manager instance used to reach the Service Manager API
    #[arg(value_name = "SERVICE_MANAGER_INSTANCE")]
    pub instance: Option<String>,

    /// Service offering
    #[arg(long, default_value = DEFAULT_OFFERING)]
    pub offering: String,

    /// Service plan
    #[arg(long, default_value = DEFAULT_PLAN)]
    pub plan: String,

    /// Show credentials
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub credentials: bool,

    /// Show as JSON | SQLTools | Txt
    #[arg(short = 'o', long = "output", value_name = "FORMAT", default_value = DEFAULT_OUTPUT_FORMAT)]
    pub output: String,
}

/// Invalid usage. Reported on stdout without failing the process.
#[derive(Error, Debug, PartialEq)]
pub enum ArgumentsError {
    #[error("Please specify an instance of service manager")]
    MissingInstance,
    #[error(transparent)]
    InvalidOutputFormat(#[from] UnknownOutputFormat),
}

impl InstancesArgs {
    /// Validates the arguments. Nothing is requested from the platform before this succeeds.
    pub fn into_request(self) -> Result<InstancesRequest, ArgumentsError> {
        let management_instance = self
            .instance
            .filter(|instance| !instance.is_empty())
            .ok_or(ArgumentsError::MissingInstance)?;
        let output_format = self.output.parse::<OutputFormat>()?;

        Ok(InstancesRequest {
            management_instance,
            offering: self.offering,
            plan: self.plan,
            show_credentials: self.credentials,
            output_format,
        })
    }
}

/// Rewrites single-dash long flags (`-offering x`, `-plan=y`, `-credentials`) to their
/// double-dash form. Every other argument is kept as is.
pub fn normalize_flag_style<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(|arg| {
            let arg: OsString = arg.into();
            let rewritten = arg
                .to_str()
                .filter(|value| is_single_dash_long_flag(value))
                .map(|value| format!("-{value}"));
            rewritten.map(OsString::from).unwrap_or(arg)
        })
        .collect()
}

fn is_single_dash_long_flag(arg: &str) -> bool {
    let Some(flag) = arg.strip_prefix('-').filter(|rest| !rest.starts_with('-')) else {
        return false;
    };
    let name = flag.split_once('=').map_or(flag, |(name, _)| name);
    SINGLE_DASH_LONG_FLAGS.contains(&name)
}
