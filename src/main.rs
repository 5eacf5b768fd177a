//! MusicCast deck plugin - host-launched executable
//!
//! This is the binary entry point. All logic lives in the workspace crates.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tracing::info;

use mcdeck_app::{load_config, Bootstrap};

/// Flags the host passes with a single leading dash.
const HOST_FLAGS: &[&str] = &["port", "pluginUUID", "registerEvent", "info", "config"];

/// MusicCast deck plugin - toggles and mirrors receiver power
#[derive(Parser, Debug)]
#[command(name = "mcdeck")]
#[command(about = "Deck plugin for MusicCast receiver power", long_about = None)]
struct Args {
    /// Port of the host's WebSocket listener
    #[arg(long)]
    port: u16,

    /// Identifier the plugin registers with
    #[arg(long = "pluginUUID")]
    plugin_uuid: String,

    /// Event name used for the registration frame
    #[arg(long = "registerEvent")]
    register_event: String,

    /// JSON description of the host environment
    #[arg(long)]
    info: Option<String>,

    /// Path to a config.toml overriding the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl From<Args> for Bootstrap {
    fn from(args: Args) -> Self {
        Bootstrap {
            port: args.port,
            plugin_uuid: args.plugin_uuid,
            register_event: args.register_event,
            info: args.info,
        }
    }
}

/// Rewrite `-flag` to `--flag` for the host's flags, leaving values alone.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some(s) if is_single_dash_host_flag(s) => OsString::from(format!("-{s}")),
            _ => arg,
        })
        .collect()
}

fn is_single_dash_host_flag(arg: &str) -> bool {
    arg.strip_prefix('-')
        .filter(|rest| !rest.starts_with('-'))
        .map(|rest| rest.split('=').next().unwrap_or(rest))
        .is_some_and(|name| HOST_FLAGS.contains(&name))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse_from(normalize_args(std::env::args_os()));

    mcdeck_core::logging::init().wrap_err("Failed to initialize logging")?;

    let config = load_config(args.config.as_deref());
    info!(
        "Starting for host on port {} (poll every {:?})",
        args.port,
        config.poll_interval()
    );

    mcdeck_app::run(Bootstrap::from(args), config)
        .await
        .wrap_err("Plugin terminated")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(normalize_args(args.iter().map(OsString::from)))
    }

    #[test]
    fn test_single_dash_host_flags() {
        let args = parse(&[
            "mcdeck",
            "-port",
            "28196",
            "-pluginUUID",
            "ABC-123",
            "-registerEvent",
            "registerPlugin",
            "-info",
            r#"{"application":{"version":"6.0"}}"#,
        ]);
        assert_eq!(args.port, 28196);
        assert_eq!(args.plugin_uuid, "ABC-123");
        assert_eq!(args.register_event, "registerPlugin");
        assert!(args.info.unwrap().contains("6.0"));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_double_dash_still_works() {
        let args = parse(&[
            "mcdeck",
            "--port",
            "1",
            "--pluginUUID",
            "u",
            "--registerEvent",
            "e",
            "--config",
            "/tmp/config.toml",
        ]);
        assert_eq!(args.config.unwrap(), PathBuf::from("/tmp/config.toml"));
    }

    #[test]
    fn test_only_host_flags_are_rewritten() {
        let normalized = normalize_args(["mcdeck", "-pluginUUID", "-x", "-1"].map(OsString::from));
        assert_eq!(
            normalized,
            ["mcdeck", "--pluginUUID", "-x", "-1"].map(OsString::from).to_vec()
        );
    }

    #[test]
    fn test_flag_with_equals() {
        assert!(is_single_dash_host_flag("-port=28196"));
        assert!(!is_single_dash_host_flag("--port"));
        assert!(!is_single_dash_host_flag("port"));
    }

    #[test]
    fn test_bootstrap_from_args() {
        let bootstrap = Bootstrap::from(parse(&[
            "mcdeck",
            "-port",
            "5",
            "-pluginUUID",
            "u",
            "-registerEvent",
            "e",
        ]));
        assert_eq!(bootstrap.port, 5);
        assert_eq!(bootstrap.registration().uuid, "u");
        assert!(bootstrap.info.is_none());
    }
}
