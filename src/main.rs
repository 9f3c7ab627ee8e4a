//! barked-panel - terminal front end for the barked hardening script
//!
//! Drives the command execution bridge from the command line: composes the
//! script flags, streams unprivileged output as it arrives, asks before
//! anything runs as administrator, and manages the launchd jobs.

use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use tracing::{debug, error, info};

use barked_bridge::bridge::{FixedConsent, ScriptBridge, TerminalConsent};
use barked_bridge::config::{schedule, BarkedPaths, Frequency, ScheduleConfig};
use barked_bridge::launchd::{self, Launchctl};
use barked_bridge::models::catalog::{CleanCategory, HardenModule, MonitorAction, Profile};
use barked_bridge::models::{
    AlertSeverity, ExecutionSession, Invocation, MonitorInterval, MonitorSettings, StartMode,
    UpdateOutcome,
};

/// Parsed command line
#[derive(Debug, Default)]
struct AppArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Enable debug logging
    debug: bool,
    /// Accept the administrator consent prompt without asking
    assume_yes: bool,
    /// Subcommand and its arguments
    command: Vec<String>,
}

impl AppArgs {
    /// Parse command line arguments
    fn parse() -> anyhow::Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let args: Vec<String> = args.into_iter().collect();
        let mut app_args = AppArgs::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    if i + 1 < args.len() {
                        app_args.config_path = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    } else {
                        bail!("Missing config file path");
                    }
                }
                "--debug" | "-d" => {
                    app_args.debug = true;
                }
                "--yes" | "-y" => {
                    app_args.assume_yes = true;
                }
                "--help" | "-h" => {
                    print_help();
                    process::exit(0);
                }
                "--version" | "-V" => {
                    println!("barked-panel v{}", barked_bridge::VERSION);
                    process::exit(0);
                }
                arg if arg.starts_with('-') && app_args.command.is_empty() => {
                    bail!("Unknown option: {}", arg);
                }
                _ => {
                    // Everything from the subcommand on belongs to it
                    app_args.command = args[i..].to_vec();
                    break;
                }
            }
            i += 1;
        }

        if app_args.command.is_empty() {
            bail!("Missing command");
        }
        Ok(app_args)
    }
}

/// Print help information
fn print_help() {
    println!("barked-panel - run barked hardening, cleaning and monitoring from a terminal");
    println!();
    println!("USAGE:");
    println!("    barked-panel [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>    Path to bridge configuration file");
    println!("    -d, --debug            Enable debug logging");
    println!("    -y, --yes              Do not ask before running as administrator");
    println!("    -h, --help             Print this help message");
    println!("    -V, --version          Print version information");
    println!();
    println!("COMMANDS:");
    println!("    clean preview <CATEGORIES>     Dry run of the selected clean categories");
    println!("    clean run <CATEGORIES>         Clean as administrator");
    println!("    clean quick                    Clean every category without elevation");
    println!("    clean categories               List clean categories");
    println!("    harden <PROFILE>               Apply standard, high or paranoid");
    println!("    modify <MODULES>               Apply individual hardening modules");
    println!("    modules                        List hardening modules by group");
    println!("    monitor <ACTION>               enable, disable, restart, logs, health");
    println!("    monitor install [FLAGS]        Install the monitor daemon");
    println!("        --start-mode <always|ac_power|manual>");
    println!("        --interval <60|300|900>");
    println!("        --severity <warning|critical>");
    println!("        --baseline");
    println!("    monitor uninstall              Remove the monitor daemon");
    println!("    monitor status                 Show the monitor daemon state");
    println!("    schedule show                  Show the scheduled clean");
    println!("    schedule set <daily|weekly> <CATEGORIES>");
    println!("    schedule clear                 Remove the scheduled clean");
    println!("    update                         Update barked itself");
    println!("    uninstall                      Revert hardening and remove barked");
    println!("    run -- <ARGS>                  Pass arguments straight to the script");
    println!();
    println!("    CATEGORIES and MODULES are comma-separated ids, or 'all'.");
    println!();
    println!("CONFIGURATION:");
    println!("    1. Path specified with --config");
    println!("    2. $BARKED_BRIDGE_CONFIG");
    println!("    3. ~/.config/barked/bridge.toml");
    println!("    4. ~/.barked/bridge.toml");
    println!("    5. Built-in defaults");
    println!();
    println!("ENVIRONMENT:");
    println!("    BARKED_BRIDGE_CONFIG   Path to configuration file");
    println!("    BARKED_DEBUG           Enable debug logging (1 or true)");
    println!("    RUST_LOG               Set logging level (error, warn, info, debug, trace)");
}

fn init_logging(debug: bool) {
    let debug = debug
        || env::var("BARKED_DEBUG").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    let log_level = if debug { "debug" } else { "warn" };

    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    let args = match AppArgs::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!();
            print_help();
            process::exit(2);
        }
    };

    init_logging(args.debug);
    info!("Starting barked-panel v{}", barked_bridge::VERSION);
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Execute the parsed command; returns the process exit code
async fn run(args: AppArgs) -> anyhow::Result<i32> {
    let config = barked_bridge::load_config(args.config_path.as_deref())
        .context("loading bridge configuration")?;
    let bridge = if args.assume_yes {
        ScriptBridge::from_config(&config, FixedConsent::accept())
    } else {
        ScriptBridge::from_config(&config, TerminalConsent::new())
    };

    let command: Vec<&str> = args.command.iter().map(String::as_str).collect();
    match command.as_slice() {
        ["clean", "preview", cats] => stream(&bridge, Invocation::clean_preview(&parse_list(cats)?)).await,
        ["clean", "run", cats] => {
            privileged(
                &bridge,
                Invocation::clean_force(&parse_list(cats)?),
                "Cleaning system caches and logs requires administrator access.",
            )
            .await
        }
        ["clean", "quick"] => stream(&bridge, Invocation::clean_force(&CleanCategory::ALL)).await,
        ["clean", "categories"] => {
            for category in CleanCategory::ALL {
                println!("{:<16} {}", category.id(), category.display_name());
            }
            Ok(0)
        }
        ["harden", profile] => {
            let profile: Profile = profile.parse()?;
            privileged(
                &bridge,
                Invocation::apply_profile(profile),
                &format!(
                    "Applying the {} profile changes system settings.",
                    profile.display_name()
                ),
            )
            .await
        }
        ["modify", modules] => {
            let modules: Vec<HardenModule> = parse_list(modules)?;
            if modules.is_empty() {
                bail!("No modules selected");
            }
            privileged(
                &bridge,
                Invocation::modify(&modules),
                &format!("Applying {} hardening module(s) changes system settings.", modules.len()),
            )
            .await
        }
        ["modules"] => {
            for (group, modules) in HardenModule::grouped() {
                println!("{}", group.display_name());
                for module in modules {
                    println!("  {:<24} {}", module.id(), module.display_name());
                }
            }
            Ok(0)
        }
        ["monitor", "install", flags @ ..] => {
            let settings = parse_monitor_settings(flags)?;
            let paths = BarkedPaths::resolve(&config)?;
            let baseline =
                launchd::install_monitor(&bridge, &Launchctl::new(), &paths, &settings).await?;
            if let Some(session) = baseline {
                print!("{}", session.output());
            }
            println!("Monitor daemon installed");
            Ok(0)
        }
        ["monitor", "uninstall"] => {
            let paths = BarkedPaths::resolve(&config)?;
            launchd::uninstall_monitor(&Launchctl::new(), &paths).await?;
            println!("Monitor daemon removed");
            Ok(0)
        }
        ["monitor", "status"] => {
            let paths = BarkedPaths::resolve(&config)?;
            println!("{}", launchd::monitor_status(&Launchctl::new(), &paths).await);
            Ok(0)
        }
        ["monitor", action] => {
            let action: MonitorAction = action.parse()?;
            stream(&bridge, Invocation::monitor(action)).await
        }
        ["schedule", "show"] => {
            let paths = BarkedPaths::resolve(&config)?;
            let text = schedule::display_text(&paths.schedule_file());
            println!("{}", text);
            if let Some(record) = ScheduleConfig::read(&paths.schedule_file()) {
                if record.enabled {
                    println!("Categories: {}", record.categories.join(", "));
                }
            }
            Ok(0)
        }
        ["schedule", "set", frequency, cats] => {
            let frequency: Frequency = frequency.parse()?;
            let categories: Vec<CleanCategory> = parse_list(cats)?;
            if categories.is_empty() {
                bail!("No categories selected");
            }
            let paths = BarkedPaths::resolve(&config)?;
            let script = bridge.locator().resolve_script();
            launchd::save_schedule(&Launchctl::new(), &paths, &script, frequency, &categories)
                .await?;
            println!("Schedule saved");
            Ok(0)
        }
        ["schedule", "clear"] => stream(&bridge, Invocation::clean_unschedule()).await,
        ["update"] => {
            let session = stream_session(&bridge, Invocation::update_app()).await?;
            match UpdateOutcome::classify(session.output()) {
                UpdateOutcome::Relaunch => println!("Updated. Restart barked-panel to use the new version."),
                UpdateOutcome::UpToDate => println!("Already up to date"),
                UpdateOutcome::Failed => println!("Update failed"),
            }
            Ok(session.exit_code().unwrap_or(1))
        }
        ["uninstall"] => {
            privileged(
                &bridge,
                Invocation::uninstall(),
                "Uninstalling reverts hardening changes and removes barked.",
            )
            .await
        }
        ["run", "--", raw @ ..] | ["run", raw @ ..] => stream(&bridge, Invocation::new(raw.iter().copied())).await,
        other => bail!("Unknown command: {}", other.join(" ")),
    }
}

/// Run unprivileged, echoing output as it arrives
async fn stream(bridge: &ScriptBridge, invocation: Invocation) -> anyhow::Result<i32> {
    let session = stream_session(bridge, invocation).await?;
    Ok(session.exit_code().unwrap_or(1))
}

async fn stream_session(
    bridge: &ScriptBridge,
    invocation: Invocation,
) -> anyhow::Result<ExecutionSession> {
    let handle = bridge.spawn(invocation)?;
    let mut wait = Box::pin(handle.wait_with(|chunk| {
        print!("{}", chunk);
        let _ = std::io::stdout().flush();
    }));

    // Ctrl-C asks the script to stop; the session still ends through its exit
    loop {
        tokio::select! {
            session = &mut wait => return Ok(session),
            interrupted = tokio::signal::ctrl_c() => {
                if interrupted.is_ok() {
                    info!("Interrupted, cancelling script");
                    if let Err(e) = bridge.cancel().await {
                        error!("Cancel failed: {}", e);
                    }
                }
            }
        }
    }
}

/// Run as administrator and print the captured output
async fn privileged(bridge: &ScriptBridge, invocation: Invocation, reason: &str) -> anyhow::Result<i32> {
    let session = bridge.run_privileged(invocation, reason).await?;
    print!("{}", session.output());
    if !session.output().ends_with('\n') {
        println!();
    }
    Ok(session.exit_code().unwrap_or(1))
}

/// Comma-separated ids, or `all`
fn parse_list<T>(list: &str) -> anyhow::Result<Vec<T>>
where
    T: std::str::FromStr<Err = barked_bridge::Error> + AllItems,
{
    if list.trim().eq_ignore_ascii_case("all") {
        return Ok(T::all());
    }
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.parse::<T>().map_err(anyhow::Error::from))
        .collect()
}

trait AllItems: Sized {
    fn all() -> Vec<Self>;
}

impl AllItems for CleanCategory {
    fn all() -> Vec<Self> {
        CleanCategory::ALL.to_vec()
    }
}

impl AllItems for HardenModule {
    fn all() -> Vec<Self> {
        HardenModule::ALL.to_vec()
    }
}

fn parse_monitor_settings(flags: &[&str]) -> anyhow::Result<MonitorSettings> {
    let mut settings = MonitorSettings::default();
    let mut i = 0;
    while i < flags.len() {
        let value = flags.get(i + 1).copied();
        match (flags[i], value) {
            ("--start-mode", Some(mode)) => {
                settings.start_mode = match mode {
                    "always" => StartMode::Always,
                    "ac_power" | "ac-power" => StartMode::AcPower,
                    "manual" => StartMode::Manual,
                    other => bail!("Unknown start mode: {}", other),
                };
                i += 1;
            }
            ("--interval", Some(secs)) => {
                settings.interval = match secs {
                    "60" => MonitorInterval::OneMinute,
                    "300" => MonitorInterval::FiveMinutes,
                    "900" => MonitorInterval::FifteenMinutes,
                    other => bail!("Interval must be 60, 300 or 900 seconds, got {}", other),
                };
                i += 1;
            }
            ("--severity", Some(level)) => {
                settings.severity = match level {
                    "warning" => AlertSeverity::WarningAndCritical,
                    "critical" => AlertSeverity::CriticalOnly,
                    other => bail!("Unknown severity: {}", other),
                };
                i += 1;
            }
            ("--baseline", _) => settings.create_baseline = true,
            (flag, _) => bail!("Unknown monitor install option: {}", flag),
        }
        i += 1;
    }
    Ok(settings)
}
