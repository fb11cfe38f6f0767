//! Entry point for the dgos TUI. Parses args, resolves the profile and runs the App.

use std::env;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dgos::app::App;
use dgos::demo::DemoSource;
use dgos::fetch::{metrics_endpoint, HttpSource, MetricsSource};
use dgos::logging::{self, LogTarget};
use dgos::normalize::normalize;
use dgos::profiles::{load_profiles, save_profiles, ProfileEntry, ProfileRequest, ResolveProfile};
use dgos::session::{DashboardSession, SessionConfig, DEFAULT_INTERVAL};
use dgos::LogReporter;

const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Default)]
struct ParsedArgs {
    url: Option<String>,
    interval_ms: Option<u64>,
    timeout_ms: Option<u64>,
    profile: Option<String>,
    save: bool,
    demo: bool,
    once: bool,
    dry_run: bool,
}

enum ArgsError {
    Help(String),
    Invalid(String),
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--interval-ms MS|-i MS] [--timeout-ms MS] [--profile NAME|-P NAME] [--save] [--demo] [--once] [--dry-run] [http://HOST:PORT]"
    )
}

fn parse_ms(flag: &str, v: Option<String>) -> Result<u64, ArgsError> {
    let v = v.ok_or_else(|| ArgsError::Invalid(format!("{flag} needs a value in milliseconds")))?;
    v.parse::<u64>()
        .map_err(|_| ArgsError::Invalid(format!("{flag}: '{v}' is not a number of milliseconds")))
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, ArgsError> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "dgos".into());
    let mut parsed = ParsedArgs::default();

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(ArgsError::Help(usage(&prog))),
            "--interval-ms" | "-i" => parsed.interval_ms = Some(parse_ms("--interval-ms", it.next())?),
            "--timeout-ms" => parsed.timeout_ms = Some(parse_ms("--timeout-ms", it.next())?),
            "--profile" | "-P" => parsed.profile = it.next(),
            "--save" => parsed.save = true,
            "--demo" => parsed.demo = true,
            "--once" => parsed.once = true,
            "--dry-run" => parsed.dry_run = true,
            _ if arg.starts_with("--interval-ms=") => {
                let v = arg.split_once('=').map(|(_, v)| v.to_string());
                parsed.interval_ms = Some(parse_ms("--interval-ms", v)?);
            }
            _ if arg.starts_with("--profile=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        parsed.profile = Some(v.to_string());
                    }
                }
            }
            _ if arg.starts_with('-') => {
                return Err(ArgsError::Invalid(format!("Unknown option '{arg}'. {}", usage(&prog))))
            }
            _ => {
                if parsed.url.is_none() {
                    parsed.url = Some(arg);
                } else {
                    return Err(ArgsError::Invalid(format!("Unexpected argument. {}", usage(&prog))));
                }
            }
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(ArgsError::Help(msg)) => {
            eprintln!("{msg}");
            return Ok(());
        }
        Err(ArgsError::Invalid(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    // Demo mode short-circuit (ignore connection args)
    if parsed.demo || matches!(parsed.profile.as_deref(), Some("demo")) {
        let config = SessionConfig::with_interval_ms(parsed.interval_ms.unwrap_or(1000));
        return run(DemoSource::new(), config, parsed.once).await;
    }

    let Some((url, interval_ms)) = resolve_connection(&parsed)? else {
        return Ok(());
    };
    let endpoint = metrics_endpoint(&url).with_context(|| format!("invalid metrics URL '{url}'"))?;
    let config = interval_ms
        .map(SessionConfig::with_interval_ms)
        .unwrap_or_default();

    if parsed.dry_run {
        println!("endpoint: {endpoint}");
        println!("interval_ms: {}", config.interval.as_millis());
        return Ok(());
    }

    let timeout = Duration::from_millis(parsed.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS));
    let source = HttpSource::new(endpoint, timeout)?;
    run(source, config, parsed.once).await
}

async fn run<S: MetricsSource>(source: S, config: SessionConfig, once: bool) -> anyhow::Result<()> {
    if once {
        logging::init(LogTarget::Stderr)?;
        let raw = source.fetch().await?;
        let snapshot = normalize(&raw)?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    logging::init(LogTarget::File)?;
    let session = DashboardSession::start(source, config, Arc::new(LogReporter));
    App::new(session).run().await
}

/// Applies profile rules; `None` means the user aborted or nothing was given.
fn resolve_connection(parsed: &ParsedArgs) -> anyhow::Result<Option<(String, Option<u64>)>> {
    let profiles_file = load_profiles();
    let req = ProfileRequest {
        profile_name: parsed.profile.clone(),
        url: parsed.url.clone(),
        interval_ms: parsed.interval_ms,
    };
    let mut profiles_mut = profiles_file.clone();

    let resolved = match req.resolve(&profiles_file) {
        ResolveProfile::Direct(u, i) => {
            // Possibly save if profile specified and --save or new entry
            if let Some(name) = parsed.profile.as_ref() {
                let entry = ProfileEntry {
                    url: u.clone(),
                    interval_ms: i,
                };
                let write = match profiles_mut.profiles.get(name) {
                    // New profile: auto-save immediately
                    None => true,
                    Some(existing) if *existing != entry => {
                        parsed.save
                            || prompt_yes_no(&format!("Overwrite existing profile '{name}'? [y/N]: "))
                    }
                    Some(_) => false,
                };
                if write {
                    profiles_mut.profiles.insert(name.clone(), entry);
                    save_profiles(&profiles_mut).context("saving profiles")?;
                }
            }
            (u, i)
        }
        ResolveProfile::Loaded(u, i) => (u, i),
        ResolveProfile::PromptSelect(names) => {
            eprintln!("Select profile:");
            for (i, n) in names.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, n);
            }
            let line = prompt_string("Enter number (or blank to abort): ")?;
            let Some(name) = line
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|idx| (1..=names.len()).contains(idx))
                .map(|idx| &names[idx - 1])
            else {
                return Ok(None);
            };
            match profiles_mut.profiles.get(name) {
                Some(entry) => (entry.url.clone(), parsed.interval_ms.or(entry.interval_ms)),
                None => return Ok(None),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string("Enter URL (http://HOST:PORT): ")?;
            if url.trim().is_empty() {
                return Ok(None);
            }
            let entry = ProfileEntry {
                url: url.trim().to_string(),
                interval_ms: parsed.interval_ms,
            };
            profiles_mut.profiles.insert(name, entry.clone());
            save_profiles(&profiles_mut).context("saving profiles")?;
            (entry.url, entry.interval_ms)
        }
        ResolveProfile::None => {
            eprintln!(
                "No URL provided and no profiles to select. Polling defaults to every {} ms.",
                DEFAULT_INTERVAL.as_millis()
            );
            return Ok(None);
        }
    };
    Ok(Some(resolved))
}

fn prompt_yes_no(prompt: &str) -> bool {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_ok() {
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}
