//! Session commands: drive the local mirror of the agent state

use colored::*;
use eyre::{Context, Result};
use std::io::Read;

use personakit::config::Config;
use personakit::persona::FileBackend;
use personakit::session::{SessionBinder, SessionMirror, SessionPatch, SessionPhase};

use crate::cli::{OutputFormat, SessionAction};
use crate::commands::persona::open_store;

pub fn run(action: SessionAction, config: &Config) -> Result<()> {
    let mut mirror = SessionMirror::new(config.backend());

    match action {
        SessionAction::Start { persona } => {
            let id = persona.unwrap_or_else(|| config.session.default_persona.clone());
            start(&mut mirror, &id, config)
        }
        SessionAction::Select { id } => select(&mut mirror, &id, config),
        SessionAction::Patch { json } => {
            let json = match json {
                Some(json) => json,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read patch from stdin")?;
                    buf
                }
            };
            let patch: SessionPatch = serde_json::from_str(&json).context("Invalid session patch JSON")?;
            patch_state(&mut mirror, |_| Ok(patch))
        }
        SessionAction::Proverb { text } => {
            patch_state(&mut mirror, |binder| Ok(SessionPatch::add_proverb(binder.state(), text)))
        }
        SessionAction::RemoveProverb { index } => patch_state(&mut mirror, |binder| {
            let count = binder.state().proverbs.len();
            SessionPatch::remove_proverb(binder.state(), index)
                .ok_or_else(|| eyre::eyre!("No proverb at index {} (session has {})", index, count))
        }),
        SessionAction::Theme { color } => patch_state(&mut mirror, |_| Ok(SessionPatch::theme_color(color))),
        SessionAction::Show { format } => show(&mirror, OutputFormat::resolve(format)),
        SessionAction::End => end(&mut mirror),
        SessionAction::Reset => reset(&mut mirror),
    }
}

fn start(mirror: &mut SessionMirror<FileBackend>, id: &str, config: &Config) -> Result<()> {
    let binder = SessionBinder::new().with_theme_color(config.session.theme_color.clone());
    bind(mirror, binder, id, config)
}

fn select(mirror: &mut SessionMirror<FileBackend>, id: &str, config: &Config) -> Result<()> {
    let mut binder = mirror.load();
    if binder.phase() == &SessionPhase::Uninitialized {
        binder = binder.with_theme_color(config.session.theme_color.clone());
    }
    bind(mirror, binder, id, config)
}

fn bind(mirror: &mut SessionMirror<FileBackend>, mut binder: SessionBinder, id: &str, config: &Config) -> Result<()> {
    let registry = open_store(config).list();
    let selected = binder
        .select_persona(&registry, id)
        .context("Failed to select persona")?
        .to_string();
    mirror.save(&binder).context("Failed to save session")?;

    if selected != id {
        eprintln!(
            "{} Persona '{}' not found, using '{}'",
            "!".yellow(),
            id,
            selected
        );
    }

    let icon = registry.get(&selected).map(|p| p.icon()).unwrap_or_default();
    println!(
        "{} Active persona: {} {} {}",
        "✓".green(),
        icon,
        binder.state().agent_name.bold(),
        format!("({})", selected).dimmed()
    );
    Ok(())
}

fn patch_state<F>(mirror: &mut SessionMirror<FileBackend>, make_patch: F) -> Result<()>
where
    F: FnOnce(&SessionBinder) -> Result<SessionPatch>,
{
    let mut binder = mirror.load();
    let patch = make_patch(&binder)?;

    binder
        .apply_transient_update(patch)
        .context("Failed to update session")?;
    mirror.save(&binder).context("Failed to save session")?;

    println!("{} Session updated", "✓".green());
    Ok(())
}

fn show(mirror: &SessionMirror<FileBackend>, format: OutputFormat) -> Result<()> {
    let binder = mirror.load();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&binder)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&binder)?),
        OutputFormat::Text => {
            let phase = match binder.phase() {
                SessionPhase::Uninitialized => "not started".dimmed(),
                SessionPhase::Active { .. } => "active".green(),
                SessionPhase::Terminated => "ended".red(),
            };
            println!("{} {}", "Session:".bold(), phase);

            let Some(persona) = binder.selected() else {
                println!();
                println!("  Start one with: {}", "personakit session start".cyan());
                return Ok(());
            };

            let state = binder.state();
            println!("{} {} {}", "Agent:".bold(), state.agent_name.bold(), format!("({})", persona).dimmed());
            println!("{} {}", "Theme:".bold(), state.theme_color);

            println!();
            println!("{}", "System Prompt:".bold());
            if state.system_prompt.is_empty() {
                println!("  {}", "(cleared)".dimmed());
            } else {
                for line in state.system_prompt.lines() {
                    println!("  {}", line);
                }
            }

            println!();
            println!("{}", "Proverbs:".bold());
            for (i, proverb) in state.proverbs.iter().enumerate() {
                println!("  {} {}", format!("{}.", i).cyan(), proverb);
            }

            if let Some(report) = state.weather() {
                println!();
                let humidity = match report.humidity_percent() {
                    Some(percent) => format!("{}%", percent),
                    None => "unknown".to_string(),
                };
                println!(
                    "{} {} {:.1}°C, {} humidity",
                    "Weather:".bold(),
                    report.condition(),
                    report.temperature,
                    humidity
                );
            }

            if !state.observed_steps.is_empty() {
                println!();
                println!("{}", "Observed Steps:".bold());
                for step in &state.observed_steps {
                    println!("  {} {}", "•".blue(), step);
                }
            }

            if state.pending_confirmation {
                println!();
                println!("{} {}", "Awaiting confirmation:".yellow().bold(), state.confirmation_message);
                if !state.confirmation_context.is_empty() {
                    println!("  {}", state.confirmation_context.dimmed());
                }
            } else if !state.user_response.is_empty() {
                println!();
                println!("{} {}", "Last confirmation:".bold(), state.user_response);
            }
        }
    }

    Ok(())
}

fn end(mirror: &mut SessionMirror<FileBackend>) -> Result<()> {
    let mut binder = mirror.load();
    binder.end();
    mirror.save(&binder).context("Failed to save session")?;

    println!("{} Session ended", "✓".green());
    Ok(())
}

fn reset(mirror: &mut SessionMirror<FileBackend>) -> Result<()> {
    mirror.clear().context("Failed to remove saved session")?;

    println!("{} Session reset", "✓".green());
    Ok(())
}
