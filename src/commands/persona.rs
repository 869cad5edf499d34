//! Persona management commands

use colored::*;
use eyre::{Context, Result};

use personakit::config::Config;
use personakit::persona::builtin::{AVAILABLE_ICONS, is_builtin};
use personakit::persona::{FileBackend, Persona, PersonaDraft, PersonaPatch, PersonaStore};

use crate::cli::{OutputFormat, PersonaAction};

pub fn run(action: PersonaAction, config: &Config) -> Result<()> {
    let mut store = open_store(config);

    match action {
        PersonaAction::List { format } => list(&store, OutputFormat::resolve(format)),
        PersonaAction::Show { id, format } => show(&store, &id, OutputFormat::resolve(format)),
        PersonaAction::Create { name, prompt, icon } => create(&mut store, PersonaDraft::new(name, prompt, icon)),
        PersonaAction::Update { id, name, prompt, icon } => {
            let patch = PersonaPatch {
                agent_name: name,
                system_prompt: prompt,
                icon,
            };
            update(&mut store, &id, &patch)
        }
        PersonaAction::Delete { id } => delete(&mut store, &id),
        PersonaAction::Icons => icons(),
    }
}

pub fn open_store(config: &Config) -> PersonaStore<FileBackend> {
    PersonaStore::with_key(config.backend(), config.storage.key.clone())
}

fn list(store: &PersonaStore<FileBackend>, format: OutputFormat) -> Result<()> {
    let registry = store.list();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&registry)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&registry)?),
        OutputFormat::Text => {
            println!("{}", "Built-in Personas:".bold());
            println!();
            for (id, persona) in registry.builtin() {
                print_summary(id, persona);
            }

            println!("{}", "Custom Personas:".bold());
            println!();
            if registry.custom().next().is_none() {
                println!("  {} No custom personas yet", "(none)".dimmed());
                println!();
                println!(
                    "  Create one with: {}",
                    "personakit persona create --name <name> --prompt <prompt>".cyan()
                );
            } else {
                for (id, persona) in registry.custom() {
                    print_summary(id, persona);
                }
            }
        }
    }

    Ok(())
}

fn print_summary(id: &str, persona: &Persona) {
    println!("  {} {} {}", persona.icon(), persona.agent_name().bold(), format!("({})", id).dimmed());
    let prompt = persona.system_prompt();
    let short = if prompt.chars().count() > 70 {
        format!("{}...", prompt.chars().take(67).collect::<String>())
    } else {
        prompt.to_string()
    };
    println!("    {}", short.dimmed());
    println!();
}

fn show(store: &PersonaStore<FileBackend>, id: &str, format: OutputFormat) -> Result<()> {
    let Some(persona) = store.get(id) else {
        eprintln!("{} Persona '{}' not found", "✗".red(), id);
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&persona)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&persona)?),
        OutputFormat::Text => {
            println!("{} {} {}", "Persona:".bold(), persona.icon(), persona.agent_name().green().bold());
            println!("{} {}", "Id:".bold(), id);
            println!(
                "{} {}",
                "Kind:".bold(),
                if persona.is_custom() { "custom".magenta() } else { "built-in".cyan() }
            );

            if let Some(custom) = persona.as_custom() {
                println!("{} {}", "Created:".bold(), custom.created_at.to_rfc3339());
                println!("{} {}", "Updated:".bold(), custom.updated_at.to_rfc3339());
            }

            println!();
            println!("{}", "System Prompt:".bold());
            for line in persona.system_prompt().lines() {
                println!("  {}", line);
            }
        }
    }

    Ok(())
}

fn create(store: &mut PersonaStore<FileBackend>, draft: PersonaDraft) -> Result<()> {
    if !draft.icon.trim().is_empty() && !AVAILABLE_ICONS.contains(&draft.icon.trim()) {
        log::warn!("Icon {} is not in the icon catalog", draft.icon);
    }

    let id = store.create(draft).context("Failed to create persona")?;

    println!("{} Created custom persona: {}", "✓".green(), id.bold());
    println!();
    println!("Next steps:");
    println!("  Run {} to switch to it", format!("personakit session select {}", id).cyan());

    Ok(())
}

fn update(store: &mut PersonaStore<FileBackend>, id: &str, patch: &PersonaPatch) -> Result<()> {
    if patch.is_empty() {
        eyre::bail!("Nothing to update: pass --name, --prompt or --icon");
    }
    if is_builtin(id) && !store.get(id).is_some_and(|p| p.is_custom()) {
        eyre::bail!("'{}' is a built-in persona and cannot be edited", id);
    }

    store
        .update(id, patch)
        .with_context(|| format!("Failed to update persona '{}'", id))?;

    println!("{} Updated custom persona: {}", "✓".green(), id.bold());
    Ok(())
}

fn delete(store: &mut PersonaStore<FileBackend>, id: &str) -> Result<()> {
    let existed = store.get(id).is_some_and(|p| p.is_custom());

    store
        .delete(id)
        .with_context(|| format!("Failed to delete persona '{}'", id))?;

    if existed {
        println!("{} Deleted custom persona: {}", "✓".green(), id.bold());
    } else {
        println!("{} No custom persona '{}', nothing to delete", "→".blue(), id);
    }
    Ok(())
}

fn icons() -> Result<()> {
    println!("{}", "Available Icons:".bold());
    println!();
    for row in AVAILABLE_ICONS.chunks(10) {
        println!("  {}", row.join("  "));
    }

    Ok(())
}
