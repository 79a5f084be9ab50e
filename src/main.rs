use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use multipage::config::Config;
use multipage::logging;
use multipage::{
    FormValues, Navigator, PageAction, PersistenceStore, SubmissionBag, SubmitOutcome,
    WizardController, WizardView,
};

#[derive(Parser)]
#[command(name = "multipage")]
#[command(about = "Drive a multi-step form wizard from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config to ./multipage.toml
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// List steps with their completion state
    Steps,

    /// Show what the wizard renders at a step
    Show {
        /// Step index taken from the current route
        #[arg(short, long, allow_negative_numbers = true)]
        step: isize,
    },

    /// Submit the page at a step
    Submit {
        /// Step index taken from the current route
        #[arg(short, long, allow_negative_numbers = true)]
        step: isize,

        /// Field assignment (field=value); values are parsed as JSON when possible
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, Value)>,

        /// Write the final values here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Go back one page
    Back {
        /// Step index taken from the current route
        #[arg(short, long, allow_negative_numbers = true)]
        step: isize,
    },

    /// Discard the persisted session
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let logging_handle = logging::init_logging(&config, cli.debug)?;

    let result = match cli.command {
        Commands::Init { force } => cmd_init(force),
        Commands::Steps => cmd_steps(&config),
        Commands::Show { step } => cmd_show(&config, step),
        Commands::Submit { step, set, output } => cmd_submit(&config, step, set, output),
        Commands::Back { step } => cmd_back(&config, step),
        Commands::Reset => cmd_reset(&config),
    };

    if let Some(log_path) = logging_handle.log_file_path {
        if log_path.metadata().is_ok_and(|m| m.len() > 0) {
            eprintln!("Session log: {}", log_path.display());
        }
    }

    result
}

/// Parse a `field=value` assignment
fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{}'", raw))?;

    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{}'", raw));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((field.to_string(), value))
}

/// Navigator for the CLI: routes are printed, there is nothing to render
fn print_navigator() -> Arc<dyn Navigator> {
    Arc::new(|url: &str| println!("-> {}", url))
}

fn build_controller(config: &Config, output: Option<PathBuf>) -> Result<WizardController> {
    let on_submit = move |values: FormValues, bag: &mut SubmissionBag| -> Result<()> {
        let json = serde_json::to_string_pretty(&values)?;
        match &output {
            Some(path) => {
                std::fs::write(path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Wrote submission to {}", path.display());
            }
            None => println!("{}", json),
        }
        bag.set_status(Some("submitted".to_string()));
        Ok(())
    };

    let controller = WizardController::new(
        config.wizard_options(),
        Arc::new(config.session_store()),
        print_navigator(),
        Arc::new(on_submit),
    )?;
    Ok(controller)
}

fn cmd_init(force: bool) -> Result<()> {
    let path = Config::local_config_path();
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    Config::default().save()?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_steps(config: &Config) -> Result<()> {
    let controller = build_controller(config, None)?;
    let registry = controller.registry();
    let valid = controller.valid_steps();
    let inactive = controller.inactive_steps();
    let allowed = registry.allowed_step(valid).map(|step| step.id.as_str());

    println!(
        "Wizard '{}' ({} steps)",
        config.wizard.session_key,
        registry.len()
    );
    println!("{}", "─".repeat(60));

    for (index, step) in registry.steps().iter().enumerate() {
        let marker = if valid.contains(&step.id) {
            "✓"
        } else if inactive.contains(&step.id) {
            "·"
        } else {
            "○"
        };
        let current = if allowed == Some(step.id.as_str()) {
            "  <- next"
        } else {
            ""
        };
        println!("{} {} {:<16} {}{}", marker, index, step.id, step.url, current);
    }

    Ok(())
}

fn cmd_show(config: &Config, step: isize) -> Result<()> {
    let controller = build_controller(config, None)?;

    match controller.resolve(step) {
        WizardView::Redirect { url } => {
            println!("Step {} is not reachable yet, redirected to {}", step, url);
        }
        WizardView::Unrecoverable { title, message } => {
            eprintln!("{}", message);
            bail!("{}", title);
        }
        WizardView::Page(page) => {
            match &page.progress {
                Some(progress) => println!(
                    "Step {}/{}: {}",
                    page.index + 1,
                    controller.total_pages(),
                    progress.current
                ),
                None => println!("Step {}/{}", page.index + 1, controller.total_pages()),
            }
            println!("{}", "─".repeat(60));
            println!("{}", serde_json::to_string_pretty(&page.values)?);
            println!("{}", "─".repeat(60));
            if page.show_back {
                println!("[Back]");
            }
            match &page.action {
                PageAction::Next { label } => println!("[{}]", label),
                PageAction::Submit { custom: true, .. } => {}
                PageAction::Submit { text, .. } => println!("[{}]", text),
            }
        }
    }

    Ok(())
}

fn cmd_submit(
    config: &Config,
    step: isize,
    assignments: Vec<(String, Value)>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut controller = build_controller(config, output)?;

    if let Some(url) = controller.determine_redirect(step) {
        bail!("Step {} is not reachable yet; continue at {}", step, url);
    }

    let mut values = controller.reconciled_values();
    let mut bag = SubmissionBag::new();
    for (field, value) in assignments {
        bag.touch(field.clone());
        values.insert(field, value);
    }

    let errors = controller.validate(&values, step);
    if !errors.is_empty() {
        for (field, message) in &errors {
            eprintln!("  {}: {}", field, message);
        }
        bail!("Step {} has {} invalid field(s)", step, errors.len());
    }

    match controller.handle_submit(values, step, &mut bag)? {
        SubmitOutcome::Advanced { to } => println!("Saved step {}, continue at {}", step, to),
        SubmitOutcome::Completed => eprintln!("Wizard complete"),
    }

    Ok(())
}

fn cmd_back(config: &Config, step: isize) -> Result<()> {
    let controller = build_controller(config, None)?;
    controller.previous(step);
    Ok(())
}

fn cmd_reset(config: &Config) -> Result<()> {
    let store = PersistenceStore::new(Arc::new(config.session_store()));
    store.clear(&config.wizard.session_key)?;
    println!("Cleared session '{}'", config.wizard.session_key);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_assignment_json_values() {
        assert_eq!(
            parse_assignment("price=12.5").unwrap(),
            ("price".to_string(), json!(12.5))
        );
        assert_eq!(
            parse_assignment("terms=true").unwrap(),
            ("terms".to_string(), json!(true))
        );
        assert_eq!(
            parse_assignment("tags=[\"a\",\"b\"]").unwrap(),
            ("tags".to_string(), json!(["a", "b"]))
        );
    }

    #[test]
    fn test_parse_assignment_falls_back_to_string() {
        assert_eq!(
            parse_assignment("title=Red bike").unwrap(),
            ("title".to_string(), json!("Red bike"))
        );
        assert_eq!(
            parse_assignment("note=a=b").unwrap(),
            ("note".to_string(), json!("a=b"))
        );
        assert_eq!(
            parse_assignment("name=").unwrap(),
            ("name".to_string(), json!(""))
        );
    }

    #[test]
    fn test_parse_assignment_rejects_malformed() {
        assert!(parse_assignment("title").is_err());
        assert!(parse_assignment("=value").is_err());
    }

    #[test]
    fn test_show_without_page_returns_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();

        let err = cmd_show(&config, 9).unwrap_err();
        assert_eq!(err.to_string(), multipage::controller::UNRECOVERABLE_TITLE);
        assert!(cmd_show(&config, 0).is_ok());
    }

    #[test]
    fn test_cli_accepts_negative_step() {
        let cli = Cli::try_parse_from(["multipage", "show", "--step", "-1"]).unwrap();
        assert!(matches!(cli.command, Commands::Show { step: -1 }));
    }

    #[test]
    fn test_cli_collects_assignments() {
        let cli = Cli::try_parse_from([
            "multipage",
            "submit",
            "--step",
            "0",
            "--set",
            "title=Bike",
            "--set",
            "price=12",
        ])
        .unwrap();

        let Commands::Submit { step, set, output } = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(step, 0);
        assert_eq!(set.len(), 2);
        assert_eq!(set[1], ("price".to_string(), json!(12)));
        assert!(output.is_none());
    }
}
