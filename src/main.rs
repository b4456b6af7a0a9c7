use clap::Parser;
use eyre::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;
use ppd::config::Config;
use ppd::directives::DirectiveRegistry;
use ppd::driver::report::RunStats;
use ppd::driver::{Driver, FileReport, Outcome};
use ppd::engine::Context;
use ppd::env::Environment;
use ppd::output::get_formatter;

fn main() -> Result<()> {
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load configuration
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Apply CLI overrides to configuration
    apply_cli_overrides(&mut config, &cli);

    // Handle special commands
    if cli.list_directives {
        return list_directives();
    }

    if cli.show_config {
        return show_config(&config);
    }

    let context = build_context(&config, &cli)?;
    let driver = Driver::new(context, config.build_filter()?);

    // Collect and transform
    let files = driver.collect_files(&cli.get_files())?;
    debug!(files = files.len(), "collected files");

    let to_stdout = !cli.check && !cli.in_place && cli.output_dir.is_none();
    if to_stdout && files.len() > 1 {
        return Err(eyre::eyre!(
            "{} files matched; use --in-place, --output-dir or --check",
            files.len()
        ));
    }

    let reports = driver.process_files_parallel(&files);

    if !cli.check {
        if let Some(output_dir) = &cli.output_dir {
            write_output_dir(&reports, output_dir, &config.working_dir()?)?;
        } else if cli.in_place {
            write_in_place(&reports)?;
        } else {
            write_stdout(&reports)?;
        }
    }

    // Format and output the report; code on stdout keeps the report on stderr
    let formatter = get_formatter(cli.format);
    let report = formatter.format_reports(&reports);
    if to_stdout {
        eprintln!("{}", report);
    } else {
        println!("{}", report);
    }

    // Exit with error code if any file failed
    if RunStats::from_reports(&reports).has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

/// Install the tracing subscriber; `PPD_LOG` overrides the default level
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("PPD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Apply CLI overrides to the configuration
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if cli.preserve_line_numbers {
        config.preserve_line_numbers = true;
    }

    let include = cli.get_include();
    if !include.is_empty() {
        config.include = include;
    }
    config.exclude.extend(cli.get_exclude());

    for (name, value) in cli.get_defines() {
        config.define.insert(name, value);
    }

    for name in cli.get_undefines() {
        config.define.remove(&name);
    }
}

/// Build the transform context; undefines are applied last so `--env` cannot bring them back
fn build_context(config: &Config, cli: &Cli) -> Result<Context> {
    let mut context = config.build_context()?;
    if cli.env {
        import_process_env(&mut context.env);
    }
    for name in cli.get_undefines() {
        context.env.remove(&name);
    }
    Ok(context)
}

/// Layer process variables under the configured symbols
fn import_process_env(env: &mut Environment) {
    let configured = std::mem::take(env);
    env.extend_from_process();
    for (name, value) in configured.iter() {
        env.set(name, value.clone());
    }
}

/// List the built-in directive families
fn list_directives() -> Result<()> {
    let registry = DirectiveRegistry::with_default_directives();

    println!("Available directives:");
    println!();

    for descriptor in registry.descriptors() {
        println!("  {}", descriptor.id());
        println!("    {}", descriptor.description());
        let keywords: Vec<String> = descriptor.keywords().iter().map(|k| format!("#{}", k)).collect();
        println!("    Keywords: {}", keywords.join(", "));
        println!();
    }

    Ok(())
}

/// Show the effective configuration
fn show_config(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;

    println!("Effective configuration:");
    println!("{}", yaml);

    Ok(())
}

/// Print the single transformed file, or the original text if it had no directives
fn write_stdout(reports: &[FileReport]) -> Result<()> {
    for report in reports {
        match &report.outcome {
            Outcome::Transformed(output) => print!("{}", output.code),
            Outcome::Unchanged => {
                let content = fs::read_to_string(&report.path)
                    .with_context(|| format!("Failed to read file {}", report.path.display()))?;
                print!("{}", content);
            }
            Outcome::Skipped | Outcome::Failed(_) | Outcome::Unreadable(_) => {}
        }
    }
    Ok(())
}

/// Rewrite transformed files; unchanged files are left alone
fn write_in_place(reports: &[FileReport]) -> Result<()> {
    for report in reports {
        if let Some(code) = report.code() {
            fs::write(&report.path, code)
                .with_context(|| format!("Failed to write file {}", report.path.display()))?;
            debug!(file = %report.path.display(), "rewrote in place");
        }
    }
    Ok(())
}

/// Mirror processed files under `output_dir`, keyed by their path relative to `cwd`
fn write_output_dir(reports: &[FileReport], output_dir: &Path, cwd: &Path) -> Result<()> {
    for report in reports {
        let destination = output_dir.join(relative_destination(&report.path, cwd));

        match &report.outcome {
            Outcome::Transformed(output) => {
                create_parent(&destination)?;
                fs::write(&destination, &output.code)
                    .with_context(|| format!("Failed to write file {}", destination.display()))?;
            }
            Outcome::Unchanged => {
                create_parent(&destination)?;
                fs::copy(&report.path, &destination)
                    .with_context(|| format!("Failed to copy file to {}", destination.display()))?;
            }
            Outcome::Skipped | Outcome::Failed(_) | Outcome::Unreadable(_) => {}
        }
    }
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Path under the output directory; absolute paths outside `cwd` keep only their non-root components
fn relative_destination(path: &Path, cwd: &Path) -> PathBuf {
    let path = path.strip_prefix(cwd).unwrap_or(path);
    path.components()
        .filter(|c| matches!(c, std::path::Component::Normal(_)))
        .collect()
}
