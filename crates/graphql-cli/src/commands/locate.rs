use crate::OutputFormat;
use anyhow::{Context, Result};
use colored::Colorize;
use graphql_config::{find_config, load_config};
use graphql_project::{GraphQLProject, LocatedNode, Position};
use std::path::{Path, PathBuf};
use std::process;

pub async fn run(
    config_path: Option<PathBuf>,
    project_name: Option<String>,
    file: PathBuf,
    position: Position,
    format: OutputFormat,
) -> Result<()> {
    let file = file
        .canonicalize()
        .with_context(|| format!("Failed to read {}", file.display()))?;

    // Find and load config, searching upwards from the file
    let config_path = if let Some(path) = config_path {
        path
    } else {
        let start_dir = file.parent().unwrap_or_else(|| Path::new("."));
        find_config(start_dir)
            .context("Failed to search for config")?
            .context("No GraphQL config file found")?
    };

    let config = load_config(&config_path).context("Failed to load config")?;

    let base_dir = config_path
        .parent()
        .context("Failed to get config directory")?
        .to_path_buf();

    let (name, project_config) = if let Some(name) = project_name.as_deref() {
        let Some(project_config) = config.get_project(name) else {
            eprintln!("{}", format!("Project '{name}' not found").red());
            process::exit(1);
        };
        (name, project_config)
    } else {
        config
            .project_for_file(&file, &base_dir)
            .context("Config defines no projects")?
    };
    tracing::debug!(project = name, "using project");

    let mut project = GraphQLProject::new(project_config.clone()).with_base_dir(&base_dir);
    if let Err(e) = project.load_schema().await {
        match format {
            OutputFormat::Human => eprintln!("{} {}", "✗ Schema error:".red(), e),
            OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": e.to_string() })),
        }
        process::exit(1);
    }

    let located = project
        .locate_in_file(&file, position)
        .with_context(|| format!("Failed to read GraphQL from {}", file.display()))?;

    match format {
        OutputFormat::Human => print_human(&file, position, located.as_ref()),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "file": file.display().to_string(),
                "position": position,
                "node": located,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn print_human(file: &Path, position: Position, located: Option<&LocatedNode>) {
    let Some(located) = located else {
        println!(
            "{} {}:{}:{}",
            "No GraphQL node at".yellow(),
            file.display(),
            position.line,
            position.character
        );
        return;
    };

    let range = located.range;
    println!(
        "{} {} {}:{}-{}:{}",
        located.kind.bold().cyan(),
        "at".dimmed(),
        range.start.line,
        range.start.character,
        range.end.line,
        range.end.character
    );

    let first_line = located.text.lines().next().unwrap_or_default();
    println!("  {}", first_line.dimmed());

    let context = &located.context;
    let rows = [
        ("parent type", &context.parent_type),
        ("type", &context.type_),
        ("field", &context.field),
        ("argument", &context.argument),
        ("input type", &context.input_type),
        ("directive", &context.directive),
        ("enum value", &context.enum_value),
    ];
    for (label, value) in rows {
        if let Some(value) = value {
            println!("  {:<12} {}", format!("{label}:").green(), value);
        }
    }
}
