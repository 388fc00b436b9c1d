//! Command dispatch: load a document, drive a store, print the result.

use std::fmt;
use std::io;
use std::path::Path;

use clap::CommandFactory;
use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{load_document, load_snapshot, ApplicationError, TreeDocument, TreeStore};
use crate::cli::args::{Cli, Commands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::domain::{NodeId, Reducer, Snapshot, TreeDisplay};

/// Payload attached to nodes of CLI documents: an arbitrary TOML table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Properties(pub toml::Table);

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(|(key, value)| match value {
                toml::Value::String(text) => format!("{key}: {text}"),
                other => format!("{key}: {other}"),
            })
            .join(", ");
        write!(f, "{rendered}")
    }
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!("settings: {:?}", settings);

    match &cli.command {
        Some(Commands::Show { file }) => show(&settings, file),
        Some(Commands::Toggle { file, paths }) => toggle(&settings, file, paths),
        Some(Commands::Set {
            file,
            path,
            selected,
        }) => set(&settings, file, path, *selected),
        Some(Commands::Selected { file, toggle }) => selected(&settings, file, toggle),
        Some(Commands::Rebuild {
            file,
            items,
            toggle,
        }) => rebuild(&settings, file, items, toggle),
        Some(Commands::Config) => print_config(&settings),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "checktree", &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

/// Load a document into a store wired to the configured reconciler.
#[instrument(level = "debug", skip(settings))]
fn open_store(settings: &Settings, file: &Path) -> CliResult<TreeStore<Properties>> {
    let reconciler = settings.reconciler();
    let snapshot = load_snapshot(file, &reconciler)?;

    let mut store = TreeStore::with_reducer(snapshot, Reducer::new(reconciler));
    store.subscribe(|snapshot| {
        debug!(
            "published snapshot: {} nodes, any selected: {}",
            snapshot.len(),
            snapshot.is_any_selected()
        );
    });
    Ok(store)
}

/// Resolve a slash-separated name path; empty segments are ignored.
pub fn resolve<P>(snapshot: &Snapshot<P>, path: &str) -> Result<NodeId, ApplicationError> {
    let names: Vec<&str> = path.split('/').filter(|name| !name.is_empty()).collect();
    snapshot
        .find_by_names(&names)
        .map(|node| node.id())
        .ok_or_else(|| ApplicationError::PathNotFound(path.to_string()))
}

fn toggle_all(store: &mut TreeStore<Properties>, paths: &[String]) -> CliResult<()> {
    for path in paths {
        let target = resolve(store.snapshot(), path)?;
        store.toggle(target);
    }
    Ok(())
}

fn render(settings: &Settings, snapshot: &Snapshot<Properties>) {
    output::info(&snapshot.to_tree_string(settings.render_options()));
}

#[instrument(level = "debug", skip(settings))]
fn show(settings: &Settings, file: &Path) -> CliResult<()> {
    let store = open_store(settings, file)?;
    render(settings, store.snapshot());
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn toggle(settings: &Settings, file: &Path, paths: &[String]) -> CliResult<()> {
    let mut store = open_store(settings, file)?;
    toggle_all(&mut store, paths)?;
    render(settings, store.snapshot());
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn set(settings: &Settings, file: &Path, path: &str, selected: bool) -> CliResult<()> {
    let mut store = open_store(settings, file)?;
    let target = resolve(store.snapshot(), path)?;
    store.set_selected(target, selected);
    render(settings, store.snapshot());
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn selected(settings: &Settings, file: &Path, paths: &[String]) -> CliResult<()> {
    let mut store = open_store(settings, file)?;
    toggle_all(&mut store, paths)?;
    let snapshot = store.snapshot();

    if !snapshot.is_any_selected() {
        output::warning("nothing selected");
        return Ok(());
    }
    output::header("Sections");
    for section in snapshot.selected_sections() {
        output::detail(&format!("{} {}", section.check_state().marker(), section.name()));
    }
    output::header("Leaves");
    for leaf in snapshot.root().selected_leaves() {
        output::success_detail(leaf.name());
    }
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn rebuild(settings: &Settings, file: &Path, items: &Path, paths: &[String]) -> CliResult<()> {
    let mut store = open_store(settings, file)?;
    toggle_all(&mut store, paths)?;

    let document: TreeDocument<Properties> = load_document(items)?;
    if document.items.is_empty() {
        return Err(CliError::InvalidArgs(format!(
            "{} has no [[items]] descriptors",
            items.display()
        )));
    }
    store.rebuild(document.items);
    render(settings, store.snapshot());
    Ok(())
}

fn print_config(settings: &Settings) -> CliResult<()> {
    output::header("Effective settings");
    output::info(&settings.to_toml()?);
    Ok(())
}
