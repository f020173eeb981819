//! Reusable demo runners shared by the example binaries.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{error::ErrorKind, Parser, ValueEnum};

use crate::config::LookupConfig;
use crate::constants::store::DEFAULT_COLLECTION;
use crate::constants::view::UNKNOWN_TEAM;
use crate::errors::LookupError;
use crate::search::{EmptyQueryPolicy, MatchMode, SearchPolicy};
use crate::session::LookupSession;
use crate::stats::LookupOverview;
use crate::store::{FileRecordStore, MemoryRecordStore, RecordStore};
use crate::submit::{EntryForm, TeamPolicy};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MatchModeArg {
    KeyPrefix,
    KeyContains,
    KeyOrDefinition,
}

impl From<MatchModeArg> for MatchMode {
    fn from(value: MatchModeArg) -> Self {
        match value {
            MatchModeArg::KeyPrefix => MatchMode::KeyPrefix,
            MatchModeArg::KeyContains => MatchMode::KeyContains,
            MatchModeArg::KeyOrDefinition => MatchMode::KeyOrDefinition,
        }
    }
}

#[derive(Debug, Clone)]
struct AddArg {
    acronym: String,
    definition: String,
    team: Option<String>,
}

fn parse_add_arg(raw: &str) -> Result<AddArg, String> {
    let (acronym, rest) = raw
        .split_once('=')
        .ok_or_else(|| "--add expects ACRONYM=DEFINITION[@TEAM]".to_string())?;
    let (definition, team) = match rest.rsplit_once('@') {
        Some((definition, team)) => (definition, Some(team.to_string())),
        None => (rest, None),
    };
    Ok(AddArg {
        acronym: acronym.to_string(),
        definition: definition.to_string(),
        team,
    })
}

#[derive(Debug, Parser)]
#[command(
    name = "lookup_demo",
    disable_help_subcommand = true,
    about = "Search, add, and stats over a live-mirrored acronym store",
    long_about = "Seed an acronym store, attach a live lookup session, then run submissions, searches, and the quick-stats panel against it."
)]
struct LookupDemoCli {
    #[arg(
        long,
        value_name = "PATH",
        help = "Persist to a file-backed store instead of in-memory"
    )]
    store_path: Option<PathBuf>,
    #[arg(
        long,
        default_value = DEFAULT_COLLECTION,
        help = "Collection to mirror and write to"
    )]
    collection: String,
    #[arg(
        long = "add",
        value_name = "ACRONYM=DEFINITION[@TEAM]",
        value_parser = parse_add_arg,
        help = "Entry to submit, repeat as needed"
    )]
    adds: Vec<AddArg>,
    #[arg(
        long = "query",
        value_name = "TEXT",
        help = "Search query to run, repeat as needed"
    )]
    queries: Vec<String>,
    #[arg(
        long,
        value_enum,
        default_value_t = MatchModeArg::KeyOrDefinition,
        help = "Match predicate for searches"
    )]
    match_mode: MatchModeArg,
    #[arg(
        long,
        default_value_t = false,
        help = "Return no results for an empty query instead of the full set"
    )]
    strict_empty_query: bool,
    #[arg(long, default_value_t = false, help = "Require a team on every submission")]
    require_team: bool,
    #[arg(long, default_value_t = false, help = "Print the quick-stats panel")]
    stats: bool,
    #[arg(long, default_value_t = false, help = "Print search results as JSON")]
    json: bool,
}

/// Run the lookup demo against the provided argument list.
pub fn run_lookup_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<LookupDemoCli, _>(
        std::iter::once("lookup_demo".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let store: Arc<dyn RecordStore> = match &cli.store_path {
        Some(path) => {
            println!("Persisting records to {}", path.display());
            Arc::new(FileRecordStore::open(path.clone())?)
        }
        None => Arc::new(MemoryRecordStore::new()),
    };

    let config = LookupConfig {
        collection: cli.collection.clone(),
        search: SearchPolicy {
            mode: cli.match_mode.into(),
            empty_query: if cli.strict_empty_query {
                EmptyQueryPolicy::NoResults
            } else {
                EmptyQueryPolicy::FullSet
            },
        },
        team: if cli.require_team {
            TeamPolicy::Required
        } else {
            TeamPolicy::Optional
        },
        ..LookupConfig::default()
    };
    let session = LookupSession::attach(store, config)?;

    for add in &cli.adds {
        let form = EntryForm {
            acronym: add.acronym.clone(),
            definition: add.definition.clone(),
            team: add.team.clone(),
        };
        match session.submit(&form) {
            Ok(entry) => println!("Added \"{}\" ({})", entry.key, entry.definition),
            Err(err @ LookupError::Validation { .. }) => println!("Rejected: {err}"),
            Err(err) => return Err(err.into()),
        }
    }

    for query in &cli.queries {
        let results = session.search(query);
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
            continue;
        }
        println!("--- query \"{query}\" ---");
        if results.is_empty() {
            println!("No acronyms found.");
            continue;
        }
        for record in results {
            let team = record.team.as_deref().unwrap_or(UNKNOWN_TEAM);
            println!("{} - {} ({team})", record.key, record.definition);
        }
    }

    if cli.stats {
        print_overview(&session.overview());
    }

    Ok(())
}

fn print_overview(overview: &LookupOverview) {
    println!("--- quick stats ---");
    println!("Total acronyms: {}", overview.total);
    for entry in &overview.teams {
        println!(
            "{}: count={} share={:.2}",
            entry.team, entry.count, entry.share
        );
    }
    if overview.recent.is_empty() {
        println!("No acronyms added yet");
    } else {
        println!("Recently added:");
        for record in &overview.recent {
            let team = record.team.as_deref().unwrap_or(UNKNOWN_TEAM);
            println!("  {} - {} ({team})", record.key, record.definition);
        }
    }
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_arguments_parse_definition_and_team() {
        let plain = parse_add_arg("API=Application Programming Interface").unwrap();
        assert_eq!(plain.acronym, "API");
        assert_eq!(plain.definition, "Application Programming Interface");
        assert_eq!(plain.team, None);

        let teamed = parse_add_arg("SLA=Service Level Agreement@Support").unwrap();
        assert_eq!(teamed.team.as_deref(), Some("Support"));

        assert!(parse_add_arg("no separator").is_err());
    }

    #[test]
    fn demo_runs_end_to_end_in_memory() {
        let args = [
            "--add",
            "API=Application Programming Interface@Platform",
            "--add",
            "SLA=Service Level Agreement",
            "--query",
            "ap",
            "--stats",
        ];
        run_lookup_demo(args.iter().map(|arg| arg.to_string())).unwrap();
    }
}
