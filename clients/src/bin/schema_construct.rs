//! `schema-construct` — Builds SPARQL CONSTRUCT queries from JSON Schema documents.
//!
//! **Subcommands:**
//! - `construct <schema> --subject <uri>` — print the CONSTRUCT query
//! - `refs <schema>` — list every `$ref` and whether it resolves
//! - `resolve <schema> <path>` — print the subschema a pointer path denotes
//! - `check <path>` — run the conformance checks over schema files
//!
//! **Usage:**
//! ```
//! schema-construct construct person.json --subject http://example.com/alice --stop-symbol @id
//! schema-construct check schemas/ --options options.toml
//! ```
//!
//! Options files are JSON or TOML (chosen by extension) with the keys
//! `stopSymbols`, `excludedProperties`, `maxRecursion` and
//! `doNotFollowItemsRefs`. Flags given on the command line extend or override
//! the file. Logs go to stderr.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use schema_construct::{
    build_construct_query, collect_refs, resolve_schema, ConstructOptions, Schema,
};
use schema_construct_conformance::{run_all, Severity, SuiteConfig};
use tracing::{debug, Level};

/// Build SPARQL CONSTRUCT queries from JSON Schema documents.
#[derive(Parser)]
#[command(
    name = "schema-construct",
    about = "Build SPARQL CONSTRUCT queries from JSON Schema documents",
    version
)]
struct Cli {
    /// Log more (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the CONSTRUCT query for a schema.
    Construct {
        /// JSON Schema file.
        schema: PathBuf,
        /// Subject URI, written without angle brackets.
        #[arg(long)]
        subject: String,
        /// Print the three fragments as JSON instead of a full query.
        #[arg(long)]
        fragments: bool,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// List every `$ref` in a schema and whether it resolves.
    Refs {
        /// JSON Schema file.
        schema: PathBuf,
        /// Also look inside tuple-typed `items`.
        #[arg(long)]
        tuples: bool,
    },
    /// Print the subschema a pointer path denotes.
    Resolve {
        /// JSON Schema file.
        schema: PathBuf,
        /// Pointer path, e.g. `#/properties/address`.
        path: String,
    },
    /// Run the conformance checks over a schema file or directory.
    Check {
        /// Schema file or directory of `*.json` schemas.
        path: PathBuf,
        /// Subject URI used for the generated queries.
        #[arg(long, default_value = "http://example.com/subject")]
        subject: String,
        #[command(flatten)]
        options: OptionArgs,
    },
}

/// Query builder options, from an optional file plus flags.
#[derive(Args)]
struct OptionArgs {
    /// JSON or TOML options file.
    #[arg(long = "options")]
    file: Option<PathBuf>,
    /// Property name that stops expansion of nested schemas (repeatable).
    #[arg(long = "stop-symbol")]
    stop_symbols: Vec<String>,
    /// Property name to leave out entirely (repeatable).
    #[arg(long = "exclude")]
    excluded_properties: Vec<String>,
    /// Deepest nesting level to expand.
    #[arg(long)]
    max_recursion: Option<usize>,
    /// Do not expand `$ref` element schemas of arrays.
    #[arg(long)]
    no_follow_items_refs: bool,
}

impl OptionArgs {
    fn to_options(&self) -> Result<ConstructOptions> {
        let mut options = match &self.file {
            Some(path) => load_options(path)?,
            None => ConstructOptions::default(),
        };
        options.stop_symbols.extend(self.stop_symbols.iter().cloned());
        options
            .excluded_properties
            .extend(self.excluded_properties.iter().cloned());
        if let Some(max_recursion) = self.max_recursion {
            options.max_recursion = max_recursion;
        }
        if self.no_follow_items_refs {
            options.do_not_follow_items_refs = true;
        }
        debug!(?options, "query builder options");
        Ok(options)
    }
}

fn load_options(path: &Path) -> Result<ConstructOptions> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file {}", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Failed to parse {} as TOML", path.display())),
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {} as JSON", path.display())),
        _ => bail!(
            "Options file {} must have a .json or .toml extension",
            path.display()
        ),
    }
}

fn read_schema(path: &Path) -> Result<Schema> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Construct {
            schema,
            subject,
            fragments,
            options,
        } => {
            let options = options.to_options()?;
            let document = read_schema(&schema)?;
            let query = build_construct_query(&subject, &document, &options)
                .with_context(|| format!("Failed to build query for {}", schema.display()))?;
            if fragments {
                let json = serde_json::to_string_pretty(&query)
                    .context("Failed to serialize query fragments")?;
                println!("{json}");
            } else {
                print!("{query}");
            }
        }
        Command::Refs { schema, tuples } => {
            let document = read_schema(&schema)?;
            let references = collect_refs(&document, tuples);
            let mut unresolved = 0usize;
            for reference in references.keys() {
                match resolve_schema(&document, reference, &document) {
                    Ok(_) => println!("{reference}\tok"),
                    Err(err) => {
                        unresolved += 1;
                        println!("{reference}\t{err}");
                    }
                }
            }
            println!(
                "{} reference(s), {} unresolved",
                references.len(),
                unresolved
            );
            if unresolved > 0 {
                process::exit(1);
            }
        }
        Command::Resolve { schema, path } => {
            let document = read_schema(&schema)?;
            let resolved = resolve_schema(&document, &path, &document)?;
            let json = serde_json::to_string_pretty(resolved)
                .context("Failed to serialize resolved schema")?;
            println!("{json}");
        }
        Command::Check {
            path,
            subject,
            options,
        } => {
            let config = SuiteConfig {
                schemas: path,
                subject,
                options: options.to_options()?,
            };
            let report = run_all(&config)?;

            println!("Schema Construct Conformance Report");
            println!("===================================");
            println!();
            for result in &report.results {
                println!("{result}");
            }
            println!();
            println!(
                "Summary: {} passed, {} warnings, {} failed",
                report.count(Severity::Pass),
                report.count(Severity::Warning),
                report.failure_count()
            );

            if !report.all_passed() {
                eprintln!(
                    "Conformance FAILED: {} check(s) did not pass.",
                    report.failure_count()
                );
                process::exit(1);
            }
            println!("Conformance PASSED.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("schema-construct-{}-{name}", process::id()));
        fs::write(&path, content).expect("temp file writable");
        path
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn loads_toml_options() {
        let path = write_temp("options.toml", "stopSymbols = [\"@id\"]\nmaxRecursion = 7\n");
        let options = load_options(&path).expect("valid TOML options");
        assert_eq!(options.stop_symbols, ["@id"]);
        assert_eq!(options.max_recursion, 7);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn loads_json_options() {
        let path = write_temp("options.json", r#"{ "excludedProperties": ["secret"] }"#);
        let options = load_options(&path).expect("valid JSON options");
        assert_eq!(options.excluded_properties, ["secret"]);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_unknown_option_formats() {
        let path = write_temp("options.yaml", "stopSymbols: []");
        assert!(load_options(&path).is_err());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn flags_extend_the_options_file() {
        let path = write_temp("overlay.json", r#"{ "stopSymbols": ["@id"], "maxRecursion": 3 }"#);
        let args = OptionArgs {
            file: Some(path.clone()),
            stop_symbols: vec!["@type".to_owned()],
            excluded_properties: Vec::new(),
            max_recursion: Some(9),
            no_follow_items_refs: true,
        };
        let options = args.to_options().expect("options resolve");
        assert_eq!(options.stop_symbols, ["@id", "@type"]);
        assert_eq!(options.max_recursion, 9);
        assert!(options.do_not_follow_items_refs);
        let _ = fs::remove_file(path);
    }
}
