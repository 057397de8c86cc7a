use std::path::PathBuf;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::Value;
use tracing::debug;

use mit_ingest::{embedded, FolderSource, LoadStats, Loader, TemplateTable};
use mit_store::{Document, InMemoryIndex, IndexStore};

use crate::cli::*;
use crate::config::CliConfig;

struct Session {
    format: OutputFormat,
    source: Option<PathBuf>,
    templates: Option<TemplateTable>,
}

impl Session {
    fn templates(&self) -> &TemplateTable {
        self.templates.as_ref().unwrap_or_else(|| embedded())
    }

    fn open(&self, args: &SourceArgs) -> anyhow::Result<(InMemoryIndex, LoadStats)> {
        let Some(dir) = args.source.as_ref().or(self.source.as_ref()) else {
            bail!("no export directory: pass --source or set `source` in the config");
        };
        let src = FolderSource::new(dir);
        let index = InMemoryIndex::new();
        let mut loader = Loader::new(&index, self.templates());
        let loaded = if args.documents {
            loader.ingest_documents(&src)
        } else {
            loader.ingest_source(&src)
        };
        loaded.with_context(|| format!("cannot load {}", dir.display()))?;
        let stats = loader.finish();
        debug!(
            source = %dir.display(),
            entries = stats.entries,
            records = stats.records,
            "export loaded"
        );
        Ok((index, stats))
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let templates = match cli.templates.as_ref().or(config.templates.as_ref()) {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read templates {}", path.display()))?;
            Some(
                TemplateTable::from_json(&text)
                    .with_context(|| format!("invalid templates {}", path.display()))?,
            )
        }
        None => None,
    };
    let session = Session {
        format: cli.format.or(config.format).unwrap_or(OutputFormat::Text),
        source: config.source,
        templates,
    };

    match cli.command {
        Command::Load(args) => cmd_load(&session, args),
        Command::Get(args) => cmd_get(&session, args),
        Command::Find(args) => cmd_find(&session, args),
        Command::Classes(args) => cmd_classes(&session, args),
    }
}

fn cmd_load(session: &Session, args: LoadArgs) -> anyhow::Result<()> {
    let (index, stats) = session.open(&args.source)?;
    match session.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => {
            println!(
                "{} Loaded {} records ({} keys) from {} entries",
                "✓".green().bold(),
                stats.records.to_string().bold(),
                index.len(),
                stats.entries
            );
            let shapes = [
                ("line-delimited", stats.line_delimited),
                ("summary-count", stats.summary_count),
                ("flat-array", stats.flat_array),
                ("tree", stats.tree),
                ("empty", stats.empty),
            ];
            for (shape, count) in shapes.into_iter().filter(|(_, n)| *n > 0) {
                println!("  {:<16} {}", shape.cyan(), count);
            }
        }
    }
    Ok(())
}

fn cmd_get(session: &Session, args: GetArgs) -> anyhow::Result<()> {
    let (index, _) = session.open(&args.source)?;
    let doc = index.get(&args.key)?;
    print_documents(session.format, std::slice::from_ref(&doc))
}

fn cmd_find(session: &Session, args: FindArgs) -> anyhow::Result<()> {
    let (index, _) = session.open(&args.source)?;
    let docs = if args.one {
        index.find_one(&args.pattern)?.into_iter().collect()
    } else {
        index.find(&args.pattern)?
    };
    if docs.is_empty() && session.format == OutputFormat::Text {
        eprintln!("No records match {}.", args.pattern.yellow());
        return Ok(());
    }
    print_documents(session.format, &docs)
}

fn cmd_classes(session: &Session, args: ClassesArgs) -> anyhow::Result<()> {
    let (index, _) = session.open(&args.source)?;
    let counts = index.classes()?;
    match session.format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, Value> = counts
                .into_iter()
                .map(|(class, count)| (class, Value::from(count)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        OutputFormat::Text => {
            for (class, count) in counts {
                println!("{:<32} {}", class.yellow(), count);
            }
        }
    }
    Ok(())
}

fn print_documents(format: OutputFormat, docs: &[Document]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for doc in docs {
                println!("{doc}");
            }
        }
        OutputFormat::Json => {
            let values = docs
                .iter()
                .map(Document::value)
                .collect::<Result<Vec<_>, _>>()?;
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
    }
    Ok(())
}
