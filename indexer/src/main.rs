use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use docsearch_core::snippet::{render, MAX_FRAGMENTS};
use docsearch_core::{BuildOptions, Index, SearchRequest, Tag};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and inspect the faceted index of a .docx corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Corpus {
    /// Corpus root directory
    #[arg(long, default_value = ".")]
    data: String,
    /// Assemble files on a single thread
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

impl Corpus {
    fn build(&self) -> Result<Index> {
        let options = BuildOptions { parallel: !self.sequential, ..BuildOptions::default() };
        let (index, _report) = Index::build(&self.data, &options)?;
        Ok(index)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and report indexed, degraded and skipped files
    Build {
        #[command(flatten)]
        corpus: Corpus,
    },
    /// List every tag with its document count
    Tags {
        #[command(flatten)]
        corpus: Corpus,
        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run a query against a freshly built index
    Query {
        #[command(flatten)]
        corpus: Corpus,
        /// Tag filter as KEY=VALUE, repeatable
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<Tag>,
        /// Print highlighted body snippets
        #[arg(long, default_value_t = false)]
        snippets: bool,
        /// Free-text terms
        text: Vec<String>,
    },
}

fn parse_tag(raw: &str) -> Result<Tag> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok(Tag::new(key, value)),
        _ => bail!("expected KEY=VALUE, got {raw:?}"),
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { corpus } => build(&corpus),
        Commands::Tags { corpus, json } => tags(&corpus, json),
        Commands::Query { corpus, tags, snippets, text } => query(&corpus, tags, snippets, &text.join(" ")),
    }
}

fn build(corpus: &Corpus) -> Result<()> {
    let options = BuildOptions { parallel: !corpus.sequential, ..BuildOptions::default() };
    let (index, report) = Index::build(&corpus.data, &options)?;
    println!("indexed {} documents, {} tags", index.len(), index.tags().len());
    for (path, warning) in &report.warnings {
        println!("degraded {}: {}", path.display(), warning);
    }
    for skipped in &report.skipped {
        println!("skipped  {}: {}", skipped.path.display(), skipped.diagnostics);
    }
    Ok(())
}

fn tags(corpus: &Corpus, json: bool) -> Result<()> {
    let index = corpus.build()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&index.tags())?);
        return Ok(());
    }
    for (tag, count) in index.tag_counts() {
        println!("{count:>6}  {tag}");
    }
    Ok(())
}

fn query(corpus: &Corpus, tags: Vec<Tag>, snippets: bool, text: &str) -> Result<()> {
    let index = corpus.build()?;
    let mut request = SearchRequest::new(text, tags);
    if snippets {
        request = request.with_locations();
    }
    let hits = index.search(&request)?;
    tracing::info!(hits = hits.len(), "query complete");
    for hit in hits {
        let doc = hit.document;
        println!(
            "{:>5} {:>8.4}  {}  {}  {}",
            doc.id,
            hit.score,
            doc.reference.as_deref().unwrap_or("-"),
            doc.area_label(),
            doc.subject.as_deref().unwrap_or("")
        );
        if let Some(snippet) = render(&doc.content, &hit.locations, MAX_FRAGMENTS) {
            println!("        {snippet}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hierarchical_tag() {
        let tag = parse_tag("Sachgebiet=Tax \u{25B8} Appeals").unwrap();
        assert_eq!(tag, Tag::new("Sachgebiet", "Tax \u{25B8} Appeals"));
    }

    #[test]
    fn splits_on_first_equals_only() {
        let tag = parse_tag("Aktenzeichen=a=b").unwrap();
        assert_eq!(tag.key, "Aktenzeichen");
        assert_eq!(tag.value, "a=b");
        assert_eq!(parse_tag("Kammer=").unwrap(), Tag::new("Kammer", ""));
    }

    #[test]
    fn rejects_missing_key_or_separator() {
        assert!(parse_tag("=x").is_err());
        assert!(parse_tag("novalue").is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let tag = Tag::new("Schlagwort", "Frist");
        assert_eq!(parse_tag(&tag.to_string()).unwrap(), tag);
    }
}
