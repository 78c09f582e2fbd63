use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    load_settings, ConciergeApi, ConciergeClient, DEFAULT_CONTEXT_SIZE, DEFAULT_SEARCH_LIMIT,
};
use shared::{
    domain::{MocKind, MocTarget, TagList},
    protocol::{AskResponse, MocResponse, MoveResponse, SearchFilters, SearchResponse, TagResponse},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "concierge", about = "Command-line client for the Obsidian concierge API")]
struct Args {
    /// Base URL of the concierge API, e.g. http://localhost:8000/api/v1
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    /// Settings file; defaults to concierge.toml in the working or config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print the raw JSON response instead of a summary
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the vault
    Search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
        /// Restrict results to notes carrying this tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Ask a question answered from the vault
    Ask {
        question: String,
        #[arg(long, default_value_t = DEFAULT_CONTEXT_SIZE, value_parser = clap::value_parser!(u32).range(1..=10))]
        context_size: u32,
        /// Creativity on a 0-10 scale
        #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u8).range(0..=10))]
        temperature: u8,
    },
    /// Move a file; the service picks a destination when none is given
    Move {
        source: String,
        #[arg(long)]
        destination: Option<String>,
    },
    /// Generate a map of content
    Moc {
        kind: MocKindArg,
        value: String,
        #[arg(long)]
        file_path: String,
    },
    /// Tag a file; the service suggests tags when none are given
    Tag {
        path: String,
        /// Comma-separated tags, e.g. "rust, notes"
        #[arg(long)]
        tags: Option<String>,
    },
    /// Check that the API is reachable
    Health,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MocKindArg {
    Topic,
    Folder,
    Tag,
}

impl From<MocKindArg> for MocKind {
    fn from(kind: MocKindArg) -> Self {
        match kind {
            MocKindArg::Topic => MocKind::Topic,
            MocKindArg::Folder => MocKind::Folder,
            MocKindArg::Tag => MocKind::Tag,
        }
    }
}

fn temperature_from_step(step: u8) -> f64 {
    f64::from(step) / 10.0
}

fn format_search(response: &SearchResponse) -> String {
    if response.results.is_empty() {
        return "No results found".to_string();
    }
    response
        .results
        .iter()
        .map(|hit| {
            format!(
                "{}\n  {}\n  {}\n  Relevance: {}%",
                hit.title,
                hit.path,
                hit.excerpt,
                hit.relevance_percent()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_answer(response: &AskResponse) -> String {
    let mut out = response.answer.clone();
    out.push_str("\n\nSources:");
    if response.context.is_empty() {
        out.push_str("\n  No sources found");
    }
    for source in &response.context {
        out.push_str(&format!("\n  {} ({})", source.title, source.path));
    }
    if !response.followup_questions.is_empty() {
        out.push_str("\n\nFollow-up questions:");
        for question in &response.followup_questions {
            out.push_str(&format!("\n  - {question}"));
        }
    }
    out
}

fn format_move(response: &MoveResponse) -> String {
    format!(
        "{}\nSource: {}\nDestination: {}",
        response.message, response.source, response.destination
    )
}

fn format_moc(response: &MocResponse) -> String {
    format!(
        "MOC generated and saved successfully!\nFile: {}\nIncluded files: {}",
        response.file_path, response.included_files
    )
}

fn format_tags(response: &TagResponse) -> String {
    let tags = if response.tags.is_empty() {
        "No tags were applied".to_string()
    } else {
        response.tags.join(", ")
    };
    format!("{}\nFile: {}\nTags: {tags}", response.message, response.path)
}

fn emit<T: serde::Serialize>(json: bool, response: &T, summary: impl Fn(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        println!("{}", summary(response));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings =
        load_settings(args.config.as_deref()).context("failed to load concierge settings")?;
    if let Some(api_base_url) = args.api_base_url {
        settings.api_base_url = api_base_url;
    }

    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = ConciergeClient::from_settings(&settings).context("invalid API configuration")?;
    tracing::debug!(api_base_url = client.base_url(), command = ?args.command, "running");

    match args.command {
        Command::Search { query, limit, tags } => {
            let filters = (!tags.is_empty()).then_some(SearchFilters { tags });
            let response = client
                .search(&query, limit, filters)
                .await
                .context("search failed")?;
            emit(args.json, &response, format_search)
        }
        Command::Ask {
            question,
            context_size,
            temperature,
        } => {
            let response = client
                .ask_question(&question, context_size, temperature_from_step(temperature))
                .await
                .context("question failed")?;
            emit(args.json, &response, format_answer)
        }
        Command::Move {
            source,
            destination,
        } => {
            let analyze = destination.is_none();
            let response = client
                .move_file(&source, destination.as_deref(), analyze)
                .await
                .context("move failed")?;
            emit(args.json, &response, format_move)
        }
        Command::Moc {
            kind,
            value,
            file_path,
        } => {
            let target = MocTarget::new(kind.into(), value);
            let response = client
                .generate_moc(&target, &file_path)
                .await
                .context("MOC generation failed")?;
            emit(args.json, &response, format_moc)
        }
        Command::Tag { path, tags } => {
            let tags = tags.as_deref().map(TagList::parse);
            let analyze = tags.is_none();
            let response = client
                .tag_file(&path, tags, analyze)
                .await
                .context("tagging failed")?;
            emit(args.json, &response, format_tags)
        }
        Command::Health => {
            if client.health_check().await {
                println!("API is reachable at {}", client.base_url());
                Ok(())
            } else {
                bail!(
                    "Cannot reach the API server at {}. Make sure the server is running.",
                    client.base_url()
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::{ContextSource, SearchHit};

    #[test]
    fn parses_subcommands_with_defaults() {
        let args = Args::try_parse_from(["concierge", "ask", "what now?"]).expect("args");
        match args.command {
            Command::Ask {
                context_size,
                temperature,
                ..
            } => {
                assert_eq!(context_size, 3);
                assert_eq!(temperature_from_step(temperature), 0.7);
            }
            other => panic!("unexpected command {other:?}"),
        }

        let args = Args::try_parse_from([
            "concierge",
            "--api-base-url",
            "http://vault:9000/api/v1",
            "search",
            "rust",
            "--tag",
            "a",
            "--tag",
            "b",
        ])
        .expect("args");
        assert_eq!(args.api_base_url.as_deref(), Some("http://vault:9000/api/v1"));
        match args.command {
            Command::Search { limit, tags, .. } => {
                assert_eq!(limit, 10);
                assert_eq!(tags, vec!["a", "b"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_sliders_and_missing_moc_path() {
        assert!(Args::try_parse_from(["concierge", "ask", "q", "--temperature", "11"]).is_err());
        assert!(Args::try_parse_from(["concierge", "ask", "q", "--context-size", "0"]).is_err());
        assert!(Args::try_parse_from(["concierge", "moc", "topic", "rust"]).is_err());
        assert!(Args::try_parse_from([
            "concierge",
            "moc",
            "folder",
            "projects",
            "--file-path",
            "MOC.md"
        ])
        .is_ok());
    }

    #[test]
    fn summaries_match_the_gui_wording() {
        let search = SearchResponse {
            results: vec![SearchHit {
                title: "Note".into(),
                path: "a.md".into(),
                excerpt: "text".into(),
                relevance: 0.915,
            }],
            total: None,
        };
        assert!(format_search(&search).ends_with("Relevance: 92%"));
        assert_eq!(
            format_search(&SearchResponse {
                results: Vec::new(),
                total: None
            }),
            "No results found"
        );

        let answer = AskResponse {
            answer: "Yes.".into(),
            context: vec![ContextSource {
                title: "Note".into(),
                path: "a.md".into(),
            }],
            followup_questions: Vec::new(),
            confidence: None,
        };
        assert_eq!(format_answer(&answer), "Yes.\n\nSources:\n  Note (a.md)");

        let tags = TagResponse {
            message: "Done".into(),
            path: "a.md".into(),
            tags: Vec::new(),
        };
        assert_eq!(format_tags(&tags), "Done\nFile: a.md\nTags: No tags were applied");
    }
}
