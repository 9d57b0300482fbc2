use crate::errors::SuggestError;
use crate::managers::session::{SessionSuggestions, SuggestSession};
use crate::managers::suggest::{Resolution, SuggestManager};
use crate::services::candidate_source::HttpCandidateSource;
use crate::services::config::{ConfigLayer, SuggestConfig};
use crate::services::logger::{LogLevel, Logger};
use clap::Parser;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

#[derive(Parser, Debug, Clone)]
#[command(name = "verbsuggest")]
#[command(about = "Suggest verbs from an autocomplete endpoint as you type")]
#[command(version)]
pub struct Cli {
    /// Query term; without it every stdin line is treated as the current term
    pub term: Option<String>,

    /// Origin serving the autocomplete endpoint (env: VERBSUGGEST_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Autocomplete path, resolved against the base URL
    #[arg(long)]
    pub path: Option<String>,

    /// Per-request timeout in milliseconds, 0 disables it
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// When to refetch the candidate set: session or per-query
    #[arg(long)]
    pub cache: Option<String>,

    /// Maximum number of suggestions shown, 0 shows all
    #[arg(long)]
    pub limit: Option<usize>,

    /// Emit one JSON object per term instead of plain lines
    #[arg(long)]
    pub json: bool,

    /// Look the term up exactly and print its conjugation link
    #[arg(long)]
    pub resolve: bool,

    /// Read one JSON action object per stdin line ({"action": "suggest", "term": ...})
    /// and answer each with one JSON line
    #[arg(long, conflicts_with_all = ["term", "resolve"])]
    pub actions: bool,

    /// error, warn, info or debug (env: VERBSUGGEST_LOG_LEVEL)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    fn flag_layer(&self) -> ConfigLayer {
        ConfigLayer {
            base_url: self.base_url.clone(),
            autocomplete_path: self.path.clone(),
            timeout_ms: self.timeout_ms.map(|ms| ms.to_string()),
            cache: self.cache.clone(),
            limit: self.limit.map(|n| n.to_string()),
        }
    }

    /// Flags override the environment; the merged settings are validated once.
    pub fn config(&self) -> Result<SuggestConfig, SuggestError> {
        SuggestConfig::from_layer(ConfigLayer::from_env().overlay(self.flag_layer()))
    }

    pub fn logger(&self) -> Result<Logger, SuggestError> {
        let logger = Logger::new("verbsuggest");
        match self.log_level.as_deref() {
            None => Ok(logger),
            Some(raw) => LogLevel::parse(raw)
                .map(|level| logger.with_level(level))
                .ok_or_else(|| {
                    SuggestError::invalid_config(format!("Unknown log level: {}", raw))
                        .with_hint("Use one of: error, warn, info, debug.")
                }),
        }
    }
}

fn render_suggestions(result: &SessionSuggestions, json: bool) -> Result<String, SuggestError> {
    if json {
        return serde_json::to_string(result).map_err(|err| SuggestError::internal(err.to_string()));
    }
    Ok(result.suggestions.matches.join("\n"))
}

fn render_resolution(resolution: &Resolution, json: bool) -> Result<String, SuggestError> {
    if json {
        return serde_json::to_string(resolution)
            .map_err(|err| SuggestError::internal(err.to_string()));
    }
    Ok(match resolution {
        Resolution::Found { url, .. } => url.clone(),
        Resolution::NotFound { term, did_you_mean } if did_you_mean.is_empty() => {
            format!("no verb matches {:?}", term)
        }
        Resolution::NotFound { term, did_you_mean } => format!(
            "no verb matches {:?}; did you mean: {}",
            term,
            did_you_mean.join(", ")
        ),
    })
}

async fn answer(
    session: &SuggestSession,
    term: &str,
    cli: &Cli,
) -> Result<String, SuggestError> {
    if cli.resolve {
        let resolution = session.manager().resolve(term).await?;
        return render_resolution(&resolution, cli.json);
    }
    let result = session.input(term).await;
    render_suggestions(&result, cli.json)
}

/// Plain answers in the stdin loop end with a blank line so each term's
/// block stays delimited.
async fn write_answer<W: AsyncWrite + Unpin>(
    writer: &mut W,
    text: &str,
    blank_terminated: bool,
) -> Result<(), SuggestError> {
    if !text.is_empty() {
        writer.write_all(text.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    if blank_terminated {
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    Ok(())
}

/// Malformed lines and failed actions answer `{"error": ...}` and the loop
/// keeps going.
async fn answer_action(session: &SuggestSession, line: &str) -> String {
    let reply = match serde_json::from_str::<Value>(line) {
        Ok(args) => session.manager().handle_action(args).await,
        Err(err) => Err(SuggestError::invalid_params(format!("Parse error: {}", err))),
    };
    reply
        .unwrap_or_else(|err| serde_json::json!({ "error": err }))
        .to_string()
}

/// One-shot when a term is given, otherwise one answer per input line until
/// EOF. Returns the number of answers written.
pub async fn run_with<R, W>(
    cli: &Cli,
    session: &SuggestSession,
    input: R,
    output: &mut W,
) -> Result<usize, SuggestError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let Some(term) = cli.term.as_deref() {
        let text = answer(session, term, cli).await?;
        write_answer(output, &text, false).await?;
        return Ok(1);
    }

    let mut answered = 0;
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end_matches('\r');
        if cli.actions {
            if line.trim().is_empty() {
                continue;
            }
            let text = answer_action(session, line.trim()).await;
            write_answer(output, &text, false).await?;
        } else {
            let text = answer(session, line, cli).await?;
            write_answer(output, &text, !cli.json).await?;
        }
        answered += 1;
    }
    Ok(answered)
}

pub async fn run(cli: Cli) -> Result<(), SuggestError> {
    let logger = cli.logger()?;
    let config = cli.config()?;
    let source = HttpCandidateSource::new(logger.clone(), &config)?;
    logger.debug(
        "Starting",
        Some(&serde_json::json!({
            "autocomplete_url": source.url().as_str(),
            "cache": config.cache_policy,
            "limit": config.limit,
            "actions": cli.actions,
        })),
    );
    let manager = SuggestManager::new(logger.clone(), config, Arc::new(source));
    let session = SuggestSession::new(Arc::new(manager));
    let input = BufReader::new(tokio::io::stdin());
    let mut output = BufWriter::new(tokio::io::stdout());
    match run_with(&cli, &session, input, &mut output).await {
        Ok(answered) => {
            if cli.term.is_none() {
                logger.info("Input closed", Some(&serde_json::json!({ "answered": answered })));
            }
            Ok(())
        }
        Err(err) => {
            logger.error(
                "Run failed",
                Some(&serde_json::json!({ "code": err.code, "error": err.message })),
            );
            Err(err)
        }
    }
}
