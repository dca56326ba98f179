//! `aide complete` — run one completion against a document.
//!
//! The document comes from `--file` or stdin. Without `--in-place` the reply
//! is printed to stdout; with it, the reply is written into the file at the
//! insertion point.

use aide_agent::{Assistant, Completion, CompletionMode, insert_at};
use aide_config::AideConfig;
use aide_core::Session;
use clap::Args;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Args)]
pub struct CompleteArgs {
    /// What to do. Omit to reuse the previous instruction.
    #[arg(short, long)]
    pub instruction: Option<String>,

    /// Read the document from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Character offset of the insertion point (default: end of document)
    #[arg(short, long, conflicts_with = "region")]
    pub point: Option<usize>,

    /// Use the characters START:END as the context; the reply goes after it
    #[arg(short, long, value_parser = parse_region)]
    pub region: Option<(usize, usize)>,

    /// Insert the reply into --file instead of printing it
    #[arg(long, requires = "file")]
    pub in_place: bool,
}

/// What happened to the reply.
#[derive(Debug, PartialEq, Eq)]
enum Delivery {
    Printed,
    Inserted { chars: usize },
    /// Nothing to insert; carries the notice for the user.
    Skipped { notice: String },
}

pub async fn run(args: CompleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Re-read on every invocation so edits apply to the next call.
    let config = AideConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let instruction =
        resolve_instruction(&AideConfig::session_path(), args.instruction.as_deref())?;

    let document = read_document(args.file.as_deref())?;
    let mode = pick_mode(args.point, args.region, &document);
    let context = mode.context(&document).to_string();

    let client = aide_providers::build_from_config(&config)?;
    let assistant = Assistant::new(client);

    let (tx, rx) = tokio::sync::oneshot::channel::<Completion>();
    eprint!("  Thinking...");
    assistant.spawn_complete(config, instruction, context, move |completion| {
        let _ = tx.send(completion);
    });
    let completion = rx.await?;
    eprint!("\r              \r");

    if let Some(warning) = &completion.memory_warning {
        eprintln!("  ⚠️  {warning}");
    }

    let target = if args.in_place { args.file.as_deref() } else { None };
    let delivery = deliver(&completion, &document, mode, target, &mut std::io::stdout().lock())?;

    match delivery {
        Delivery::Printed => {}
        Delivery::Inserted { chars } => {
            if let Some(path) = target {
                eprintln!("  Inserted {chars} characters into {}", path.display());
            }
        }
        Delivery::Skipped { notice } => {
            eprintln!("  {notice}");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Pick this call's instruction, falling back to the session's last one.
fn resolve_instruction(session_path: &Path, given: Option<&str>) -> aide_core::Result<String> {
    let mut session = Session::load(session_path)?;
    let instruction = session.resolve_instruction(given)?;
    if let Err(e) = session.save(session_path) {
        warn!(error = %e, "Could not save session");
    }
    Ok(instruction)
}

fn pick_mode(point: Option<usize>, region: Option<(usize, usize)>, document: &str) -> CompletionMode {
    match (point, region) {
        (_, Some((start, end))) => CompletionMode::Region { start, end },
        (Some(point), None) => CompletionMode::Tail { point },
        (None, None) => CompletionMode::at_end(document),
    }
}

/// Put the reply where it belongs: into `in_place` at the insertion point,
/// or onto `out`. The document file is left alone when there is no text.
fn deliver(
    completion: &Completion,
    document: &str,
    mode: CompletionMode,
    in_place: Option<&Path>,
    out: &mut impl Write,
) -> std::io::Result<Delivery> {
    let Some(text) = completion.text() else {
        return Ok(Delivery::Skipped {
            notice: completion.notice().unwrap_or_default(),
        });
    };

    match in_place {
        Some(path) => {
            let updated = insert_at(document, mode.insertion_point(document), text);
            std::fs::write(path, updated)?;
            Ok(Delivery::Inserted {
                chars: text.chars().count(),
            })
        }
        None => {
            writeln!(out, "{text}")?;
            Ok(Delivery::Printed)
        }
    }
}

fn read_document(file: Option<&Path>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn parse_region(s: &str) -> Result<(usize, usize), String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid offset {v:?}: {e}"))
    };
    Ok((parse(start)?, parse(end)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aide_agent::Outcome;
    use aide_core::error::{ChatError, Error};

    fn completion(outcome: Outcome) -> Completion {
        Completion {
            outcome,
            memory_warning: None,
        }
    }

    fn draft(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("draft.txt");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn region_parsing() {
        assert_eq!(parse_region("3:10"), Ok((3, 10)));
        assert_eq!(parse_region(" 0 : 5 "), Ok((0, 5)));
        assert!(parse_region("10").is_err());
        assert!(parse_region("a:b").is_err());
    }

    #[test]
    fn reads_document_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = draft(dir.path(), "Chapter one");
        assert_eq!(read_document(Some(&path)).unwrap(), "Chapter one");
    }

    #[test]
    fn mode_selection() {
        let doc = "abcdef";
        assert_eq!(pick_mode(None, None, doc), CompletionMode::Tail { point: 6 });
        assert_eq!(pick_mode(Some(2), None, doc), CompletionMode::Tail { point: 2 });
        assert_eq!(
            pick_mode(None, Some((1, 3)), doc),
            CompletionMode::Region { start: 1, end: 3 }
        );
    }

    // ── Instruction reuse ────────────────────────────────────────────────

    #[test]
    fn omitted_instruction_reuses_the_last_one() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session.json");

        assert_eq!(resolve_instruction(&session, Some("continue the story")).unwrap(), "continue the story");
        assert_eq!(resolve_instruction(&session, None).unwrap(), "continue the story");
        assert_eq!(resolve_instruction(&session, Some("  ")).unwrap(), "continue the story");

        assert_eq!(resolve_instruction(&session, Some("make it rhyme")).unwrap(), "make it rhyme");
        assert_eq!(resolve_instruction(&session, None).unwrap(), "make it rhyme");
    }

    #[test]
    fn first_call_needs_an_instruction() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session.json");
        assert!(matches!(resolve_instruction(&session, None), Err(Error::NoInstruction)));
        assert!(!session.exists());
    }

    // ── Delivery ─────────────────────────────────────────────────────────

    #[test]
    fn in_place_inserts_at_end_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let document = "Once upon";
        let path = draft(dir.path(), document);
        let mut out = Vec::new();

        let delivery = deliver(
            &completion(Outcome::Insert(" a time".into())),
            document,
            CompletionMode::at_end(document),
            Some(&path),
            &mut out,
        )
        .unwrap();

        assert_eq!(delivery, Delivery::Inserted { chars: 7 });
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Once upon a time");
        assert!(out.is_empty());
    }

    #[test]
    fn in_place_inserts_at_point() {
        let dir = tempfile::tempdir().unwrap();
        let document = "Hello world";
        let path = draft(dir.path(), document);

        deliver(
            &completion(Outcome::Insert(", dear".into())),
            document,
            CompletionMode::Tail { point: 5 },
            Some(&path),
            &mut Vec::new(),
        )
        .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Hello, dear world");
    }

    #[test]
    fn in_place_inserts_after_region() {
        let dir = tempfile::tempdir().unwrap();
        let document = "one two three";
        let path = draft(dir.path(), document);

        deliver(
            &completion(Outcome::Insert("!".into())),
            document,
            CompletionMode::Region { start: 4, end: 7 },
            Some(&path),
            &mut Vec::new(),
        )
        .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one two! three");
    }

    #[test]
    fn without_in_place_the_reply_is_printed() {
        let dir = tempfile::tempdir().unwrap();
        let document = "Once upon";
        let path = draft(dir.path(), document);
        let mut out = Vec::new();

        let delivery = deliver(
            &completion(Outcome::Insert(" a time".into())),
            document,
            CompletionMode::at_end(document),
            None,
            &mut out,
        )
        .unwrap();

        assert_eq!(delivery, Delivery::Printed);
        assert_eq!(String::from_utf8(out).unwrap(), " a time\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), document);
    }

    #[test]
    fn empty_reply_is_skipped_and_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let document = "Once upon";
        let path = draft(dir.path(), document);
        let mut out = Vec::new();

        let delivery = deliver(
            &completion(Outcome::Empty),
            document,
            CompletionMode::at_end(document),
            Some(&path),
            &mut out,
        )
        .unwrap();

        match delivery {
            Delivery::Skipped { notice } => assert!(notice.contains("empty")),
            other => panic!("expected skip, got {other:?}"),
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), document);
        assert!(out.is_empty());
    }

    #[test]
    fn failed_call_is_skipped_with_reason() {
        let mut out = Vec::new();
        let delivery = deliver(
            &completion(Outcome::Failed(ChatError::MissingApiKey)),
            "doc",
            CompletionMode::at_end("doc"),
            None,
            &mut out,
        )
        .unwrap();

        assert_eq!(
            delivery,
            Delivery::Skipped {
                notice: "Aide: request failed: no API key available".into()
            }
        );
        assert!(out.is_empty());
    }
}
