use crate::infra;
use clap::Args;
use medscore::conversation::{ChatId, ConversationService, ReplyKind};
use medscore::error::AppError;
use medscore::telemetry;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

const QUIT_COMMANDS: &[&str] = &["/quit", "/exit"];

#[derive(Args, Debug)]
pub(crate) struct ChatArgs {
    /// Conversation identifier used for the session
    #[arg(long, default_value = "console")]
    pub(crate) chat_id: String,
}

pub(crate) async fn run(args: ChatArgs, tests_path: Option<PathBuf>) -> Result<(), AppError> {
    let config = infra::load_config(tests_path)?;
    telemetry::init(&config.telemetry)?;
    let service = infra::conversation_service(&config)?;

    let chat = ChatId(args.chat_id);
    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();
    converse(&service, &chat, input, &mut output).await
}

/// Feeds each input line to the service and writes the replies until input
/// ends or a quit command arrives.
pub(crate) async fn converse<R, W>(
    service: &ConversationService,
    chat: &ChatId,
    input: R,
    output: &mut W,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let welcome = service.handle(chat, "/start");
    write_block(output, &welcome.text).await?;
    write_block(output, "Type /quit to leave.").await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if QUIT_COMMANDS.contains(&line.to_lowercase().as_str()) {
            service.cancel(chat);
            break;
        }

        let reply = service.handle(chat, line);
        write_block(output, &reply.text).await?;
        if reply.kind == ReplyKind::Completed {
            write_block(output, "---").await?;
        }
    }

    output.flush().await?;
    Ok(())
}

async fn write_block<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n\n").await
}

pub(crate) fn list_tests(tests_path: Option<PathBuf>) -> Result<(), AppError> {
    let config = infra::load_config(tests_path)?;
    let catalog = infra::load_catalog(&config)?;

    println!("Available tests ({})", catalog.len());
    for summary in catalog.summaries() {
        println!(
            "  {:<12} {} ({} questions)",
            summary.command, summary.name, summary.questions
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use medscore::catalog::TestCatalog;
    use medscore::diagnosis::{DiagnosticTest, Question};
    use std::sync::Arc;

    fn service() -> ConversationService {
        let test = DiagnosticTest::new(
            "Toy score",
            vec![
                Question::new("Fever?", "temperature", [("no", 0), ("yes", 3)]),
                Question::new("Older than 65?", "age", [("no", 0), ("yes", 5)]),
            ],
            [("0-4", "Low"), (">=5", "High")],
        )
        .with_command("/toy");
        ConversationService::new(Arc::new(TestCatalog::new(vec![test])), Duration::minutes(5))
    }

    async fn transcript(service: &ConversationService, script: &str) -> String {
        let mut output = Vec::new();
        converse(service, &ChatId::from("console"), script.as_bytes(), &mut output)
            .await
            .expect("conversation runs");
        String::from_utf8(output).expect("utf-8 transcript")
    }

    #[tokio::test]
    async fn scripted_conversation_reaches_a_result() {
        let service = service();
        let text = transcript(&service, "/toy\n2\n\n2\n").await;

        assert!(text.starts_with("Welcome"));
        assert!(text.contains("Question 1 of 2:\nFever?"));
        assert!(text.contains("Question 2 of 2:\nOlder than 65?"));
        assert!(text.contains("Total score: 8"));
        assert!(text.contains("Severity: High"));
        assert!(text.trim_end().ends_with("---"));
    }

    #[tokio::test]
    async fn quit_stops_reading_and_drops_the_session() {
        let service = service();
        let text = transcript(&service, "/toy\n/QUIT\n1\n").await;

        assert!(text.contains("Question 1 of 2"));
        assert!(!text.contains("Question 2 of 2"));
        assert!(service.registry().is_empty());
    }
}
