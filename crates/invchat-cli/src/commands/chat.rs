//! Default command - extract the invoice folder, then answer questions.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use invchat_core::models::config::ChatConfig;
use invchat_core::{
    Answerer, ExtractProgress, Extractor, InvoiceCollection, InvoiceRecord, list_images,
};
use invchat_model::ModelBackend;

/// Arguments for the interactive session.
#[derive(Args)]
pub struct ChatArgs {
    /// Directory containing invoice images (default: "invoices")
    #[arg(short, long)]
    dir: Option<PathBuf>,
}

pub fn run(args: ChatArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    // Pick up GOOGLE_API_KEY from a local .env file if there is one
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    let mut config = super::config::load(config_path)?;
    if let Some(dir) = args.dir {
        config.extraction.input_dir = dir;
    }

    let backend = config.model.connect()?;

    let input_dir = &config.extraction.input_dir;
    let paths = list_images(input_dir, &config.extraction.extensions)?;

    println!(
        "{} Parsing invoices from '{}'...",
        style("ℹ").blue(),
        input_dir.display()
    );

    let progress = BarProgress::new();
    let collection = Extractor::new(&backend).extract_with_progress(&paths, &progress);

    print_completion(&collection, input_dir);
    println!(
        "Ask questions like: 'How many invoices are due in the next 7 days?' or 'What is the total from Microsoft?'"
    );
    println!("Type '{}' to quit.", config.chat.exit_command);
    println!();

    let answerer = Answerer::new(&backend);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_session(&answerer, &collection, &config.chat, stdin.lock(), stdout.lock())
        .context("terminal I/O failed")?;

    Ok(())
}

fn print_completion(collection: &InvoiceCollection, input_dir: &std::path::Path) {
    println!();
    if collection.is_empty() {
        println!(
            "{} No invoice images found in '{}'.",
            style("⚠").yellow(),
            input_dir.display()
        );
    }

    let failed = collection.failed_count();
    if failed > 0 {
        println!(
            "{} Invoice parsing complete: {} invoice(s), {} could not be read.",
            style("✓").green(),
            collection.len(),
            style(failed).red()
        );
        for record in collection.iter().filter(|r| r.is_failed()) {
            println!(
                "  - {}: {}",
                record.source,
                record.error.as_deref().unwrap_or("unknown error")
            );
        }
    } else {
        println!(
            "{} Invoice parsing complete: {} invoice(s).",
            style("✓").green(),
            collection.len()
        );
    }
    println!("Starting chat.");
}

/// Read questions from `input` until the exit command or end of input.
///
/// Each answer is written to `output` after the configured label. Nothing is
/// written after the exit command. Returns the number of questions answered.
pub fn run_session<B, R, W>(
    answerer: &Answerer<B>,
    collection: &InvoiceCollection,
    chat: &ChatConfig,
    mut input: R,
    mut output: W,
) -> io::Result<usize>
where
    B: ModelBackend,
    R: BufRead,
    W: Write,
{
    let mut answered = 0;

    loop {
        write!(output, "{} ", chat.prompt_label)?;
        output.flush()?;

        let mut buf = Vec::new();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        if matches!(line, Cow::Owned(_)) {
            warn!("Input line was not valid UTF-8; invalid bytes were replaced");
        }

        let question = line.trim();
        if question.eq_ignore_ascii_case(chat.exit_command.trim()) {
            break;
        }
        if question.is_empty() {
            continue;
        }

        let answer = answerer.answer(collection, question);
        writeln!(output, "{} {}", chat.answer_label, answer)?;
        writeln!(output)?;
        answered += 1;
    }

    Ok(answered)
}

/// Drives an indicatif bar from extraction progress.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::hidden();
        let template = ProgressStyle::default_bar()
            .template("{spinner:.green} Processing images [{bar:40.cyan/blue}] {pos}/{len} {msg}");
        if let Ok(style) = template {
            bar.set_style(style.progress_chars("=>-"));
        }
        Self { bar }
    }
}

impl ExtractProgress for BarProgress {
    fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn image_done(&self, record: &InvoiceRecord) {
        if let Some(error) = &record.error {
            self.bar.println(format!(
                "{} Error processing {}: {}",
                style("✗").red(),
                record.source,
                error
            ));
        }
        self.bar.set_message(record.source.clone());
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
