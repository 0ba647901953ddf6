use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use formwizard::config::{load_or_default, progress_dir, CatalogSource};
use formwizard::submission::{
    HttpSubmitter, NotificationLevel, SubmissionDispatcher, SubmissionEvent, SubmissionEvents,
    SubmissionPayload, Submitter,
};
use formwizard::validation::GatingPolicy;
use formwizard::wizard::{Navigation, QuestionView, WizardController, WizardView};
use formwizard::{FileBackend, ProgressStore, QuestionKind};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = CliArgs::parse()?;
    let mut config = load_or_default()?;
    if let Some(source) = args.catalog {
        config.wizard.catalog = source;
    }
    if let Some(endpoint) = args.endpoint {
        config.submission.endpoint = Some(endpoint);
    }
    if args.strict {
        config.wizard.gating = GatingPolicy::Strict;
    }

    let catalog = config.wizard.catalog.load()?;
    let submitter: Arc<dyn Submitter> = match &config.submission.endpoint {
        Some(endpoint) => Arc::new(HttpSubmitter::new(
            endpoint.clone(),
            config.submission.timeout(),
        )?),
        None => Arc::new(MissingEndpoint),
    };
    let (dispatcher, mut events) = SubmissionDispatcher::new(Arc::clone(&catalog), submitter)?;
    let dispatcher = Arc::new(dispatcher);

    let mut progress = ProgressStore::new(FileBackend::new(progress_dir(&config)?));
    if args.reset {
        progress.reset().context("Failed to reset saved progress")?;
    }
    let mut wizard = WizardController::resume(catalog, progress, dispatcher.clone())?
        .with_policy(config.wizard.gating);

    render(&wizard)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim() == ":quit" {
                    break;
                }
                handle_input(&mut wizard, line.trim_end());
                drain_events(&mut wizard, &mut events);
                render(&wizard)?;
            }
            Some(event) = events.recv() => {
                report(&mut wizard, &event);
                drain_events(&mut wizard, &mut events);
                render(&wizard)?;
            }
        }
    }

    // Let submissions already in flight settle before exiting.
    let grace = config.submission.timeout() + Duration::from_secs(1);
    while dispatcher.in_flight() > 0 {
        match tokio::time::timeout(grace, events.recv()).await {
            Ok(Some(event)) => report(&mut wizard, &event),
            _ => break,
        }
    }
    Ok(())
}

struct MissingEndpoint;

#[async_trait]
impl Submitter for MissingEndpoint {
    async fn submit(&self, _payload: &SubmissionPayload) -> Result<()> {
        bail!("No submission endpoint configured (set [submission].endpoint or pass --endpoint)")
    }
}

fn drain_events(wizard: &mut WizardController<FileBackend>, events: &mut SubmissionEvents) {
    while let Ok(event) = events.try_recv() {
        report(wizard, &event);
    }
}

fn report(wizard: &mut WizardController<FileBackend>, event: &SubmissionEvent) {
    let notification = &event.notification;
    let marker = match notification.level {
        NotificationLevel::Success => "✔",
        NotificationLevel::Warning => "!",
    };
    println!(
        "\n[{marker}] {}\n    {}",
        notification.title, notification.description
    );
    wizard.acknowledge(event);
}

fn render(wizard: &WizardController<FileBackend>) -> Result<()> {
    let mut out = io::stdout().lock();
    match wizard.view() {
        WizardView::Welcome => {
            writeln!(out, "\nWelcome! This form takes a few minutes.")?;
            writeln!(out, "Your progress is saved as you go.")?;
            write!(out, "Press Enter to begin > ")?;
        }
        WizardView::Question(view) => render_question(&mut out, &view)?,
        WizardView::Complete if wizard.submission_pending() => {
            writeln!(out, "\nThank you! Sending your responses...")?;
            write!(out, ":quit to exit > ")?;
        }
        WizardView::Complete => {
            writeln!(out, "\nThank you! Your responses have been recorded.")?;
            write!(out, "Press Enter to submit again and start over, or :quit > ")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn render_question(out: &mut impl Write, view: &QuestionView<'_>) -> Result<()> {
    let question = view.question;
    let marker = if question.required { " *" } else { "" };
    writeln!(
        out,
        "\n[{}/{}] {}{}",
        view.number, view.total, question.title, marker
    )?;
    if let Some(subtitle) = &question.subtitle {
        writeln!(out, "    {subtitle}")?;
    }
    if question.kind == QuestionKind::SingleSelect {
        for (index, option) in question.options.iter().enumerate() {
            let letter = option_letter(index);
            let mark = if view.value == option.as_str() { "●" } else { " " };
            writeln!(out, "  {mark} {letter}) {option}")?;
        }
    } else if !view.value.is_empty() {
        writeln!(out, "    current answer: {}", view.value)?;
    } else if let Some(placeholder) = &question.placeholder {
        writeln!(out, "    ({placeholder})")?;
    }
    if let Some(error) = &view.error {
        writeln!(out, "    ! {error}")?;
    }
    let back = if view.is_first { "" } else { ", :back" };
    let action = if view.is_last { "submit" } else { "continue" };
    write!(out, "Answer (Enter to {action}{back}) > ")?;
    Ok(())
}

/// Owned snapshot of the screen an input line applies to.
enum Screen {
    Welcome,
    Complete,
    Question {
        id: String,
        options: Option<Vec<String>>,
    },
}

fn handle_input(wizard: &mut WizardController<FileBackend>, input: &str) {
    let screen = match wizard.view() {
        WizardView::Welcome => Screen::Welcome,
        WizardView::Complete => Screen::Complete,
        WizardView::Question(view) => Screen::Question {
            id: view.question.id.clone(),
            options: (view.question.kind == QuestionKind::SingleSelect)
                .then(|| view.question.options.clone()),
        },
    };
    let result = match screen {
        Screen::Welcome => wizard.start(),
        Screen::Complete if wizard.submission_pending() => {
            println!("    ! Still sending your responses, please wait.");
            return;
        }
        Screen::Complete if !input.trim().is_empty() => {
            println!("    ! Press Enter to start over, or :quit to exit.");
            return;
        }
        Screen::Complete => wizard.restart(),
        Screen::Question { id, options } => match (input.trim(), options) {
            (":back", _) => wizard.previous(),
            (":clear", _) => wizard.set_answer(&id, ""),
            ("", _) => wizard.next(),
            (text, Some(options)) => match parse_choice(&options, text) {
                Ok(option) => wizard.set_answer(&id, &option),
                Err(err) => {
                    println!("    ! {err}");
                    return;
                }
            },
            (text, None) => match wizard.set_answer(&id, text) {
                Ok(_) => wizard.next(),
                Err(err) => Err(err),
            },
        },
    };
    match result {
        Ok(Navigation::Blocked { message, .. }) => println!("    ! {message}"),
        Ok(_) => {}
        Err(err) => println!("    ! {err}"),
    }
}

fn option_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// Accepts an option letter, a 1-based number or the option text itself.
fn parse_choice(options: &[String], input: &str) -> Result<String> {
    let input = input.trim();
    if let Some(option) = options.iter().find(|o| o.eq_ignore_ascii_case(input)) {
        return Ok(option.clone());
    }
    let index = if let Ok(number) = input.parse::<usize>() {
        number.checked_sub(1)
    } else {
        let mut chars = input.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => {
                Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
            }
            _ => None,
        }
    };
    index
        .and_then(|i| options.get(i).cloned())
        .ok_or_else(|| anyhow!("'{input}' is not one of the listed options"))
}

struct CliArgs {
    catalog: Option<CatalogSource>,
    endpoint: Option<String>,
    strict: bool,
    reset: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = std::env::args().skip(1);
        let mut parsed = Self {
            catalog: None,
            endpoint: None,
            strict: false,
            reset: false,
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--catalog" => {
                    let value = args
                        .next()
                        .context("Expected feedback, application or a file path after --catalog")?;
                    parsed.catalog = Some(CatalogSource::parse_arg(&value));
                }
                "--endpoint" => {
                    let value = args.next().context("Expected a URL after --endpoint")?;
                    parsed.endpoint = Some(value);
                }
                "--strict" => parsed.strict = true,
                "--reset" => parsed.reset = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other => {
                    return Err(anyhow!(
                        "Unknown argument '{other}'. Run with --help for usage instructions."
                    ));
                }
            }
        }
        Ok(parsed)
    }
}

fn print_usage() {
    println!("formwizard: answer a form one question at a time");
    println!();
    println!("Usage: formwizard [--catalog feedback|application|PATH] [--endpoint URL] [--strict] [--reset]");
    println!();
    println!("  --catalog   built-in catalog name or a YAML/JSON catalog file");
    println!("  --endpoint  URL receiving the JSON submission (overrides config.toml)");
    println!("  --strict    block navigation on any validation error, not only blank required fields");
    println!("  --reset     discard saved progress before starting");
    println!();
    println!("While answering: Enter continues, :back goes back, :clear empties the answer, :quit exits.");
}
