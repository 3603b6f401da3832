//! Session orchestration: wires the components together, drives their
//! remote calls and runs the interactive loop.

use crate::ai::{DescriptionClient, DescriptionService, PortraitClient, PortraitService};
use crate::components::{
    InputCollector, PendingCall, PortraitGenerator, PromptEditor, PromptGenerator,
};
use crate::image::{slugify, ImageService};
use crate::lifecycle::Ticket;
use crate::models::{Config, GenerationParams};
use crate::render::{self, Screen};
use crate::{prompts, Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info, warn};

pub const HELP: &str = "\
Commands:
  book <title>         set the book
  character <name>     set the character
  submit               generate a character description
  edit <text>          replace the description draft
  portrait             paint portraits from the draft
  retry                repeat the request that failed
  show                 print the current state
  help                 print this message
  quit                 exit";

/// Completion of a remote call, delivered back to the session loop.
#[derive(Debug)]
pub enum AppEvent {
    DescriptionFinished {
        ticket: Ticket,
        outcome: Result<String>,
    },
    PortraitsFinished {
        ticket: Ticket,
        outcome: Result<Vec<String>>,
    },
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Book(String),
    Character(String),
    Submit,
    Edit(String),
    Portrait,
    Retry,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "book" | "b" => Ok(Command::Book(rest.to_string())),
            "character" | "c" => Ok(Command::Character(rest.to_string())),
            "submit" | "generate" => Ok(Command::Submit),
            "edit" | "e" => Ok(Command::Edit(rest.to_string())),
            "portrait" | "p" => Ok(Command::Portrait),
            "retry" | "r" => Ok(Command::Retry),
            "show" | "s" | "" => Ok(Command::Show),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(format!("Unknown command '{}'. Type `help`.", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub description: Arc<dyn DescriptionService>,
    pub portrait: Arc<dyn PortraitService>,
    pub exporter: Option<Box<dyn ImageService>>,
}

/// One portrait session: the four components plus the completion channel.
pub struct App {
    input: InputCollector,
    prompt: PromptGenerator,
    editor: PromptEditor,
    portrait: PortraitGenerator,
    exporter: Option<Box<dyn ImageService>>,
    exported: Vec<PathBuf>,
    /// Character the in-flight or latest portrait batch depicts.
    portrait_subject: Option<String>,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, params: GenerationParams, template: String) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            input: InputCollector::new(),
            prompt: PromptGenerator::new(services.description),
            editor: PromptEditor::new(),
            portrait: PortraitGenerator::new(services.portrait)
                .with_params(params)
                .with_template(template),
            exporter: services.exporter,
            exported: Vec::new(),
            portrait_subject: None,
            events_tx,
            events_rx,
        }
    }

    /// Build an app talking to the endpoints named in `config`.
    pub fn from_config(config: &Config, exporter: Option<Box<dyn ImageService>>) -> Result<Self> {
        prompts::validate_portrait_template(&config.portrait_template)?;

        // Reuse one HTTP connection pool across both clients.
        let http_client = reqwest::Client::new();

        info!("Description endpoint: {}", config.description_url);
        info!(
            "Portrait endpoint: {} (samples {}, steps {}, batch size {})",
            config.portrait_url,
            config.params.samples,
            config.params.steps,
            config.params.batch_size
        );

        let services = AppServices {
            description: Arc::new(DescriptionClient::new_with_client(
                config.description_url.clone(),
                config.request_timeout,
                http_client.clone(),
            )),
            portrait: Arc::new(PortraitClient::new_with_client(
                config.portrait_url.clone(),
                config.request_timeout,
                http_client,
            )),
            exporter,
        };

        Ok(Self::with_services(
            services,
            config.params,
            config.portrait_template.clone(),
        ))
    }

    pub fn input(&self) -> &InputCollector {
        &self.input
    }

    pub fn prompt(&self) -> &PromptGenerator {
        &self.prompt
    }

    pub fn editor(&self) -> &PromptEditor {
        &self.editor
    }

    pub fn portrait(&self) -> &PortraitGenerator {
        &self.portrait
    }

    /// Files written for the most recent portrait batch.
    pub fn exported(&self) -> &[PathBuf] {
        &self.exported
    }

    pub fn screen(&self) -> Screen {
        render::render(&self.input, &self.prompt, &self.editor, &self.portrait)
    }

    pub fn has_failed(&self) -> bool {
        self.prompt.state().is_error() || self.portrait.state().is_error()
    }

    pub fn is_busy(&self) -> bool {
        self.prompt.state().is_loading() || self.portrait.state().is_loading()
    }

    pub fn set_book(&mut self, text: &str) {
        self.input.set_book(text);
    }

    pub fn set_character(&mut self, text: &str) {
        self.input.set_character(text);
    }

    pub fn edit_draft(&mut self, text: &str) {
        self.editor.edit(text);
    }

    /// Fire the description request. `false` when nothing was sent.
    pub fn submit(&mut self) -> bool {
        let Some(input) = self.input.submit() else {
            return false;
        };
        match self.prompt.generate(input) {
            Some(pending) => {
                self.spawn(pending, |ticket, outcome| AppEvent::DescriptionFinished {
                    ticket,
                    outcome,
                });
                true
            }
            None => false,
        }
    }

    /// Fire the portrait request for the current draft. `false` when nothing
    /// was sent, including while a description is still loading.
    pub fn generate_portraits(&mut self) -> bool {
        if self.prompt.state().is_loading() {
            warn!("Portrait request ignored: description still loading");
            return false;
        }
        match self.portrait.generate(self.editor.draft()) {
            Some(pending) => {
                self.portrait_subject = self
                    .prompt
                    .last_input()
                    .map(|input| input.character.clone());
                self.spawn(pending, |ticket, outcome| AppEvent::PortraitsFinished {
                    ticket,
                    outcome,
                });
                true
            }
            None => false,
        }
    }

    /// Repeat whichever request failed, portraits first.
    pub fn retry(&mut self) -> bool {
        if self.prompt.state().is_loading() {
            warn!("Retry ignored: description still loading");
            return false;
        }
        if let Some(pending) = self.portrait.retry() {
            self.spawn(pending, |ticket, outcome| AppEvent::PortraitsFinished {
                ticket,
                outcome,
            });
            return true;
        }
        if let Some(pending) = self.prompt.retry() {
            self.spawn(pending, |ticket, outcome| AppEvent::DescriptionFinished {
                ticket,
                outcome,
            });
            return true;
        }
        false
    }

    fn spawn<T: Send + 'static>(
        &self,
        pending: PendingCall<T>,
        into_event: fn(Ticket, Result<T>) -> AppEvent,
    ) {
        let tx = self.events_tx.clone();
        let PendingCall { ticket, call } = pending;
        tokio::spawn(async move {
            let outcome = call.await;
            if tx.send(into_event(ticket, outcome)).is_err() {
                warn!("Session closed before request {} completed", ticket.id());
            }
        });
    }

    /// Route one completion to its component.
    pub async fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::DescriptionFinished { ticket, outcome } => {
                if let Some(description) = self.prompt.complete(ticket, outcome) {
                    self.editor.on_upstream_result(&description);
                    self.portrait.discard();
                }
            }
            AppEvent::PortraitsFinished { ticket, outcome } => {
                if self.portrait.complete(ticket, outcome) {
                    self.export_portraits().await;
                }
            }
        }
    }

    async fn export_portraits(&mut self) {
        self.exported.clear();
        let Some(exporter) = &self.exporter else {
            return;
        };
        let images = self.portrait.images();
        if images.is_empty() {
            return;
        }

        let base_name = slugify(self.portrait_subject.as_deref().unwrap_or_default());
        let exported = exporter.export_portraits(images, &base_name).await;
        match exported {
            Ok(paths) => self.exported = paths,
            Err(e) => error!("Failed to export portraits: {}", e),
        }
    }

    /// Wait for the next completion and apply it.
    pub async fn process_next_event(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.handle_event(event).await;
                true
            }
            None => false,
        }
    }

    /// Apply completions until no request is in flight.
    pub async fn settle(&mut self) {
        while self.is_busy() {
            if !self.process_next_event().await {
                break;
            }
        }
    }

    /// Apply one user command.
    pub fn execute(&mut self, command: Command) -> Flow {
        match command {
            Command::Book(text) => self.set_book(&text),
            Command::Character(text) => self.set_character(&text),
            Command::Submit => {
                if !self.submit() {
                    println!("Nothing sent: enter a book and a character, and wait for any running request.");
                }
            }
            Command::Edit(text) => self.edit_draft(&text),
            Command::Portrait => {
                if !self.generate_portraits() {
                    println!("Nothing sent: the draft is empty or portraits are already generating.");
                }
            }
            Command::Retry => {
                if !self.retry() {
                    println!("Nothing to retry.");
                }
            }
            Command::Show => {}
            Command::Help => println!("{}", HELP),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Non-interactive run: describe, paint with the unedited description,
    /// and return the final screen.
    pub async fn run_once(&mut self, book: &str, character: &str) -> Result<Screen> {
        self.set_book(book);
        self.set_character(character);

        if !self.submit() {
            return Err(Error::Generic(
                "both a book and a character are required".to_string(),
            ));
        }
        self.settle().await;

        if self.prompt.state().is_success() && self.generate_portraits() {
            self.settle().await;
        }

        Ok(self.screen())
    }

    /// Read commands from stdin while applying completions as they arrive.
    pub async fn run_interactive(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("{}", HELP);
        print!("{}", self.screen());

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    match line.parse::<Command>() {
                        Ok(command) => {
                            if self.execute(command) == Flow::Quit {
                                break;
                            }
                            print!("{}", self.screen());
                        }
                        Err(message) => println!("{}", message),
                    }
                }
                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event).await;
                    print!("{}", self.screen());
                    for path in &self.exported {
                        println!("  saved {}", path.display());
                    }
                }
            }
        }

        Ok(())
    }
}
