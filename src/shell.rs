// FILE: src/shell.rs
//! Terminal front end for the three views.
//!
//! Reads one command per line, forwards it to the `Session`, and renders the
//! active view. Pending confirmations are answered with a yes/no prompt
//! before the next command is read.

use std::path::PathBuf;
use anyhow::anyhow;
use tokio::sync::watch;
use crate::engine::{format_file_size, SortKey};
use crate::engine::query::{parse_category_filter, parse_type_filter};
use crate::error::{DocError, Result};
use crate::gateway::FilePicker;
use crate::session::{Notice, OpenOutcome, Session};
use crate::state::View;

const HELP: &str = "\
Views:      view add | view inventory | view search
Add:        browse | submit <title> | drop <path>... | pick
Inventory:  list | category <name|all> | type <name|all> | types | sort <date|size|title>-<asc|desc> | clear
Search:     search <term>
Entries:    open <n> | reveal <n> | delete <n>
Other:      help | quit";

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    View(View),
    Browse,
    Submit(String),
    Drop(Vec<PathBuf>),
    Pick,
    List,
    Category(String),
    Type(String),
    Types,
    Sort(String),
    Clear,
    Search(String),
    Open(usize),
    Reveal(usize),
    Delete(usize),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let index = |what: &str| -> std::result::Result<usize, String> {
        rest.parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("usage: {} <n>  (n from the last listing)", what))
    };
    let argument = |what: &str| -> std::result::Result<String, String> {
        if rest.is_empty() { Err(format!("usage: {} <value>", what)) } else { Ok(rest.to_string()) }
    };

    match verb {
        "view" => rest.parse::<View>().map(Command::View),
        "browse" => Ok(Command::Browse),
        "submit" => Ok(Command::Submit(rest.to_string())),
        "drop" => {
            let paths: Vec<PathBuf> = split_args(rest).into_iter().map(PathBuf::from).collect();
            if paths.is_empty() { Err("usage: drop <path>...".to_string()) } else { Ok(Command::Drop(paths)) }
        }
        "pick" => Ok(Command::Pick),
        "list" => Ok(Command::List),
        "category" => argument("category").map(Command::Category),
        "type" => argument("type").map(Command::Type),
        "types" => Ok(Command::Types),
        "sort" => argument("sort").map(Command::Sort),
        "clear" => Ok(Command::Clear),
        "search" => Ok(Command::Search(rest.to_string())),
        "open" => index("open").map(Command::Open),
        "reveal" => index("reveal").map(Command::Reveal),
        "delete" => index("delete").map(Command::Delete),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}', try 'help'", other)),
    }
}

/// Whitespace split that keeps double-quoted segments together.
fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in input.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

/// Picker that asks for paths on the terminal. Empty input cancels.
pub struct PromptPicker;

impl PromptPicker {
    fn ask(prompt: &str) -> Option<String> {
        let answer: String = dialoguer::Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .ok()?;
        let answer = answer.trim().trim_matches('"').to_string();
        if answer.is_empty() { None } else { Some(answer) }
    }
}

impl FilePicker for PromptPicker {
    fn pick_file(&self) -> Option<PathBuf> {
        Self::ask("File path (empty to cancel)").map(PathBuf::from)
    }

    fn pick_many(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        while let Some(path) = Self::ask("File or folder path (empty to finish)") {
            paths.push(PathBuf::from(path));
        }
        paths
    }
}

pub struct Shell {
    session: Session,
    revision: watch::Receiver<u64>,
    /// Ids in the order of the last rendered listing, for `open <n>` etc.
    shown: Vec<String>,
}

impl Shell {
    pub fn new(session: Session) -> Self {
        let revision = session.registry().subscribe();
        Self { session, revision, shown: Vec::new() }
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("{}", HELP);
        self.render_header();

        loop {
            let line = match read_line(self.session.state().view).await? {
                Some(line) => line,
                None => break,
            };
            if line.trim().is_empty() {
                continue;
            }

            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(usage) => {
                    println!("{}", usage);
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }

            if let Err(e) = self.execute(command).await {
                show_notice(&Notice::Error(e.to_string()));
            }
            self.settle_confirmation().await?;

            // Listing views follow registry changes, like a live window would.
            if self.revision.has_changed().unwrap_or(false) {
                self.revision.borrow_and_update();
                if self.session.state().view.lists_documents() {
                    self.render_listing();
                }
            }
        }

        tracing::info!("Shell closed");
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::View(view) => {
                self.session.show(view);
                self.render_header();
                if view == View::Inventory {
                    self.render_listing();
                }
            }
            Command::Browse => {
                match self.session.browse().await? {
                    Some(file) => println!("Selected: {}", file.name),
                    None => println!("No file chosen..."),
                }
            }
            Command::Submit(title) => {
                let notice = self.session.submit(&title)?;
                show_notice(&notice);
            }
            Command::Drop(paths) => {
                if let Some(notice) = self.session.drop_paths(paths).await? {
                    show_notice(&notice);
                }
            }
            Command::Pick => {
                if let Some(notice) = self.session.pick_and_add().await? {
                    show_notice(&notice);
                }
            }
            Command::List => self.render_listing(),
            Command::Category(name) => {
                let category = parse_category_filter(&name).map_err(DocError::Validation)?;
                self.session.set_category(category);
                self.render_listing();
            }
            Command::Type(name) => {
                self.session.set_type(parse_type_filter(&name));
                self.render_listing();
            }
            Command::Types => {
                let types = self.session.registry().types();
                println!("all {}", types.join(" "));
            }
            Command::Sort(key) => {
                self.session.set_sort(SortKey::parse(&key));
                self.render_listing();
            }
            Command::Clear => {
                self.session.request_clear();
            }
            Command::Search(term) => {
                if self.session.state().view != View::Search {
                    self.session.show(View::Search);
                    self.render_header();
                }
                // A line arrives whole, so there is no keystroke burst to wait out.
                self.session.search_submit(&term);
                self.render_listing();
            }
            Command::Open(n) => {
                let id = self.id_at(n)?;
                match self.session.open(&id).await? {
                    OpenOutcome::Opened => {}
                    OpenOutcome::Unknown => {
                        show_notice(&Notice::Error("That entry no longer exists. List again to refresh.".to_string()));
                    }
                    OpenOutcome::Failed(message) | OpenOutcome::Missing(message) => {
                        show_notice(&Notice::Error(message));
                    }
                }
            }
            Command::Reveal(n) => {
                let id = self.id_at(n)?;
                if let Some(notice) = self.session.reveal(&id).await? {
                    show_notice(&notice);
                }
            }
            Command::Delete(n) => {
                let id = self.id_at(n)?;
                self.session.request_delete(&id);
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
        Ok(())
    }

    async fn settle_confirmation(&mut self) -> Result<()> {
        let Some(prompt) = self.session.pending().map(|c| c.prompt()) else {
            return Ok(());
        };

        let accepted = tokio::task::spawn_blocking(move || {
            dialoguer::Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
        })
        .await
        .map_err(|e| anyhow!("prompt task failed: {}", e))?
        .map_err(|e| anyhow!("Input error: {}", e))?;

        if let Some(notice) = self.session.respond(accepted)? {
            show_notice(&notice);
        }
        Ok(())
    }

    fn id_at(&self, n: usize) -> Result<String> {
        self.shown
            .get(n - 1)
            .cloned()
            .ok_or_else(|| DocError::validation(format!("No entry #{} in the last listing", n)))
    }

    fn render_header(&self) {
        let view = self.session.state().view;
        println!();
        println!("== {} ==", view.title());
        println!("{}", view.description());
    }

    fn render_listing(&mut self) {
        let state = self.session.state();
        let totals = self.session.summary();
        let listing = self.session.listing();

        println!();
        println!(
            "{} documents, {} total  [category: {}, type: {}, sort: {}, search: {:?}]",
            totals.count,
            format_file_size(totals.total_size),
            state.category.map(|c| c.as_str()).unwrap_or("all"),
            state.doc_type.as_deref().unwrap_or("all"),
            state.sort,
            state.search.term(),
        );

        if listing.is_empty() {
            println!("  {}", Session::empty_listing_text());
        }
        for (i, doc) in listing.iter().enumerate() {
            println!("{:>4}. [.{}] {}", i + 1, if doc.extension.is_empty() { "???" } else { doc.extension.as_str() }, doc.title);
            println!("       {}", doc.path);
            println!(
                "       Size: {}  Added: {}  Type: {}",
                format_file_size(doc.size),
                doc.added_date.with_timezone(&chrono::Local).format("%Y-%m-%d"),
                doc.doc_type,
            );
        }

        self.shown = listing.iter().map(|d| d.id.clone()).collect();
    }
}

async fn read_line(view: View) -> Result<Option<String>> {
    let prompt = format!("doctrack:{}", view);
    let line = tokio::task::spawn_blocking(move || {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    })
    .await
    .map_err(|e| anyhow!("input task failed: {}", e))?;

    match line {
        Ok(line) => Ok(Some(line)),
        Err(e) => {
            tracing::debug!("Input closed: {}", e);
            Ok(None)
        }
    }
}

fn show_notice(notice: &Notice) {
    match notice {
        Notice::Success(message) => println!("✓ {}", message),
        Notice::Error(message) => println!("Error: {}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("view inventory"), Ok(Command::View(View::Inventory)));
        assert_eq!(parse_command("  submit  Quarterly report "), Ok(Command::Submit("Quarterly report".into())));
        assert_eq!(parse_command("search"), Ok(Command::Search(String::new())));
        assert_eq!(parse_command("sort size-desc"), Ok(Command::Sort("size-desc".into())));
        assert_eq!(parse_command("open 2"), Ok(Command::Open(2)));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_command("open 0").is_err());
        assert!(parse_command("delete x").is_err());
        assert!(parse_command("category").is_err());
        assert!(parse_command("drop").is_err());
        assert!(parse_command("view settings").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn test_drop_keeps_quoted_paths_together() {
        assert_eq!(
            parse_command(r#"drop /a/b.txt "/my docs/c.pdf"  /d"#),
            Ok(Command::Drop(vec![
                PathBuf::from("/a/b.txt"),
                PathBuf::from("/my docs/c.pdf"),
                PathBuf::from("/d"),
            ]))
        );
    }
}
