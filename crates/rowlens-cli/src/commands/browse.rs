//! `rowlens browse`: page through a table from the terminal.
//!
//! Drives the same viewer state machine as the browser viewer. Each command
//! line becomes a viewer event; events the state machine drops (a page past
//! the end, the current page again) print a note instead of fetching.

use anyhow::Result;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use rowlens_core::{Direction, FetchTicket, ViewerEvent, ViewerState};
use rowlens_runtime::TableViewer;

const HELP: &str = "\
Commands:
  n              next page (also: right)
  p              previous page (also: left)
  g <page>       go to page
  s [term]       search; without a term clears the search
  o <column>     sort by column; again to reverse
  r              reload the current page
  q              quit";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Event(ViewerEvent),
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };

    match cmd {
        "n" | "right" => Input::Event(ViewerEvent::Arrow(Direction::Next)),
        "p" | "left" => Input::Event(ViewerEvent::Arrow(Direction::Prev)),
        "g" => match rest.parse::<u64>() {
            Ok(page) => Input::Event(ViewerEvent::GotoPage(page)),
            Err(_) => Input::Unknown(line.to_string()),
        },
        "s" => Input::Event(ViewerEvent::Search(rest.to_string())),
        "o" if !rest.is_empty() => Input::Event(ViewerEvent::SortBy(rest.to_string())),
        "r" => Input::Event(ViewerEvent::Refresh),
        "q" | "quit" | "exit" => Input::Quit,
        "?" | "h" | "help" => Input::Help,
        _ => Input::Unknown(line.to_string()),
    }
}

/// Perform `ticket` and feed the outcome back into `state`.
async fn fetch(viewer: &TableViewer, table: &str, state: &mut ViewerState, ticket: FetchTicket) {
    match viewer.table_data(table, &ticket.query).await {
        Ok(page) => {
            if state.complete(ticket.seq, Ok(page.pagination)) {
                super::show::print_page(&page);
            }
        }
        Err(e) => {
            if state.complete(ticket.seq, Err(e.user_message())) {
                println!("Error: {}", e.user_message());
            }
        }
    }
}

pub async fn run(config_path: &Path, demo: bool, table: Option<String>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let viewer = super::open_viewer(&config, demo).await?;
    let table = table.unwrap_or_else(|| viewer.default_table().to_string());

    let mut state = ViewerState::new(viewer.query(None, None, None, None, None));
    println!("{} (type ? for help)", table);
    let ticket = state.begin();
    fetch(&viewer, &table, &mut state, ticket).await;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_input(&line) {
            Input::Quit => break,
            Input::Help => println!("{}", HELP),
            Input::Unknown(text) => println!("Unknown command '{}' (type ? for help)", text),
            Input::Event(event) => match state.handle(event) {
                Some(ticket) => fetch(&viewer, &table, &mut state, ticket).await,
                None => println!("Nothing to load"),
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rowlens_core::{RowlensConfig, SortOrder};
    use rowlens_runtime::demo::sample_source;
    use std::sync::Arc;

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_input("n"),
            Input::Event(ViewerEvent::Arrow(Direction::Next))
        );
        assert_eq!(
            parse_input(" left "),
            Input::Event(ViewerEvent::Arrow(Direction::Prev))
        );
        assert_eq!(parse_input("g 3"), Input::Event(ViewerEvent::GotoPage(3)));
        assert_eq!(
            parse_input("s hello world"),
            Input::Event(ViewerEvent::Search("hello world".to_string()))
        );
        assert_eq!(
            parse_input("s"),
            Input::Event(ViewerEvent::Search(String::new()))
        );
        assert_eq!(
            parse_input("o option_name"),
            Input::Event(ViewerEvent::SortBy("option_name".to_string()))
        );
        assert_eq!(parse_input("q"), Input::Quit);
        assert_eq!(parse_input("?"), Input::Help);
        assert_eq!(parse_input("g x"), Input::Unknown("g x".to_string()));
        assert_eq!(parse_input("o"), Input::Unknown("o".to_string()));
    }

    #[tokio::test]
    async fn events_walk_the_sample_options_table() {
        let viewer =
            TableViewer::new(Arc::new(sample_source("wp_")), &RowlensConfig::default()).unwrap();
        let mut state = ViewerState::new(viewer.query(None, None, None, None, None));
        let ticket = state.begin();
        fetch(&viewer, "wp_options", &mut state, ticket).await;
        assert_eq!(state.pagination().unwrap().total_pages, 3);

        let ticket = state.handle(ViewerEvent::Arrow(Direction::Prev));
        assert!(ticket.is_none());

        let ticket = state.handle(ViewerEvent::GotoPage(3)).unwrap();
        fetch(&viewer, "wp_options", &mut state, ticket).await;
        assert_eq!(state.pagination().unwrap().current_page, 3);
        assert!(state.handle(ViewerEvent::Arrow(Direction::Next)).is_none());

        let ticket = state
            .handle(ViewerEvent::SortBy("option_name".to_string()))
            .unwrap();
        assert_eq!(ticket.query.page, 1);
        assert_eq!(ticket.query.order, SortOrder::Asc);
        fetch(&viewer, "wp_options", &mut state, ticket).await;
        assert_eq!(state.query().orderby, "option_name");
    }

    #[tokio::test]
    async fn failed_fetch_leaves_the_state_errored() {
        let viewer =
            TableViewer::new(Arc::new(sample_source("wp_")), &RowlensConfig::default()).unwrap();
        let mut state = ViewerState::new(viewer.query(None, None, None, None, None));
        let ticket = state.begin();
        fetch(&viewer, "wp_missing", &mut state, ticket).await;
        assert!(state.error().is_some());
        assert!(state.pagination().is_none());
    }
}
