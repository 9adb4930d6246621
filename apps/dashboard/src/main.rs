use std::time::Duration;

use anyhow::Result;
use attendance::AttendanceBoard;
use clap::Parser;
use client_core::{CampClient, DEFAULT_API_URL};
use shared::{
    domain::CompanyId,
    protocol::{BoardEvent, BoardSnapshot},
    PARTICIPANT_CHANNEL,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{info, warn};

mod feed;
mod menu;
mod render;

use feed::ChannelFeed;
use menu::{commands_for, company_groups, Menu, MenuOutcome, MenuSelection};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,
    /// Pub/sub socket; defaults to the API host.
    #[arg(long)]
    channel_url: Option<String>,
    #[arg(long, default_value = PARTICIPANT_CHANNEL)]
    channel: String,
    #[arg(long, default_value_t = 2000)]
    highlight_ms: u64,
    #[arg(long, default_value_t = 3000)]
    reconnect_ms: u64,
    /// Skip the initial load from the stats endpoint.
    #[arg(long)]
    no_seed: bool,
}

fn company_ids(snapshot: &BoardSnapshot) -> Vec<CompanyId> {
    snapshot.companies.iter().map(|c| c.id).collect()
}

async fn show_selection(board: &AttendanceBoard, selection: MenuSelection) {
    match selection {
        MenuSelection::Company(id) => match board.company(id).await {
            Some(company) => print!("{}", render::render_company(&company)),
            None => println!("Compañía {id} sin participantes"),
        },
        MenuSelection::Person(name) => {
            print!("{}", render::render_person_matches(&board.companies().await, &name));
        }
        MenuSelection::Overview => print!("{}", render::render_board(&board.snapshot().await)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let board = AttendanceBoard::new(Duration::from_millis(args.highlight_ms));
    let mut events = board.subscribe();

    if !args.no_seed {
        let client = CampClient::new(args.api_url.clone());
        match client.stats().await {
            Ok(payload) => {
                if let Err(err) = board.ingest(payload).await {
                    warn!(%err, "initial stats payload rejected");
                }
            }
            Err(err) => warn!(%err, "initial stats load failed"),
        }
    }

    let channel_url = args.channel_url.as_deref().unwrap_or(&args.api_url);
    let mut feed = ChannelFeed::connect(
        channel_url,
        &args.channel,
        Duration::from_millis(args.reconnect_ms),
    )
    .await?;

    let mut menu = Menu::new(company_groups(&company_ids(&board.snapshot().await)));
    println!("{}", render::render_menu(&menu));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            payload = feed.next_payload() => {
                // Rejected batches are logged by the board and leave the view alone.
                let _ = board.ingest(payload).await;
            }
            event = events.recv() => match event {
                Ok(BoardEvent::CompaniesUpdated { snapshot, .. }) => {
                    menu.set_groups(company_groups(&company_ids(&snapshot)));
                    print!("{}", render::render_board(&snapshot));
                }
                Ok(BoardEvent::HighlightCleared) => {
                    print!("{}", render::render_board(&board.snapshot().await));
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "board events lagged"),
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    let mut close = false;
                    for input in commands_for(&line, &menu) {
                        match menu.handle(input) {
                            MenuOutcome::Stay => {}
                            MenuOutcome::Select(selection) => show_selection(&board, selection).await,
                            MenuOutcome::Close => close = true,
                        }
                    }
                    if close {
                        break;
                    }
                    println!("{}", render::render_menu(&menu));
                }
                Ok(None) => stdin_open = false,
                Err(err) => {
                    warn!(%err, "stdin read failed");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    feed.close().await;
    info!("dashboard stopped");
    Ok(())
}
