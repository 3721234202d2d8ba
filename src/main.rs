//! Sequence client CLI.
//!
//! Four flows against the game server: solo play, bot-vs-bot battle,
//! batch simulation, and multiplayer rooms over the realtime channel.
use clap::Parser;
use clap::Subcommand;
use roboseq::api::*;
use roboseq::game::*;
use roboseq::notify::*;
use roboseq::realtime::Channel;
use roboseq::realtime::Phase;
use roboseq::sync::*;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;

#[derive(Parser)]
#[command(name = "roboseq", about = "Client for the Sequence game server")]
struct Args {
    /// API base URL; falls back to API_URL, then localhost.
    #[arg(long)]
    api: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play solo against the AI.
    Play {
        #[arg(long, default_value_t = 2)]
        players: u8,
        #[arg(long, default_value = "standard")]
        board: String,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "smart")]
        ai: String,
    },
    /// Watch an unattended bot-vs-bot battle.
    Battle {
        #[arg(long, value_enum, default_value_t = Speed::Normal)]
        speed: Speed,
        #[arg(long, default_value = "standard")]
        board: String,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run a batch Monte Carlo simulation on the server.
    Simulate {
        #[arg(long, default_value_t = 100)]
        trials: u32,
    },
    /// Create or join a multiplayer room.
    Room {
        #[arg(long)]
        code: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log();
    let args = Args::parse();
    let config = args
        .api
        .map(ApiConfig::new)
        .unwrap_or_default();
    let api: Arc<dyn Api> = Arc::new(HttpApi::new(config.clone()));
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    match args.command {
        Command::Play {
            players,
            board,
            seed,
            ai,
        } => {
            play(
                api,
                notifier,
                NewSessionRequest {
                    n_players: players,
                    board_type: board,
                    seed,
                    ai_level: ai,
                },
            )
            .await
        }
        Command::Battle { speed, board, seed } => {
            battle(
                api,
                notifier,
                NewSessionRequest {
                    board_type: board,
                    seed,
                    ..Default::default()
                },
                speed,
            )
            .await
        }
        Command::Simulate { trials } => simulate(api, trials).await,
        Command::Room { code } => room(api, notifier, &config, code).await,
    }
}

/// Dual logging (terminal + file) with timestamped log files.
fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Solo loop: poll in the background, prompt the local player, and
/// advance bot turns after a beat, the way the web UI does.
async fn play(
    api: Arc<dyn Api>,
    notifier: Arc<dyn Notifier>,
    req: NewSessionRequest,
) -> anyhow::Result<()> {
    let session = api.create_session(req).await?;
    let id = session.game_id.clone();
    let slot = Arc::new(SessionSlot::default());
    slot.replace(session, Provenance::Poll);
    let _poll = PollDriver::spawn(
        Arc::clone(&api),
        Arc::clone(&slot),
        Arc::clone(&notifier),
        id.clone(),
        PollConfig::solo(),
        Arc::new(AtomicBool::new(false)),
    );
    let mut client = SessionClient::new(
        Arc::clone(&api),
        Arc::clone(&notifier),
        Arc::clone(&slot),
        0,
    );
    println!("session {}", id);
    println!("commands: select <i> | click <r> <c> | dead | sync | quit");
    render(&slot);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut beat = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                None => break,
                Some(input) => {
                    if !command(&mut client, input.trim()).await {
                        break;
                    }
                    render(&slot);
                }
            },
            _ = beat.tick() => {
                client.pump();
                let Some(session) = slot.snapshot() else { continue };
                if let Some(team) = session.winner_team {
                    println!("team {} wins in {} turns", team, session.current_turn_index);
                    break;
                }
                // Bot turns advance themselves after a 1s beat.
                if session.current_player_id != 0 {
                    match api.advance(&id, 1).await {
                        Ok(next) => {
                            slot.replace(next, Provenance::Poll);
                            render(&slot);
                        }
                        Err(e) => log::warn!("[play] bot advance failed: {}", e),
                    }
                }
            },
        }
    }
    Ok(())
}

/// One REPL command; false means quit.
async fn command(client: &mut SessionClient, input: &str) -> bool {
    let words = input.split_whitespace().collect::<Vec<_>>();
    match words.as_slice() {
        ["quit"] | ["exit"] => return false,
        ["select", i] | ["s", i] => match i.parse::<usize>() {
            Ok(index) => client.select(index),
            Err(_) => println!("usage: select <hand index>"),
        },
        ["click", r, c] | ["c", r, c] => match (r.parse::<u8>(), c.parse::<u8>()) {
            (Ok(r), Ok(c)) => client.click(Coord::new(r, c)).await,
            _ => println!("usage: click <row> <col>"),
        },
        ["dead"] => client.exchange_dead().await,
        ["sync"] => client.refresh().await,
        [] => (),
        _ => println!("commands: select <i> | click <r> <c> | dead | sync | quit"),
    }
    true
}

/// Battle loop: autoplay drives the server, we tail the move feed.
async fn battle(
    api: Arc<dyn Api>,
    notifier: Arc<dyn Notifier>,
    req: NewSessionRequest,
    speed: Speed,
) -> anyhow::Result<()> {
    let session = api.create_session(req).await?;
    let id = session.game_id.clone();
    let slot = Arc::new(SessionSlot::default());
    slot.replace(session, Provenance::Poll);
    let mut autoplay = Autoplay::new(
        Arc::clone(&api),
        Arc::clone(&slot),
        Arc::clone(&notifier),
        id.clone(),
    );
    let _poll = PollDriver::spawn(
        Arc::clone(&api),
        Arc::clone(&slot),
        Arc::clone(&notifier),
        id,
        PollConfig::battle(),
        autoplay.running_flag(),
    );
    autoplay.set_speed(speed);
    autoplay.play();
    println!("battle running at {:?} speed, ctrl-c to stop", speed);
    // The server ships a trailing log window, so the feed tracks the
    // turn of the last printed entry, not an offset into the window.
    let mut seen: Option<roboseq::TurnIndex> = None;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                autoplay.pause();
                println!("battle paused, exiting");
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(500)) => {
                let Some(session) = slot.snapshot() else { continue };
                for entry in session.log_since(seen) {
                    feed(entry);
                    seen = seen.max(entry.turn);
                }
                if let Some(team) = session.winner_team {
                    render(&slot);
                    println!("team {} wins in {} turns", team, session.current_turn_index);
                    break;
                }
                if autoplay.state() == LoopState::Stopped {
                    // Loop died on a failure; the notice already fired.
                    break;
                }
            }
        }
    }
    Ok(())
}

fn feed(entry: &MoveRecord) {
    match (entry.team, entry.target) {
        (Some(team), Some((r, c))) => {
            println!("team {} {} {} at [{}, {}]", team, entry.action, entry.card, r, c)
        }
        _ => println!("{} {}", entry.action, entry.card),
    }
}

async fn simulate(api: Arc<dyn Api>, trials: u32) -> anyhow::Result<()> {
    println!("running {} trials, this can take a while...", trials);
    // Bounded wait: a stuck server should not hang the terminal forever.
    let report = tokio::time::timeout(Duration::from_secs(600), api.simulate(trials)).await??;
    println!("games:     {}", report.games);
    println!("avg turns: {:.1}", report.avg_turns);
    let mut teams = report.win_rates.iter().collect::<Vec<_>>();
    teams.sort();
    for (team, wins) in teams {
        println!(
            "team {}:    {} wins ({:.1}%)",
            team,
            wins,
            100.0 * *wins as f64 / report.games.max(1) as f64
        );
    }
    Ok(())
}

/// Room loop: push channel replaces polling entirely.
async fn room(
    api: Arc<dyn Api>,
    notifier: Arc<dyn Notifier>,
    config: &ApiConfig,
    code: Option<String>,
) -> anyhow::Result<()> {
    let code = match code {
        Some(code) => code,
        None => {
            let code = api.create_room().await?;
            println!("room created, share this code: {}", code);
            code
        }
    };
    let slot = Arc::new(SessionSlot::default());
    let mut channel = Channel::open(
        &config.ws_url(&code),
        Arc::clone(&slot),
        Arc::clone(&notifier),
    )
    .await?;
    println!("commands: select <i> | click <r> <c> | quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut beat = tokio::time::interval(Duration::from_secs(1));
    let mut selection: Option<usize> = None;
    let mut last_turn = None;
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                None => break,
                Some(input) => match input
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .as_slice()
                {
                    ["quit"] | ["exit"] => break,
                    ["select", i] => selection = i.parse::<usize>().ok(),
                    ["click", r, c] => match (selection, r.parse::<u8>(), c.parse::<u8>()) {
                        (Some(index), Ok(r), Ok(c)) => {
                            channel.send_move(index, Coord::new(r, c));
                            selection = None;
                        }
                        (None, ..) => println!("select a card first"),
                        _ => println!("usage: click <row> <col>"),
                    },
                    _ => println!("commands: select <i> | click <r> <c> | quit"),
                },
            },
            _ = beat.tick() => {
                if channel.state().phase() == Phase::Closed {
                    break;
                }
                if channel.state().waiting() {
                    println!("waiting for players: {}/2", channel.state().player_count());
                    continue;
                }
                let Some(session) = slot.snapshot() else { continue };
                if last_turn != Some(session.current_turn_index) {
                    last_turn = Some(session.current_turn_index);
                    render(&slot);
                    match channel.state().player_id() {
                        Some(me) if session.is_turn(me) => println!("your turn"),
                        _ => println!("waiting for opponent"),
                    }
                }
                if let Some(team) = session.winner_team {
                    println!("team {} wins", team);
                    break;
                }
            },
        }
    }
    channel.close();
    Ok(())
}

/// Compact board + status dump.
fn render(slot: &SessionSlot) {
    let Some(session) = slot.snapshot() else {
        return;
    };
    for row in &session.board {
        let line = row
            .iter()
            .map(|cell| match (cell.is_corner, cell.chip_team) {
                (true, _) => " ✦  ".to_string(),
                (false, Some(0)) => if cell.is_locked { "(B) " } else { " B  " }.to_string(),
                (false, Some(_)) => if cell.is_locked { "(R) " } else { " R  " }.to_string(),
                (false, None) => format!("{:<4}", cell.label.as_deref().unwrap_or("")),
            })
            .collect::<String>();
        println!("{}", line);
    }
    println!(
        "turn {} | team {} to act | {} cards left",
        session.current_turn_index, session.current_team_id, session.cards_left
    );
    if let Some(player) = session.player(0) {
        let hand = player
            .hand
            .iter()
            .enumerate()
            .map(|(i, card)| format!("{}:{}", i, card))
            .collect::<Vec<_>>()
            .join("  ");
        println!("hand: {}", hand);
    }
}
