use log::{error, info};
use rankem::config::Config;
use rankem::handlers::{Reply, SessionController};
use rankem::seed::SeedData;
use rankem::session::Session;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(why) = run().await {
        error!("Session error: {}", why);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;

    let seed = match &config.seed_path {
        Some(path) => SeedData::load(path, &config.categories)?,
        None => {
            info!("No seed file configured, using the demo people");
            SeedData::demo(&config.categories)
        }
    };

    let session = Session::new(config.categories.clone(), seed, config.session_options());
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut controller = SessionController::new(session, events_tx);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("RankEm: rate people and see who tops the leaderboard. Type 'help' for commands.\n");
    if let Reply::Text(card) = controller.handle_line("show") {
        println!("{}", card);
    }

    loop {
        prompt();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed, ending session");
                    break;
                };
                match controller.handle_line(&line) {
                    Reply::Text(text) => println!("{}", text),
                    Reply::Quit => break,
                }
            }
            Some(event) = events_rx.recv() => {
                if let Some(text) = controller.handle_event(event) {
                    println!("\n{}", text);
                }
            }
        }
    }

    Ok(())
}

fn prompt() {
    print!("> ");
    std::io::stdout().flush().ok();
}
