/// Entry point and game loop.

mod ui;

use std::time::Duration;

use log::{error, info, warn};

use zombie_escape::config::GameConfig;
use zombie_escape::sim::level::{load_catalog, parse_level_file};
use zombie_escape::{Advance, Mode, MoveResult, Session, Status, Tier};
use ui::input::{InputState, KEYS_CONFIRM, KEYS_QUIT, KEYS_RESTART, KEYS_TIER};
use ui::renderer::Renderer;

const POLL_TIMEOUT: Duration = Duration::from_millis(250);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = GameConfig::load();
    let catalog = load_catalog(&config);
    info!("catalog '{}' with {} level(s)", catalog.name, catalog.len());

    let mut session = match Session::new(catalog, config.rules.pursuer_substeps) {
        Ok(s) => s,
        Err(e) => {
            error!("no playable level: {e}");
            return;
        }
    };

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    if config.display.fit_to_screen {
        if let Err(e) = session.set_fit(Some(renderer.screen_is_wide())) {
            warn!("could not fit level to screen: {e}");
        }
    }

    let mut message = String::new();
    if let Err(e) = choose_start(&mut session, &config, &mut message) {
        warn!("could not start requested level: {e}");
    }

    let result = game_loop(&mut session, &mut renderer, message);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Zombie Escape!");
    if let Some(n) = session.level_number() {
        println!("Reached level {} of {}", n, session.catalog().len());
    }
}

/// A level file on the command line wins over `start_tier`; otherwise the
/// campaign already sits on level 1.
fn choose_start(
    session: &mut Session,
    config: &GameConfig,
    message: &mut String,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = std::env::args().nth(1) {
        let content = std::fs::read_to_string(&path)?;
        let def = parse_level_file(&content)
            .ok_or_else(|| format!("{path} holds no playable level"))?;
        session.start_from_layout(&def.rows)?;
        *message = format!("Loaded {}", def.name);
        return Ok(());
    }
    if let Some(tier) = config.start_tier {
        if session.start_tier(tier)? {
            *message = format!("Endless mode: {tier}");
        }
    }
    Ok(())
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    mut message: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();

    loop {
        renderer.render(session, &message)?;
        kb.drain_events(POLL_TIMEOUT)?;

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }

        for dir in kb.directions() {
            let result = session.move_player(dir);
            message = describe_move(session, &result);
        }

        if kb.any_pressed(KEYS_TIER) {
            message = cycle_tier(session)?;
        } else if kb.any_pressed(KEYS_RESTART) {
            session.restart()?;
            message = "Level restarted".to_string();
        } else if kb.any_pressed(KEYS_CONFIRM) {
            match session.state().status() {
                Status::Escaped => message = advance(session)?,
                Status::Caught => {
                    session.restart()?;
                    message = "Try again".to_string();
                }
                Status::InProgress => {}
            }
        }
    }

    Ok(())
}

fn describe_move(session: &Session, result: &MoveResult) -> String {
    match result.status {
        Status::Escaped => format!(
            "Escaped in {} turns!  [Enter] next level",
            session.state().turn()
        ),
        Status::Caught => "Caught!  [Enter] retry".to_string(),
        Status::InProgress if !result.moved => "Blocked".to_string(),
        Status::InProgress => match result.trapped_count {
            Some(0) | None => String::new(),
            Some(1) => "1 zombie is stuck".to_string(),
            Some(n) => format!("{n} zombies are stuck"),
        },
    }
}

fn advance(session: &mut Session) -> Result<String, Box<dyn std::error::Error>> {
    let msg = match session.advance()? {
        Advance::Next => format!("Now playing: {}", session.level_name()),
        Advance::Completed => match session.mode() {
            Mode::Campaign => "All levels cleared!  [T] endless mode  [Q] quit".to_string(),
            _ => "No more levels  [T] endless mode  [Q] quit".to_string(),
        },
        Advance::NotEscaped => String::new(),
    };
    Ok(msg)
}

/// Step to the next tier that has levels, starting after the current one.
fn cycle_tier(session: &mut Session) -> Result<String, Box<dyn std::error::Error>> {
    let mut tier = match session.mode() {
        Mode::Endless(t) => t.cycle(),
        _ => Tier::Beginner,
    };
    for _ in 0..Tier::ALL.len() {
        if session.start_tier(tier)? {
            return Ok(format!("Endless mode: {tier}"));
        }
        tier = tier.cycle();
    }
    Ok("No tiers available".to_string())
}
