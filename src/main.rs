/// Entry point and game loop.
///
/// One frame:
///   input → resize → meta keys / clicks → session.tick → sounds → render → sleep
///
/// Logging goes to the file named in config (`general.log_file`), never to
/// the terminal, since the alternate screen owns stdout/stderr.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::time::Instant;

use crossterm::event::KeyCode;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use config::GameConfig;
use error::GameResult;
use sim::event::RoundEvent;
use sim::round::{Outcome, Phase, RoundMachine};
use sim::session::Session;
use ui::focus::FocusRing;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::presenter::TerminalPresenter;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

fn main() {
    let (config, warnings) = GameConfig::load();
    init_logging(&config);
    for w in &warnings {
        warn!("{w}");
    }

    let presenter = TerminalPresenter::new(config.general.default_count);
    let machine = match config.general.seed {
        Some(seed) => {
            info!("using fixed seed {seed}");
            RoundMachine::with_rng(
                presenter,
                config.layout_settings(),
                config.item_size(),
                StdRng::seed_from_u64(seed),
            )
        }
        None => RoundMachine::new(presenter, config.layout_settings(), config.item_size()),
    };
    let mut session = Session::new(machine, config.session_timing());

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game loop stopped: {e}");
        eprintln!("Game error: {e}");
    }
}

fn init_logging(config: &GameConfig) {
    let path = &config.general.log_file;
    if path.is_empty() {
        return;
    }
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {path}: {e}");
            return;
        }
    };
    if let Err(e) = env_logger::Builder::new()
        .parse_filters(&config.general.log_level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
    {
        eprintln!("Warning: logger init failed: {e}");
    }
}

fn game_loop(
    session: &mut Session<TerminalPresenter>,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> GameResult<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut focus = FocusRing::new();
    let frame = config.frame_duration();

    info!("ready; playfield {:?}", renderer.playfield().size);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || gp.cancel_pressed() {
            break;
        }

        if renderer.sync_size()? || kb.resized() {
            let field = renderer.playfield();
            if session.on_resize(&field) {
                info!("resized to {:?}", field.size);
            }
        }

        let now = Instant::now();
        if handle_meta(session, &mut focus, &kb, &gp, renderer, now) {
            break;
        }

        session.tick(now, &renderer.playfield())?;

        let events = session.drain_events();
        if events.iter().any(|e| matches!(e, RoundEvent::RoundStarted { .. })) {
            focus.clear();
        }
        process_sound_events(sound, &events, session.machine().round_size());

        renderer.render(session, focus.focused())?;
        std::thread::sleep(frame);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[RoundEvent], round_size: usize) {
    let Some(sfx) = sound else { return };
    for ev in events {
        match *ev {
            RoundEvent::RoundStarted { .. } => sfx.play_memorize(),
            RoundEvent::ScrambleStep { step, .. } => sfx.play_shuffle(step, round_size as u32),
            RoundEvent::ItemRevealed { id } => sfx.play_reveal(id, round_size),
            RoundEvent::Mistake { .. } => sfx.play_mistake(),
            RoundEvent::RoundEnded { outcome: Outcome::Success } => sfx.play_success(),
            RoundEvent::RoundEnded { outcome: Outcome::Failure } | RoundEvent::PlayStarted => {}
        }
    }
}

/// Keys, gamepad buttons and clicks. Returns true to quit.
fn handle_meta(
    session: &mut Session<TerminalPresenter>,
    focus: &mut FocusRing,
    kb: &InputState,
    gp: &GamepadState,
    renderer: &Renderer,
    now: Instant,
) -> bool {
    if kb.any_pressed(&[KeyCode::Esc]) {
        return true;
    }

    let field = renderer.playfield();

    // ── Setup / Ended: count field and Go ──
    if session.go_enabled() {
        for c in kb.typed_chars() {
            match c {
                'q' | 'Q' => return true,
                ' ' => {}
                c => session.gateway_mut().push_char(c),
            }
        }
        if kb.was_pressed(KeyCode::Backspace) {
            session.gateway_mut().backspace();
        }
        if kb.was_pressed(KeyCode::Up) || gp.up_pressed() {
            session.gateway_mut().step_count(1);
        }
        if kb.was_pressed(KeyCode::Down) || gp.down_pressed() {
            session.gateway_mut().step_count(-1);
        }
        if kb.was_pressed(KeyCode::Enter) || gp.go_pressed() {
            session.press_go(now, &field);
        }
        return false;
    }

    if kb.typed_chars().any(|c| c == 'q' || c == 'Q') {
        return true;
    }

    // ── Play: focus and activation ──
    if session.machine().phase() == Phase::Play {
        let items = session.machine().items();
        if kb.any_pressed(&[KeyCode::Tab, KeyCode::Right, KeyCode::Down])
            || gp.right_pressed()
            || gp.down_pressed()
        {
            focus.next(items);
        }
        if kb.any_pressed(&[KeyCode::BackTab, KeyCode::Left, KeyCode::Up])
            || gp.left_pressed()
            || gp.up_pressed()
        {
            focus.prev(items);
        }
        if kb.any_pressed(&[KeyCode::Enter, KeyCode::Char(' ')]) || gp.confirm_pressed() {
            if let Some(id) = focus.focused() {
                session.activate(id);
            }
        }
        if kb.was_pressed(KeyCode::Backspace) && session.give_up() {
            info!("round abandoned");
        }
    }

    for &(col, row) in kb.clicks() {
        if let Some(point) = field.to_local(col, row) {
            session.click(point);
        }
    }

    false
}
