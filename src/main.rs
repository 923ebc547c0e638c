//! bf2-spectator - auto spectator bot for Battlefield 2
//!
//! Attaches to a running BF2 client and keeps it spectating:
//! - OCR and histogram classification of the current screen
//! - Server connection through the connect-to-IP dialog
//! - Round-end handling with map/size/team detection
//! - Spawn-suicide so the free camera becomes available
//! - Player rotation when nothing is happening on screen

use std::thread;
use std::time::Duration;

use chrono::Utc;

use bf2_spectator::controller::{poll_until, InstanceService};
use bf2_spectator::log_main::{load_sessions, log_connect, log_rotation, save_sessions, Session};
use bf2_spectator::profile::{ProfileService, SpawnTable};
use bf2_spectator::screen_reader::HistService;
use bf2_spectator::utils::settings::{get_data_dir, get_settings, Settings};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pause between spectator iterations while on a server.
const PLAYER_ROTATION_PAUSE: Duration = Duration::from_secs(5);

/// Pause between iterations while waiting on menus or loading screens.
const IDLE_POLL: Duration = Duration::from_secs(2);

const SPAWN_MENU_WAIT_ATTEMPTS: u32 = 30;
const SPAWN_MENU_WAIT_INTERVAL: Duration = Duration::from_secs(1);

fn main() {
    // Initialize logging with file output to debug/log folder
    let base = get_data_dir();
    let log_dir = base.join("debug").join("log");
    let _ = std::fs::create_dir_all(&log_dir);

    let log_file_path = log_dir.join("debug.log");
    let file_result = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path);

    // Configure logging with both stdout and file output
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    const LOG_FILTER: &str = "info,bf2_spectator=info";

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LOG_FILTER));

    match file_result {
        Ok(file) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE);

            let stdout_layer = tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(stdout_layer)
                .init();

            tracing::info!("[INIT] Logging initialized, file: {:?}", log_file_path);
        }
        Err(e) => {
            // Fallback: stdout-only logging with same filter
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new(LOG_FILTER))
                .init();
            eprintln!(
                "[INIT] Failed to create debug log file at {:?}: {}",
                log_file_path, e
            );
        }
    }

    println!("bf2-spectator {}", APP_VERSION);
    println!("================================");

    if let Err(e) = run() {
        tracing::error!("[MAIN] {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let settings = get_settings();
    tracing::info!(
        "[INIT] Using resolution profile '{}', target server {}:{}",
        settings.resolution,
        settings.server_ip,
        settings.server_port
    );

    let profiles = ProfileService::load_default()?;
    let spawns = SpawnTable::load_default()?;

    // Baselines are an external asset; without them, histogram checks
    // simply never match and the menu flows fall back to clicking
    let hists = HistService::load_or_empty(&get_data_dir().join("config").join("histograms.json"));

    let mut instance = InstanceService::new(&settings.resolution, &profiles, spawns, hists)?;

    let report = instance.find_instance(&settings.game_mod);
    if !report.present {
        anyhow::bail!("no game window found; start the game first");
    }
    if !report.as_expected {
        tracing::warn!("[INIT] Game configuration differs from the requested one, continuing");
    }
    instance.bring_to_foreground()?;

    let mut sessions = load_sessions();
    sessions.push(Session {
        start: Utc::now().to_rfc3339(),
        stop: None,
    });
    save_sessions(&sessions);

    spectate(&mut instance, &settings)
}

/// The spectator supervision loop: strictly capture, decide, act.
fn spectate(instance: &mut InstanceService, settings: &Settings) -> anyhow::Result<()> {
    loop {
        if instance.is_game_message_visible()? {
            let message = instance.ocr_game_message()?;
            tracing::warn!("[LOOP] Game message: '{}'", message);
            instance.close_game_message()?;
            thread::sleep(IDLE_POLL);
            continue;
        }

        if instance.is_map_loading()? {
            tracing::info!("[LOOP] Map is loading");
            thread::sleep(IDLE_POLL);
            continue;
        }

        if instance.is_round_end_screen_visible()? {
            tracing::info!("[LOOP] Round ended, reading rotation info");
            if !instance.detect_rotation()? {
                tracing::warn!("[LOOP] Rotation map or size not recognized yet");
            }

            if poll_until(
                || instance.is_join_game_button_visible(),
                SPAWN_MENU_WAIT_INTERVAL,
                SPAWN_MENU_WAIT_ATTEMPTS,
            )? {
                instance.join_game()?;
            }

            if poll_until(
                || instance.is_spawn_menu_visible(),
                SPAWN_MENU_WAIT_INTERVAL,
                SPAWN_MENU_WAIT_ATTEMPTS,
            )? {
                instance.detect_team()?;
                log_rotation(instance.state());

                match instance.spawn_suicide() {
                    Ok(true) => instance.start_spectating_via_freecam_toggle(),
                    Ok(false) => tracing::warn!("[LOOP] Spawn-suicide did not complete"),
                    // Unsupported map/size ends the spawn attempt, not the session
                    Err(e) => tracing::warn!("[LOOP] Spawn attempt failed: {}", e),
                }
            }
            continue;
        }

        if instance.is_in_menu()? {
            tracing::info!(
                "[LOOP] In menu, connecting to {}:{}",
                settings.server_ip,
                settings.server_port
            );
            let connected = instance.connect_to_server(
                &settings.server_ip,
                &settings.server_port,
                settings.server_password.as_deref(),
            )?;
            log_connect(
                &format!("{}:{}", settings.server_ip, settings.server_port),
                connected,
            );
            if !connected {
                tracing::warn!("[LOOP] Connect attempt did not finish, retrying");
            }
            continue;
        }

        // On the server and spectating; hop on when nothing is happening
        if !instance.is_sufficient_action_on_screen(Some(settings.min_action_level))? {
            tracing::debug!("[LOOP] Not enough action on screen, rotating to next player");
            instance.rotate_to_next_player();
        }
        thread::sleep(PLAYER_ROTATION_PAUSE);
    }
}
