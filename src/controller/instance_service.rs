//! Orchestration of one game instance
//!
//! Sequences detect → act → verify steps against the game window: menu
//! navigation, server connection, spawn selection and round-transition
//! handling. All multi-step flows are built from ordered clicks/key presses
//! plus the bounded poll in [`super::poll`].

use std::thread;
use std::time::Duration;

use super::poll::poll_until;
use super::spawn::attempt_order;
use crate::classifier::{ClassifyService, ACTION_MIN_DELTA};
use crate::error::{Error, Result};
use crate::input::{self, MouseMode};
use crate::profile::{ProfileService, ResolutionProfile, SpawnTable};
use crate::screen_reader::HistService;
use crate::state::{GameInstanceState, MAP_SIZE_UNKNOWN};
use crate::window::{self, Window};

// Scan codes for the game bindings the spectator relies on
const SCANCODE_MENU: u16 = 0x01; // Esc toggles the main menu
const SCANCODE_CONFIRM: u16 = 0x1c; // Enter confirms spawn / reopens the spawn menu
const SCANCODE_CONSOLE: u16 = 0x1d; // console toggle
const SCANCODE_FREECAM: u16 = 0x39; // Space switches to the free camera
const SCANCODE_NEXT_PLAYER: u16 = 0x2e; // C rotates to the next player

const MENU_OPEN_ATTEMPTS: u32 = 5;
const MENU_OPEN_INTERVAL: Duration = Duration::from_secs(1);
const CONNECT_DIALOG_ATTEMPTS: u32 = 10;
const CONNECT_DIALOG_INTERVAL: Duration = Duration::from_secs(1);
const JOIN_WAIT_ATTEMPTS: u32 = 16;
const JOIN_WAIT_INTERVAL: Duration = Duration::from_secs(1);
const PLAY_NOW_ATTEMPTS: u32 = 5;
const PLAY_NOW_INTERVAL: Duration = Duration::from_millis(300);

// The connect dialog's own field lengths bound how much needs clearing
const IP_FIELD_BACKSPACES: u32 = 20;
const PORT_FIELD_BACKSPACES: u32 = 10;

/// Header labels that identify the round-end screen; seeing any one suffices.
const ROUND_END_LABELS: [&str; 4] = ["score list", "top players", "top scores", "map briefing"];

/// Outcome of waiting for the menu to disappear after submitting the
/// connect dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinWait {
    /// The menu went away; we are on the server.
    LeftMenu,
    /// A game message popped up instead; the caller handles and retries.
    MessageShown,
    /// The disconnect confirmation interrupted the join; it was accepted,
    /// which only disconnects, so the caller must retry the whole connect.
    DisconnectPromptAccepted,
    TimedOut,
}

/// What `find_instance` learned about the running game.
#[derive(Debug, Clone)]
pub struct FindInstanceReport {
    pub present: bool,
    /// False when the running mod or window size differs from the
    /// requested configuration. The caller decides whether to proceed,
    /// abort or adapt.
    pub as_expected: bool,
    pub running_mod: Option<String>,
}

/// Drives a single game instance through screen evidence and synthetic input.
pub struct InstanceService {
    profile: ResolutionProfile,
    classifier: ClassifyService,
    spawns: SpawnTable,
    state: GameInstanceState,
    window: Option<Window>,
}

impl InstanceService {
    pub fn new(
        resolution: &str,
        profiles: &ProfileService,
        spawns: SpawnTable,
        hists: HistService,
    ) -> Result<Self> {
        let profile = profiles.get(resolution)?.clone();
        let classifier = ClassifyService::new(resolution, profile.clone(), hists);
        Ok(Self {
            profile,
            classifier,
            spawns,
            state: GameInstanceState::new(),
            window: None,
        })
    }

    pub fn state(&self) -> &GameInstanceState {
        &self.state
    }

    pub fn window(&self) -> Result<&Window> {
        self.window.as_ref().ok_or(Error::NoWindow)
    }

    /// Locate the game window and verify it matches the requested
    /// configuration. Mismatches are warnings in the report, not errors.
    pub fn find_instance(&mut self, expected_mod: &str) -> FindInstanceReport {
        self.window = window::find_game_window();

        let Some(window) = self.window else {
            return FindInstanceReport {
                present: false,
                as_expected: false,
                running_mod: None,
            };
        };

        let running_mod = window::process_command_line(window.pid)
            .as_deref()
            .and_then(window::mod_from_command_line);
        tracing::debug!("[INSTANCE] Found game running mod {:?}", running_mod);

        let mut as_expected = true;
        match running_mod.as_deref() {
            Some(running) if running != expected_mod => {
                tracing::warn!(
                    "[INSTANCE] Game is running mod '{}', expected '{}'",
                    running,
                    expected_mod
                );
                as_expected = false;
            }
            None => {
                tracing::debug!("[INSTANCE] Running mod could not be determined");
            }
            _ => {}
        }

        if !self.profile.matches_window_size(window.size()) {
            tracing::warn!(
                "[INSTANCE] Window size {:?} does not match profile size {:?}",
                window.size(),
                self.profile.size
            );
            as_expected = false;
        }

        FindInstanceReport {
            present: true,
            as_expected,
            running_mod,
        }
    }

    pub fn bring_to_foreground(&self) -> Result<()> {
        window::bring_to_foreground(self.window()?);
        Ok(())
    }

    /*
     * Screen detection
     */

    pub fn is_in_menu(&self) -> Result<bool> {
        self.check_text("quit-menu-item", "quit")
    }

    pub fn is_multiplayer_menu_active(&self) -> Result<bool> {
        self.check_hist("menu", "multiplayer")
    }

    pub fn is_join_internet_menu_active(&self) -> Result<bool> {
        self.check_hist("menu", "join-internet")
    }

    pub fn is_connect_to_ip_button_visible(&self) -> Result<bool> {
        self.check_text("connect-to-ip-button", "connect to ip")
    }

    pub fn is_disconnect_prompt_visible(&self) -> Result<bool> {
        self.check_text("disconnect-prompt-header", "disconnect")
    }

    pub fn is_disconnect_button_visible(&self) -> Result<bool> {
        self.check_text("disconnect-button", "disconnect")
    }

    pub fn is_play_now_button_visible(&self) -> Result<bool> {
        self.check_text("play-now-button", "play now")
    }

    pub fn is_join_game_button_visible(&self) -> Result<bool> {
        self.check_text("join-game-button", "join game")
    }

    pub fn is_game_message_visible(&self) -> Result<bool> {
        self.check_text("game-message-header", "game message")
    }

    /// Content of the game message dialog.
    pub fn ocr_game_message(&self) -> Result<String> {
        self.classifier
            .read_region_text(self.window()?, "game-message-text")
    }

    pub fn is_round_end_screen_visible(&self) -> Result<bool> {
        let text = self
            .classifier
            .read_region_text(self.window()?, "eor-header-items")?;
        Ok(contains_round_end_label(&text))
    }

    /// The next map is loading while the round-end screen shows without its
    /// join-game button.
    pub fn is_map_loading(&self) -> Result<bool> {
        Ok(self.is_round_end_screen_visible()? && !self.is_join_game_button_visible()?)
    }

    pub fn is_map_briefing_visible(&self) -> Result<bool> {
        self.check_text("map-briefing-header", "map briefing")
    }

    pub fn is_spawn_menu_visible(&self) -> Result<bool> {
        self.check_text("special-forces-class-label", "special forces")
    }

    pub fn is_spawn_point_selectable(&self) -> Result<bool> {
        self.check_text("spawn-selected-text", "select")
    }

    pub fn is_spawn_point_selected(&self) -> Result<bool> {
        self.check_text("spawn-selected-text", "done")
    }

    pub fn is_suicide_button_visible(&self) -> Result<bool> {
        self.check_text("suicide-button", "suicide")
    }

    pub fn is_default_camera_view_visible(&self) -> Result<bool> {
        self.classifier
            .is_default_camera_view(self.window()?, self.state.rotation_map_name())
    }

    pub fn is_sufficient_action_on_screen(&self, min_delta: Option<f64>) -> Result<bool> {
        self.classifier
            .is_sufficient_action(self.window()?, min_delta.unwrap_or(ACTION_MIN_DELTA))
    }

    /*
     * State detection
     */

    /// Read the round-end screen into the state store, starting a fresh
    /// rotation entry. True when both map name and size were recognized.
    pub fn detect_rotation(&mut self) -> Result<bool> {
        let window = *self.window()?;
        self.state.reset_rotation();

        if let Some(name) = self.classifier.classify_map_name(&window, &self.spawns)? {
            tracing::info!("[INSTANCE] Rotation map is '{}'", name);
            self.state.set_rotation_map_name(name);
        }

        let size = self.classifier.classify_map_size(&window)?;
        if size != MAP_SIZE_UNKNOWN {
            tracing::info!("[INSTANCE] Rotation map size is {}", size);
            self.state.set_rotation_map_size(size);
        }

        Ok(self.state.rotation_map_name().is_some()
            && self.state.rotation_map_size() != MAP_SIZE_UNKNOWN)
    }

    /// Detect the round team from the spawn menu banners.
    pub fn detect_team(&mut self) -> Result<bool> {
        let window = *self.window()?;
        match self.classifier.classify_team(&window)? {
            Some(team) => {
                tracing::info!("[INSTANCE] Detected team {}", team);
                self.state.set_round_team(team);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /*
     * Interaction flows
     */

    /// Press the menu key until the menu shows, bounded.
    pub fn open_menu(&self) -> Result<bool> {
        let opened = poll_until(
            || {
                if self.is_in_menu()? {
                    return Ok(true);
                }
                input::press_scancode(SCANCODE_MENU);
                Ok(false)
            },
            MENU_OPEN_INTERVAL,
            MENU_OPEN_ATTEMPTS,
        )?;

        // The final key press may still be taking effect
        if opened {
            Ok(true)
        } else {
            self.is_in_menu()
        }
    }

    /// Join a server through the connect-to-IP dialog.
    /// Returns whether the menu was left (= the join got through). A
    /// disconnect confirmation showing up mid-wait is accepted and reported
    /// as not connected; the caller retries the whole flow.
    pub fn connect_to_server(
        &self,
        server_ip: &str,
        server_port: &str,
        server_password: Option<&str>,
    ) -> Result<bool> {
        let window = *self.window()?;

        if !self.is_multiplayer_menu_active()? {
            self.click_target(&window, "multiplayer-menu-item")?;
        }
        if !self.is_join_internet_menu_active()? {
            self.click_target(&window, "join-internet-menu-item")?;
        }

        let dialog_available = poll_until(
            || self.is_connect_to_ip_button_visible(),
            CONNECT_DIALOG_INTERVAL,
            CONNECT_DIALOG_ATTEMPTS,
        )?;
        if !dialog_available {
            tracing::warn!("[INSTANCE] Connect-to-IP button never appeared");
            return Ok(false);
        }

        self.click_target(&window, "connect-to-ip-button")?;

        // Give the field popup time to appear
        thread::sleep(Duration::from_millis(300));

        input::clear_field(IP_FIELD_BACKSPACES);
        input::type_text(server_ip);
        input::press_tab();
        input::clear_field(PORT_FIELD_BACKSPACES);
        input::type_text(server_port);
        thread::sleep(Duration::from_millis(300));

        if let Some(password) = server_password {
            input::press_tab();
            input::type_text(password);
            thread::sleep(Duration::from_millis(300));
        }

        self.click_target(&window, "connect-to-ip-ok-button")?;

        // Joining succeeds exactly when the menu goes away
        let outcome = wait_for_join(
            || self.is_in_menu(),
            || self.is_game_message_visible(),
            || self.is_disconnect_prompt_visible(),
            || {
                tracing::warn!("[INSTANCE] Disconnect prompt is visible, accepting it");
                self.click_target(&window, "disconnect-prompt-yes-button")?;
                thread::sleep(Duration::from_millis(500));
                Ok(())
            },
            JOIN_WAIT_INTERVAL,
            JOIN_WAIT_ATTEMPTS,
        )?;

        Ok(outcome == JoinWait::LeftMenu)
    }

    /// Leave the current server via the menu's disconnect button.
    pub fn disconnect_from_server(&self) -> Result<bool> {
        let window = *self.window()?;

        if self.is_disconnect_button_visible()? {
            self.click_target(&window, "disconnect-button")?;

            // Unblock OCR of the button region before polling it
            input::reset_pointer(&window);

            poll_until(
                || self.is_play_now_button_visible(),
                PLAY_NOW_INTERVAL,
                PLAY_NOW_ATTEMPTS,
            )?;
        }

        Ok(self.is_in_menu()? && self.is_play_now_button_visible()?)
    }

    /// Open the spawn menu and give it time to render.
    pub fn open_spawn_menu(&self, settle: Duration) {
        input::press_scancode(SCANCODE_CONFIRM);
        thread::sleep(settle);
    }

    /// Spawn in and immediately suicide, so the free camera becomes
    /// available without the spectator holding a spawn point.
    ///
    /// Success is a state transition: the suicide button was visible before
    /// this call and is gone afterwards.
    pub fn spawn_suicide(&self) -> Result<bool> {
        let window = *self.window()?;

        if self.is_spawn_point_selectable()? && self.select_spawn_point()? {
            input::press_scancode(SCANCODE_CONFIRM);
            thread::sleep(Duration::from_secs(1));

            self.open_spawn_menu(Duration::from_millis(300));

            // De-select the spawn point so the next round starts clean
            self.click_target_legacy(&window, "spawnpoint-deselect")?;
        }

        // The suicide button may be visible even without a selected spawn,
        // e.g. when the spectator is still alive from a previous attempt
        let suicide_button_visible = self.is_suicide_button_visible()?;
        if suicide_button_visible {
            self.click_target_legacy(&window, "suicide-button")?;
            thread::sleep(Duration::from_millis(500));
        }

        // Keep the pointer off the regions the next reads need
        input::reset_pointer(&window);

        Ok(suicide_button_visible && !self.is_suicide_button_visible()?)
    }

    /// Select a spawn point for the current map, size and team, falling back
    /// through alternates in preference order.
    pub fn select_spawn_point(&self) -> Result<bool> {
        let window = *self.window()?;

        let map = self
            .state
            .rotation_map_name()
            .ok_or_else(|| Error::UnsupportedMapSize {
                map: "unknown".to_string(),
                size: self.state.rotation_map_size(),
            })?;
        let size = self.state.rotation_map_size();
        let candidates = self.spawns.candidates(map, size)?;

        let team = match self.state.round_team() {
            Some(team) => team,
            None => {
                tracing::warn!("[SPAWN] Team not detected yet, assuming team 0");
                0
            }
        };

        let (primary, alternates) = attempt_order(candidates, team).ok_or_else(|| {
            Error::Config(format!("spawn entry {}/{} is too short", map, size))
        })?;

        input::move_pointer(&window, MouseMode::LegacyRelative, primary);
        thread::sleep(Duration::from_millis(300));
        input::click_left();

        if !self.is_spawn_point_selected()? && !alternates.is_empty() {
            tracing::warn!("[SPAWN] Primary spawn not selectable, trying alternates");
            for point in alternates {
                tracing::debug!("[SPAWN] Trying spawn offset ({}, {})", point.x, point.y);
                input::move_pointer(&window, MouseMode::LegacyRelative, point);
                thread::sleep(Duration::from_millis(100));
                input::click_left();
                thread::sleep(Duration::from_millis(100));
                if self.is_spawn_point_selected()? {
                    break;
                }
            }
        }

        self.is_spawn_point_selected()
    }

    /// Click the join-game button on the round-end screen.
    pub fn join_game(&self) -> Result<()> {
        let window = *self.window()?;
        self.click_target(&window, "join-game-button")
    }

    /// Dismiss the current game message dialog.
    pub fn close_game_message(&self) -> Result<()> {
        let window = *self.window()?;
        self.click_target(&window, "game-message-close-button")
    }

    /// Show or hide the HUD through the in-game console.
    pub fn toggle_hud(&self, visible: bool) {
        input::press_scancode(SCANCODE_CONSOLE);
        thread::sleep(Duration::from_millis(100));

        input::clear_field(2);
        input::type_text(&format!("renderer.drawHud {}", u8::from(visible)));
        thread::sleep(Duration::from_millis(300));

        input::press_scancode(SCANCODE_CONFIRM);
        thread::sleep(Duration::from_millis(100));

        input::press_scancode(SCANCODE_CONSOLE);
        thread::sleep(Duration::from_millis(100));
    }

    /// Switch the dead spectator into the free camera.
    pub fn start_spectating_via_freecam_toggle(&self) {
        input::press_scancode(SCANCODE_FREECAM);
        thread::sleep(Duration::from_millis(200));
    }

    /// Jump the spectator camera to the next player.
    pub fn rotate_to_next_player(&self) {
        input::press_scancode(SCANCODE_NEXT_PLAYER);
    }

    /// Quit the game through the menu. True when the window's process went
    /// away afterwards.
    pub fn quit_instance(&self) -> Result<bool> {
        if !self.open_menu()? {
            return Ok(false);
        }

        let window = *self.window()?;
        self.click_target(&window, "quit-menu-item")?;
        thread::sleep(Duration::from_secs(2));

        Ok(!window::is_responding(&window))
    }

    /*
     * Helpers
     */

    fn check_text(&self, region: &str, expected: &str) -> Result<bool> {
        self.classifier
            .is_text_present(self.window()?, region, expected)
    }

    fn check_hist(&self, category: &str, label: &str) -> Result<bool> {
        self.classifier
            .is_hist_active(self.window()?, category, label)
    }

    fn click_target(&self, window: &Window, name: &str) -> Result<()> {
        let point = self.profile.click(name)?;
        input::move_and_click(window, MouseMode::Absolute, point);
        Ok(())
    }

    fn click_target_legacy(&self, window: &Window, name: &str) -> Result<()> {
        let point = self.profile.click(name)?;
        input::move_and_click(window, MouseMode::LegacyRelative, point);
        Ok(())
    }
}

/// Whether a round-end header OCR result contains any of the expected
/// section labels.
fn contains_round_end_label(text: &str) -> bool {
    ROUND_END_LABELS.iter().any(|label| text.contains(label))
}

/// Wait for the menu to disappear after submitting the connect dialog,
/// watching for a game message and the disconnect-confirmation interrupt
/// on every iteration.
fn wait_for_join(
    mut in_menu: impl FnMut() -> Result<bool>,
    mut message_visible: impl FnMut() -> Result<bool>,
    mut disconnect_prompt_visible: impl FnMut() -> Result<bool>,
    mut accept_disconnect_prompt: impl FnMut() -> Result<()>,
    interval: Duration,
    max_attempts: u32,
) -> Result<JoinWait> {
    let mut attempt = 0;
    while attempt < max_attempts {
        if !in_menu()? {
            return Ok(JoinWait::LeftMenu);
        }
        if message_visible()? {
            return Ok(JoinWait::MessageShown);
        }
        if disconnect_prompt_visible()? {
            // Accepting only disconnects; the join itself did not happen
            accept_disconnect_prompt()?;
            return Ok(JoinWait::DisconnectPromptAccepted);
        }
        attempt += 1;
        if attempt < max_attempts {
            thread::sleep(interval);
        }
    }
    Ok(JoinWait::TimedOut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_end_label_single_match_suffices() {
        assert!(contains_round_end_label("top players"));
        assert!(contains_round_end_label("x score list y"));
        assert!(!contains_round_end_label("join game"));
        assert!(!contains_round_end_label(""));
    }

    #[test]
    fn test_wait_for_join_reports_left_menu() {
        let mut checks = 0;
        let outcome = wait_for_join(
            || {
                checks += 1;
                Ok(checks < 3) // leaves the menu on the third check
            },
            || Ok(false),
            || Ok(false),
            || panic!("no prompt to accept"),
            Duration::ZERO,
            16,
        )
        .unwrap();

        assert_eq!(outcome, JoinWait::LeftMenu);
    }

    #[test]
    fn test_disconnect_prompt_accepted_once_and_not_connected() {
        let mut iterations = 0;
        let mut accepts = 0;
        let outcome = wait_for_join(
            || Ok(true),
            || Ok(false),
            || {
                iterations += 1;
                Ok(iterations == 2) // prompt shows on the second iteration
            },
            || {
                accepts += 1;
                Ok(())
            },
            Duration::ZERO,
            16,
        )
        .unwrap();

        assert_eq!(outcome, JoinWait::DisconnectPromptAccepted);
        assert_ne!(outcome, JoinWait::LeftMenu);
        assert_eq!(accepts, 1);
    }

    #[test]
    fn test_wait_for_join_times_out() {
        let mut checks = 0;
        let outcome = wait_for_join(
            || {
                checks += 1;
                Ok(true)
            },
            || Ok(false),
            || Ok(false),
            || Ok(()),
            Duration::ZERO,
            16,
        )
        .unwrap();

        assert_eq!(outcome, JoinWait::TimedOut);
        assert_eq!(checks, 16);
    }

    #[test]
    fn test_game_message_stops_the_wait() {
        let outcome = wait_for_join(
            || Ok(true),
            || Ok(true),
            || Ok(false),
            || Ok(()),
            Duration::ZERO,
            16,
        )
        .unwrap();

        assert_eq!(outcome, JoinWait::MessageShown);
    }
}
