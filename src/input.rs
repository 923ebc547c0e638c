//! Input synthesis for driving the game window
//!
//! Every pointer move is window-relative and goes through one addressing
//! interface; callers pick a [`MouseMode`] per coordinate instead of knowing
//! which primitive it needs. Key input comes in two shapes: raw scan-code
//! presses for game bindings, and paced per-character typing for text fields
//! that drop characters when fed faster than the UI accepts them.

#![allow(dead_code)]

#[cfg(windows)]
use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
#[cfg(windows)]
use once_cell::sync::Lazy;
#[cfg(windows)]
use parking_lot::Mutex;
use std::thread;
use std::time::Duration;

use crate::profile::Point;
use crate::window::Window;

/// Pause between typed characters; the game UI drops faster input.
pub const KEY_PACE: Duration = Duration::from_millis(50);

/// Pause between positioning the pointer and clicking.
const CLICK_DELAY: Duration = Duration::from_millis(200);

/// Pause between the legacy reset move and the relative offset move.
const LEGACY_RESET_PAUSE: Duration = Duration::from_millis(50);

/// Hold time for a scan-code press.
const SCANCODE_HOLD: Duration = Duration::from_millis(60);

/// Addressing mode for window-relative pointer moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseMode {
    /// Move straight to the window-relative coordinate.
    Absolute,
    /// Reset the pointer to the window origin first, then apply the
    /// coordinate as a relative offset. Used for coordinates whose absolute
    /// position cannot be trusted after OS scaling quirks.
    LegacyRelative,
}

#[cfg(windows)]
static MOUSE: Lazy<Mutex<Enigo>> = Lazy::new(|| {
    Mutex::new(Enigo::new(&Settings::default()).expect("Failed to create Enigo for mouse"))
});

#[cfg(windows)]
static KEYBOARD: Lazy<Mutex<Enigo>> = Lazy::new(|| {
    Mutex::new(Enigo::new(&Settings::default()).expect("Failed to create Enigo for keyboard"))
});

/// Screen-space target of a window-relative point.
fn absolute_target(window: &Window, point: Point) -> (i32, i32) {
    let (left, top, _, _) = window.rect;
    (left + point.x, top + point.y)
}

/// Move the pointer to a window-relative coordinate.
#[cfg(windows)]
pub fn move_pointer(window: &Window, mode: MouseMode, point: Point) {
    let mut mouse = MOUSE.lock();
    match mode {
        MouseMode::Absolute => {
            let (x, y) = absolute_target(window, point);
            if let Err(e) = mouse.move_mouse(x, y, Coordinate::Abs) {
                tracing::warn!("Failed to move mouse to ({}, {}): {:?}", x, y, e);
            }
        }
        MouseMode::LegacyRelative => {
            let (left, top, _, _) = window.rect;
            if let Err(e) = mouse.move_mouse(left, top, Coordinate::Abs) {
                tracing::warn!("Failed to reset mouse to window origin: {:?}", e);
            }
            thread::sleep(LEGACY_RESET_PAUSE);
            if let Err(e) = mouse.move_mouse(point.x, point.y, Coordinate::Rel) {
                tracing::warn!("Failed to offset mouse by ({}, {}): {:?}", point.x, point.y, e);
            }
        }
    }
}

#[cfg(not(windows))]
pub fn move_pointer(_window: &Window, _mode: MouseMode, _point: Point) {
    tracing::warn!("move_pointer not implemented on this platform");
}

/// Click the left mouse button at the current pointer position.
#[cfg(windows)]
pub fn click_left() {
    let mut mouse = MOUSE.lock();
    if let Err(e) = mouse.button(Button::Left, Direction::Click) {
        tracing::warn!("Failed to click mouse: {:?}", e);
    }
}

#[cfg(not(windows))]
pub fn click_left() {
    tracing::warn!("click_left not implemented on this platform");
}

/// Move to a window-relative coordinate, settle, then click.
pub fn move_and_click(window: &Window, mode: MouseMode, point: Point) {
    move_pointer(window, mode, point);
    thread::sleep(CLICK_DELAY);
    click_left();
}

/// Park the pointer in the bottom-left window corner.
///
/// Invoked before and after interactions: a pointer left on top of a button
/// or banner region corrupts the OCR/histogram reads taken there. The
/// bottom-left corner overlaps none of the profiled regions.
#[cfg(windows)]
pub fn reset_pointer(window: &Window) {
    let (left, _, _, bottom) = window.rect;
    let mut mouse = MOUSE.lock();
    if let Err(e) = mouse.move_mouse(left + 2, bottom - 2, Coordinate::Abs) {
        tracing::warn!("Failed to park mouse: {:?}", e);
    }
}

#[cfg(not(windows))]
pub fn reset_pointer(_window: &Window) {
    tracing::warn!("reset_pointer not implemented on this platform");
}

/// Press and release a key by hardware scan code.
#[cfg(windows)]
pub fn press_scancode(code: u16) {
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP,
        KEYEVENTF_SCANCODE, VIRTUAL_KEY,
    };

    fn scancode_event(code: u16, flags: KEYBD_EVENT_FLAGS) -> INPUT {
        INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: VIRTUAL_KEY(0),
                    wScan: code,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        }
    }

    let press = scancode_event(code, KEYEVENTF_SCANCODE);
    let release = scancode_event(code, KEYEVENTF_SCANCODE | KEYEVENTF_KEYUP);
    unsafe {
        SendInput(&[press], std::mem::size_of::<INPUT>() as i32);
        thread::sleep(SCANCODE_HOLD);
        SendInput(&[release], std::mem::size_of::<INPUT>() as i32);
    }
}

#[cfg(not(windows))]
pub fn press_scancode(_code: u16) {
    tracing::warn!("press_scancode not implemented on this platform");
}

/// Type a string literally, one paced character at a time.
#[cfg(windows)]
pub fn type_text(text: &str) {
    let mut keyboard = KEYBOARD.lock();
    for c in text.chars() {
        if let Err(e) = keyboard.key(Key::Unicode(c), Direction::Click) {
            tracing::warn!("Failed to type character '{}': {:?}", c, e);
        }
        thread::sleep(KEY_PACE);
    }
}

#[cfg(not(windows))]
pub fn type_text(_text: &str) {
    tracing::warn!("type_text not implemented on this platform");
}

/// Advance to the next input field.
#[cfg(windows)]
pub fn press_tab() {
    let mut keyboard = KEYBOARD.lock();
    if let Err(e) = keyboard.key(Key::Tab, Direction::Click) {
        tracing::warn!("Failed to press tab: {:?}", e);
    }
}

#[cfg(not(windows))]
pub fn press_tab() {
    tracing::warn!("press_tab not implemented on this platform");
}

/// Clear the focused text field with paced backspaces.
#[cfg(windows)]
pub fn clear_field(presses: u32) {
    let mut keyboard = KEYBOARD.lock();
    for _ in 0..presses {
        if let Err(e) = keyboard.key(Key::Backspace, Direction::Click) {
            tracing::warn!("Failed to press backspace: {:?}", e);
        }
        thread::sleep(KEY_PACE);
    }
}

#[cfg(not(windows))]
pub fn clear_field(_presses: u32) {
    tracing::warn!("clear_field not implemented on this platform");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_target_translates_by_window_origin() {
        let window = Window {
            handle: 0,
            pid: 0,
            rect: (5, 5, 1285, 725),
        };
        let point = Point { x: 331, y: 50 };
        assert_eq!(absolute_target(&window, point), (336, 55));
    }
}
