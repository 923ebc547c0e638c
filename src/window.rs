//! Game window discovery using the Windows API
//!
//! The window is found, measured and foregrounded here; launching or killing
//! the game process is not this crate's job.

#![allow(dead_code)]

#[cfg(windows)]
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT};
#[cfg(windows)]
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowRect, GetWindowTextW, GetWindowThreadProcessId, IsHungAppWindow,
    SetForegroundWindow, ShowWindow, SW_SHOW,
};

/// Title prefix of the game window (the full title carries the process id).
pub const GAME_WINDOW_TITLE_PREFIX: &str = "BF2 (v1.5.3153-802.0, pid:";

/// A found game window: raw handle, owning process and screen rectangle.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub handle: isize,
    pub pid: u32,
    /// (left, top, right, bottom) in screen coordinates.
    pub rect: (i32, i32, i32, i32),
}

impl Window {
    pub fn size(&self) -> (i32, i32) {
        let (left, top, right, bottom) = self.rect;
        (right - left, bottom - top)
    }
}

#[cfg(windows)]
fn raw_handle(window: &Window) -> HWND {
    HWND(window.handle as *mut core::ffi::c_void)
}

/// Find the game window by its title prefix.
#[cfg(windows)]
pub fn find_game_window() -> Option<Window> {
    struct Search {
        handle: Option<HWND>,
    }

    unsafe extern "system" fn enum_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
        let search = &mut *(lparam.0 as *mut Search);
        let mut buf = [0u16; 512];
        let len = GetWindowTextW(hwnd, &mut buf);
        if len > 0 {
            let title = String::from_utf16_lossy(&buf[..len as usize]);
            if title.starts_with(GAME_WINDOW_TITLE_PREFIX) {
                search.handle = Some(hwnd);
                return BOOL(0);
            }
        }
        BOOL(1)
    }

    let mut search = Search { handle: None };
    unsafe {
        // EnumWindows reports an error when the callback stops it early
        let _ = EnumWindows(Some(enum_proc), LPARAM(&mut search as *mut _ as isize));
    }

    let hwnd = search.handle?;

    let mut rect = RECT::default();
    let mut pid = 0u32;
    unsafe {
        if GetWindowRect(hwnd, &mut rect).is_err() {
            return None;
        }
        GetWindowThreadProcessId(hwnd, Some(&mut pid));
    }

    Some(Window {
        handle: hwnd.0 as isize,
        pid,
        rect: (rect.left, rect.top, rect.right, rect.bottom),
    })
}

#[cfg(not(windows))]
pub fn find_game_window() -> Option<Window> {
    tracing::warn!("Window finding not implemented on this platform");
    None
}

/// Bring the game window to the foreground.
#[cfg(windows)]
pub fn bring_to_foreground(window: &Window) {
    unsafe {
        let hwnd = raw_handle(window);
        ShowWindow(hwnd, SW_SHOW);
        let _ = SetForegroundWindow(hwnd);
    }
}

#[cfg(not(windows))]
pub fn bring_to_foreground(_window: &Window) {
    tracing::warn!("Window focusing not implemented on this platform");
}

/// Whether the window's owning process is still processing input.
#[cfg(windows)]
pub fn is_responding(window: &Window) -> bool {
    unsafe { !IsHungAppWindow(raw_handle(window)).as_bool() }
}

#[cfg(not(windows))]
pub fn is_responding(_window: &Window) -> bool {
    tracing::warn!("Responsiveness check not implemented on this platform");
    false
}

/// Command line of the window's owning process, if it can be read.
#[cfg(windows)]
pub fn process_command_line(pid: u32) -> Option<String> {
    let output = std::process::Command::new("wmic")
        .args([
            "process",
            "where",
            &format!("processid={}", pid),
            "get",
            "commandline",
            "/value",
        ])
        .output()
        .ok()?;

    let text = String::from_utf8_lossy(&output.stdout);
    text.lines()
        .find_map(|line| line.trim().strip_prefix("CommandLine="))
        .map(str::to_string)
}

#[cfg(not(windows))]
pub fn process_command_line(_pid: u32) -> Option<String> {
    tracing::warn!("Command line lookup not implemented on this platform");
    None
}

/// Extract the running mod from a game command line (`+modPath mods/<name>`).
pub fn mod_from_command_line(command_line: &str) -> Option<String> {
    let mut parts = command_line.split_whitespace();
    while let Some(part) = parts.next() {
        if part == "+modPath" {
            let value = parts.next()?;
            let value = value.trim_matches('"');
            return Some(
                value
                    .strip_prefix("mods/")
                    .unwrap_or(value)
                    .to_lowercase(),
            );
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size() {
        let window = Window {
            handle: 0,
            pid: 0,
            rect: (5, 5, 1285, 725),
        };
        assert_eq!(window.size(), (1280, 720));
    }

    #[test]
    fn test_mod_from_command_line() {
        let cmdline = r#"BF2.exe +restart 1 +playerName "joe" +modPath "mods/bf2" +szx 1280"#;
        assert_eq!(mod_from_command_line(cmdline), Some("bf2".to_string()));

        assert_eq!(mod_from_command_line("BF2.exe +szx 1280"), None);
        assert_eq!(
            mod_from_command_line("BF2.exe +modPath mods/xpack"),
            Some("xpack".to_string())
        );
    }
}
