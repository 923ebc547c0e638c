//! Build script for bf2-spectator
//! Embeds Windows manifest for administrator privileges and sets application icon

fn main() {
    // Only run on Windows
    #[cfg(windows)]
    {
        embed_windows_resources();
    }
}

#[cfg(windows)]
fn embed_windows_resources() {
    // Use winres to embed the manifest and icon
    let mut res = winres::WindowsResource::new();

    // Set the manifest file for administrator privileges
    // (synthetic input into the game window requires elevation)
    res.set_manifest_file("bf2-spectator.manifest");

    // Set the application icon if it exists
    if std::path::Path::new("icons/icon.ico").exists() {
        res.set_icon("icons/icon.ico");
    }

    // Compile the resources
    if let Err(e) = res.compile() {
        eprintln!("Warning: Failed to compile Windows resources: {}", e);
        // Don't fail the build, just warn
    }
}
