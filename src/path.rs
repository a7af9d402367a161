//! Path expansion for user supplied locations.

use path_clean::PathClean;
use std::env;
use std::path::{Path, PathBuf};

/// Expands a path, replacing a leading `~` or `$HOME` with the user's home
/// directory and making it absolute against the current directory.
pub fn expand_path(path: &str) -> PathBuf {
    let path = expand_home(path);
    let path = Path::new(&path);

    let abs_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match env::current_dir() {
            Ok(dir) => dir.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    abs_path.clean()
}

fn expand_home(input: &str) -> String {
    if input.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return input.replacen('~', &home.to_string_lossy(), 1);
        }
    } else if input.starts_with("$HOME") {
        if let Some(home) = dirs::home_dir() {
            return input.replacen("$HOME", &home.to_string_lossy(), 1);
        }
    }
    input.into()
}
