use std::collections::HashMap;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Prompts that ask for a file path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowseAction {
    Image,
    Kernel,
    Application,
}

/// Last directory used by each path prompt during one wizard run.
#[derive(Debug, Default)]
pub struct RecentDirectories {
    dirs: HashMap<BrowseAction, PathBuf>,
}

impl RecentDirectories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the directory containing `chosen`.
    pub fn remember(&mut self, action: BrowseAction, chosen: &str) {
        let parent = Path::new(chosen.trim()).parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            self.dirs.insert(action, parent.to_path_buf());
        }
    }

    /// Initial text for the prompt: the remembered directory with a trailing separator.
    pub fn suggestion(&self, action: BrowseAction) -> String {
        self.dirs
            .get(&action)
            .map(|dir| {
                let dir = dir.display().to_string();
                if dir.ends_with(MAIN_SEPARATOR) { dir } else { format!("{}{}", dir, MAIN_SEPARATOR) }
            })
            .unwrap_or_default()
    }
}
