//! Game identity: which devices have loaded *this* game.
//!
//! Two pages belong to the same game iff their URLs normalize to the same
//! string. Normalization drops the fragment and query, strips a trailing
//! `screen.html` / `controller.html`, and rewrites `https://` to
//! `http://`. The scheme rewrite is a known quirk: it keeps a game served
//! over both schemes from seeing its own devices as foreign.

/// Role filenames stripped from the end of a page URL.
const ROLE_FILES: [&str; 2] = ["screen.html", "controller.html"];

/// Maps a page URL to its game identity.
///
/// Injected into the session so embedders (and tests) can scope devices
/// differently, e.g. by game id instead of URL.
pub trait LocationResolver: Send + 'static {
    /// Returns the game identity for `url`, or `None` if there is none.
    fn normalize(&self, url: &str) -> Option<String>;
}

/// The standard URL-based [`LocationResolver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GameUrlResolver;

impl LocationResolver for GameUrlResolver {
    fn normalize(&self, url: &str) -> Option<String> {
        let end = url.find(|c| c == '#' || c == '?').unwrap_or(url.len());
        let mut url = &url[..end];

        // Repeat until stable so normalizing twice changes nothing.
        while let Some(stripped) = ROLE_FILES.iter().find_map(|file| url.strip_suffix(file)) {
            url = stripped;
        }

        if url.is_empty() {
            return None;
        }
        Some(match url.strip_prefix("https://") {
            Some(rest) => format!("http://{rest}"),
            None => url.to_string(),
        })
    }
}

/// How an update moved a device relative to the current game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationChange {
    /// The device was elsewhere and is now in this game.
    Connect,
    /// The device was in this game and now isn't.
    Disconnect,
    /// Neither: it stayed in, or stayed out.
    Unchanged,
}

impl LocationChange {
    /// Classifies a move from `before` to `after`, both already
    /// normalized, against the `current` game identity.
    pub fn classify(before: Option<&str>, current: Option<&str>, after: Option<&str>) -> Self {
        if before != current && after == current {
            Self::Connect
        } else if before == current && after != current {
            Self::Disconnect
        } else {
            Self::Unchanged
        }
    }
}
