//! Spool-directory command source.
//!
//! Each channel has a mailbox directory `<root>/<mailbox>/` (`st699`,
//! `HW`, `CH`).  A mail fetcher drops one file per message.  On poll the
//! newest message wins and every message in the mailbox is removed, so a
//! command is delivered once and older ones never replay.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::{debug, warn};

use crate::app::ports::CommandSource;
use crate::command::Channel;
use crate::error::CommandSourceError;

pub struct SpoolDirSource {
    root: PathBuf,
}

impl SpoolDirSource {
    /// Creates the mailbox directories if they are missing.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        for channel in Channel::ALL {
            fs::create_dir_all(root.join(channel.mailbox()))?;
        }
        Ok(Self { root })
    }

    pub fn mailbox_dir(&self, channel: Channel) -> PathBuf {
        self.root.join(channel.mailbox())
    }
}

impl CommandSource for SpoolDirSource {
    fn poll(&mut self, channel: Channel) -> Result<Option<String>, CommandSourceError> {
        let dir = self.mailbox_dir(channel);
        let mut messages = list_messages(&dir).map_err(|e| {
            warn!("spool: cannot list {}: {e}", dir.display());
            CommandSourceError::Unavailable
        })?;
        let Some((_, newest)) = messages.pop() else {
            return Ok(None);
        };

        let body = fs::read(&newest);
        for path in messages.iter().map(|(_, p)| p).chain(std::iter::once(&newest)) {
            if let Err(e) = fs::remove_file(path) {
                warn!("spool: cannot remove {}: {e}", path.display());
            }
        }
        if !messages.is_empty() {
            debug!("spool: {} discarded {} older message(s)", channel.mailbox(), messages.len());
        }

        let body = body.map_err(|e| {
            warn!("spool: cannot read {}: {e}", newest.display());
            CommandSourceError::Unavailable
        })?;
        String::from_utf8(body)
            .map(Some)
            .map_err(|_| CommandSourceError::InvalidText)
    }
}

/// Regular files in `dir`, oldest first.  Ties are broken by file name.
fn list_messages(dir: &Path) -> io::Result<Vec<(SystemTime, PathBuf)>> {
    let mut messages = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if !meta.is_file() || entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        messages.push((modified, entry.path()));
    }
    messages.sort();
    Ok(messages)
}
