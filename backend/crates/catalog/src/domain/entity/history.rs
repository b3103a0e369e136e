//! Listening History Entity

use kernel::id::{HistoryId, SongId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamEntry {
    pub song: SongId,
    pub times_streamed: i32,
}

/// One per user. `streams` is most recent first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    pub history_id: HistoryId,
    pub user_id: UserId,
    pub streams: Vec<StreamEntry>,
}

impl History {
    pub fn new(user_id: UserId) -> Self {
        Self {
            history_id: HistoryId::new(),
            user_id,
            streams: Vec::new(),
        }
    }

    pub fn record_stream(&mut self, song: SongId) {
        record_stream(&mut self.streams, song);
    }

    /// No-op when the song is not in the history
    pub fn remove_stream(&mut self, song: &SongId) -> bool {
        let before = self.streams.len();
        self.streams.retain(|entry| &entry.song != song);
        self.streams.len() < before
    }
}

/// Move `song` to the front, bumping its count, or insert it with a count
/// of one.
pub fn record_stream(streams: &mut Vec<StreamEntry>, song: SongId) {
    let entry = match streams.iter().position(|entry| entry.song == song) {
        Some(pos) => {
            let mut entry = streams.remove(pos);
            entry.times_streamed = entry.times_streamed.saturating_add(1);
            entry
        }
        None => StreamEntry {
            song,
            times_streamed: 1,
        },
    };
    streams.insert(0, entry);
}
