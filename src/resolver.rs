//! Enumeration of a playlist's complete track list.
//!
//! An embed page only carries the first entries of a large playlist. The
//! resolver hands those out first, then asks the playlist API how many
//! tracks there really are and fetches the missing ones one page at a time.
//!
//! ```text
//! Embedded ──> CheckingCompleteness ──> Supplementary ──> Done
//!                      │                                   ^
//!                      └───────────────────────────────────┘
//! ```
//!
//! Nothing is prefetched: each pull performs at most the network calls
//! needed to produce one track. Only the embed page fetch can fail the
//! enumeration, and it happens before the resolver exists. Later failures
//! end the enumeration early or turn into placeholders.

use std::collections::{HashSet, VecDeque};

use futures_util::stream::{self, BoxStream, StreamExt};

use crate::{provider::Provider, track::TrackInfo};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    /// Handing out tracks found on the embed page.
    Embedded,
    /// Asking the playlist API whether anything is missing.
    CheckingCompleteness,
    /// Fetching the pages of tracks the embed page left out.
    Supplementary,
    Done,
}

/// Pull-based state machine over one playlist's tracks.
///
/// Never yields the same track id twice.
pub struct Resolver<'a> {
    provider: &'a mut Provider,
    playlist_id: String,
    phase: Phase,
    embedded: VecDeque<TrackInfo>,
    pending: VecDeque<String>,
    seen: HashSet<String>,
    embedded_yielded: usize,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(
        provider: &'a mut Provider,
        playlist_id: &str,
        embedded: Vec<TrackInfo>,
    ) -> Self {
        Self {
            provider,
            playlist_id: playlist_id.to_owned(),
            phase: Phase::Embedded,
            embedded: embedded.into(),
            pending: VecDeque::new(),
            seen: HashSet::new(),
            embedded_yielded: 0,
        }
    }

    /// Produces the next track, or `None` once the playlist is exhausted.
    pub async fn next_track(&mut self) -> Option<TrackInfo> {
        loop {
            match self.phase {
                Phase::Embedded => {
                    let Some(track) = self.embedded.pop_front() else {
                        self.phase = Phase::CheckingCompleteness;
                        continue;
                    };

                    if self.seen.insert(track.id.clone()) {
                        self.embedded_yielded += 1;
                        return Some(track);
                    }
                    debug!("skipping duplicate embedded track {}", track.id);
                }

                Phase::CheckingCompleteness => {
                    self.phase = self.check_completeness().await;
                }

                Phase::Supplementary => {
                    let Some(id) = self.pending.pop_front() else {
                        self.phase = Phase::Done;
                        continue;
                    };

                    if !self.seen.insert(id.clone()) {
                        continue;
                    }

                    let track = match self.provider.track(&id).await {
                        Ok(track) => track,
                        Err(e) => {
                            warn!("track {id}: {e}; using placeholder");
                            TrackInfo::placeholder(&id)
                        }
                    };

                    // The page may name the track differently than the list did.
                    if track.id != id && !self.seen.insert(track.id.clone()) {
                        debug!("skipping duplicate track {} (listed as {id})", track.id);
                        continue;
                    }

                    return Some(track);
                }

                Phase::Done => return None,
            }
        }
    }

    /// Decides whether supplementary fetching is needed and queues the ids.
    async fn check_completeness(&mut self) -> Phase {
        let contents = match self.provider.playlist_contents(&self.playlist_id).await {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                debug!(
                    "playlist {}: no access token; stopping after {} embedded tracks",
                    self.playlist_id, self.embedded_yielded
                );
                return Phase::Done;
            }
            Err(e) => {
                warn!(
                    "playlist {}: could not list remaining tracks ({e}); stopping after {} embedded tracks",
                    self.playlist_id, self.embedded_yielded
                );
                return Phase::Done;
            }
        };

        let total = contents.total().unwrap_or_default();
        if total <= self.embedded_yielded {
            return Phase::Done;
        }

        self.pending = contents.track_ids().map(str::to_owned).collect();
        debug!(
            "playlist {}: {} of {total} tracks embedded; {} listed",
            self.playlist_id,
            self.embedded_yielded,
            self.pending.len()
        );

        Phase::Supplementary
    }

    /// Turns the resolver into a stream of tracks.
    #[must_use]
    pub fn into_stream(self) -> BoxStream<'a, TrackInfo> {
        stream::unfold(self, |mut resolver| async move {
            resolver
                .next_track()
                .await
                .map(|track| (track, resolver))
        })
        .boxed()
    }
}
