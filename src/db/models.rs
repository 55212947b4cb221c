use chrono::NaiveDate;

/// An artist row ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistRecord {
    pub artist_id: i64,
    pub name: String,
}

/// A song row ready for insertion. Attributes come from the first report
/// row that mentioned the song's external key.
#[derive(Debug, Clone, PartialEq)]
pub struct SongRecord {
    pub song_id: i32,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub cover_url: String,
}

/// One artist-performs-song association.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingRecord {
    pub artist_id: i64,
    pub song_id: i32,
}

/// One dated streaming observation for a song.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRecord {
    pub song_id: i32,
    pub date: NaiveDate,
    pub streams: Option<i64>,
    pub popularity: Option<i32>,
}

/// Outcome of one bulk load. Skipped rows are conflicts the database
/// dropped, not errors.
#[derive(Debug, Default)]
pub struct LoadStats {
    pub artists_inserted: u64,
    pub artists_skipped: u64,
    pub songs_inserted: u64,
    pub songs_skipped: u64,
    pub sings_inserted: u64,
    pub sings_skipped: u64,
    pub performances_inserted: u64,
    pub performances_skipped: u64,
}

impl LoadStats {
    pub fn total_inserted(&self) -> u64 {
        self.artists_inserted + self.songs_inserted + self.sings_inserted
            + self.performances_inserted
    }

    pub fn total_skipped(&self) -> u64 {
        self.artists_skipped + self.songs_skipped + self.sings_skipped
            + self.performances_skipped
    }
}

/// Row count for one table (the `stats` command).
#[derive(Debug)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: i64,
}
