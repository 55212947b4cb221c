use std::collections::HashMap;

use chrono::NaiveDate;

use crate::db::models::{ArtistRecord, PerformanceRecord, SingRecord, SongRecord};
use crate::report::ReportRow;
use crate::report::credits::split_credit;
use crate::report::timeseries;

/// The four record sets produced by one normalization pass, insertion-ready.
/// Sing pairs may repeat; the database's composite keys dedupe at load time.
#[derive(Debug, Default)]
pub struct Catalog {
    pub artists: Vec<ArtistRecord>,
    pub songs: Vec<SongRecord>,
    pub sings: Vec<SingRecord>,
    pub performances: Vec<PerformanceRecord>,
}

/// Counters for everything the pass dropped, so skips are observable
/// instead of silent control flow.
#[derive(Debug, Default, PartialEq)]
pub struct NormalizeStats {
    /// Rows walked, including skipped ones.
    pub rows: u64,
    /// Rows dropped for an empty external song key.
    pub rows_missing_key: u64,
    /// Rows whose time-series field was abandoned as malformed.
    pub rows_bad_series: u64,
    /// Dated observations flattened into performance records.
    pub observations: u64,
}

/// Normalization state threaded through the pass: the surrogate-id maps,
/// the next-id counters, and the accumulating output.
#[derive(Default)]
struct Normalizer {
    song_ids: HashMap<String, i32>,
    artist_ids: HashMap<String, i64>,
    next_song_id: i32,
    next_artist_id: i64,
    catalog: Catalog,
    stats: NormalizeStats,
}

/// Walk the report rows once, in file order, and build the relational
/// record sets. Surrogate ids are assigned in first-appearance order.
pub fn normalize(rows: &[ReportRow]) -> (Catalog, NormalizeStats) {
    let mut n = Normalizer::default();
    for row in rows {
        n.stats.rows += 1;
        n.process_row(row);
    }
    (n.catalog, n.stats)
}

impl Normalizer {
    fn process_row(&mut self, row: &ReportRow) {
        let song_key = row.song_key.trim();
        if song_key.is_empty() {
            self.stats.rows_missing_key += 1;
            return;
        }

        let song_id = self.song_id_for(song_key, row);

        for name in split_credit(&row.artist) {
            let artist_id = self.artist_id_for(&name);
            // Repeated pairs stay in the list; storage drops them.
            self.catalog.sings.push(SingRecord { artist_id, song_id });
        }

        let series = row.time_series.trim();
        if !series.is_empty() {
            match timeseries::parse_series(series) {
                Ok(observations) => {
                    for obs in observations {
                        self.stats.observations += 1;
                        self.catalog.performances.push(PerformanceRecord {
                            song_id,
                            date: obs.date,
                            streams: obs.streams,
                            popularity: obs.popularity,
                        });
                    }
                }
                Err(e) => {
                    log::debug!("dropping time series for `{song_key}`: {e}");
                    self.stats.rows_bad_series += 1;
                }
            }
        }
    }

    /// Map an external song key to its surrogate id, registering the song on
    /// first sight. First occurrence wins for title, date, and cover URL.
    fn song_id_for(&mut self, key: &str, row: &ReportRow) -> i32 {
        if let Some(&id) = self.song_ids.get(key) {
            return id;
        }
        self.next_song_id += 1;
        let id = self.next_song_id;
        self.song_ids.insert(key.to_string(), id);
        self.catalog.songs.push(SongRecord {
            song_id: id,
            title: row.title.trim().to_string(),
            release_date: clean_release_date(&row.release_date),
            cover_url: row.image_url.trim().to_string(),
        });
        id
    }

    fn artist_id_for(&mut self, name: &str) -> i64 {
        if let Some(&id) = self.artist_ids.get(name) {
            return id;
        }
        self.next_artist_id += 1;
        let id = self.next_artist_id;
        self.artist_ids.insert(name.to_string(), id);
        self.catalog.artists.push(ArtistRecord {
            artist_id: id,
            name: name.to_string(),
        });
        id
    }
}

/// Normalize a raw release date: keep the part before `T`, treat empty and
/// `0000…` sentinels as absent. A leftover that still won't parse as
/// `YYYY-MM-DD` is absent too.
fn clean_release_date(raw: &str) -> Option<NaiveDate> {
    let day = match raw.split_once('T') {
        Some((day, _)) => day,
        None => raw,
    };
    if day.is_empty() || day.starts_with("0000") {
        return None;
    }
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn row(key: &str, title: &str, artist: &str, series: &str) -> ReportRow {
        ReportRow {
            song_key: key.to_string(),
            title: title.to_string(),
            release_date: "2020-05-01T00:00:00".to_string(),
            image_url: "http://covers/a.jpg".to_string(),
            artist: artist.to_string(),
            time_series: series.to_string(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    // === Release dates ===

    #[test]
    fn test_release_date_truncated_at_t() {
        assert_eq!(
            clean_release_date("2020-05-01T00:00:00"),
            Some(date("2020-05-01"))
        );
    }

    #[test]
    fn test_release_date_plain() {
        assert_eq!(clean_release_date("2020-05-01"), Some(date("2020-05-01")));
    }

    #[test]
    fn test_release_date_sentinels_are_absent() {
        assert_eq!(clean_release_date(""), None);
        assert_eq!(clean_release_date("0000-00-00"), None);
        assert_eq!(clean_release_date("0000-00-00T00:00:00"), None);
    }

    #[test]
    fn test_release_date_garbage_is_absent() {
        assert_eq!(clean_release_date("sometime in may"), None);
    }

    // === Songs ===

    #[test]
    fn test_duplicate_key_first_occurrence_wins() {
        let rows = vec![
            row("s1", "First Title", "A", ""),
            row("s1", "Second Title", "A", ""),
        ];
        let (catalog, _) = normalize(&rows);
        assert_eq!(catalog.songs.len(), 1);
        assert_eq!(catalog.songs[0].title, "First Title");
    }

    #[test]
    fn test_song_key_trimmed_before_mapping() {
        let rows = vec![row("  s1  ", "T", "A", ""), row("s1", "T2", "A", "")];
        let (catalog, _) = normalize(&rows);
        assert_eq!(catalog.songs.len(), 1);
    }

    #[test]
    fn test_empty_key_skips_row_and_is_counted() {
        let rows = vec![row("", "T", "A", ""), row("   ", "T", "A", "")];
        let (catalog, stats) = normalize(&rows);
        assert!(catalog.songs.is_empty());
        assert!(catalog.artists.is_empty());
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.rows_missing_key, 2);
    }

    #[test]
    fn test_song_ids_sequential_in_appearance_order() {
        let rows = vec![
            row("s1", "One", "", ""),
            row("s2", "Two", "", ""),
            row("s1", "One again", "", ""),
            row("s3", "Three", "", ""),
        ];
        let (catalog, _) = normalize(&rows);
        let ids: Vec<i32> = catalog.songs.iter().map(|s| s.song_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    // === Artists and sing pairs ===

    #[test]
    fn test_no_artist_string_still_creates_song() {
        let rows = vec![row("s1", "T", "", "")];
        let (catalog, _) = normalize(&rows);
        assert_eq!(catalog.songs.len(), 1);
        assert!(catalog.artists.is_empty());
        assert!(catalog.sings.is_empty());
    }

    #[test]
    fn test_artist_dedup_across_rows() {
        let rows = vec![row("s1", "T", "X & Y", ""), row("s2", "T2", "Y & Z", "")];
        let (catalog, _) = normalize(&rows);
        let names: Vec<&str> = catalog.artists.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_duplicate_sing_pairs_kept_in_memory() {
        // Same key, same artist, two rows: the pair appears twice pre-load.
        let rows = vec![row("s1", "T", "X", ""), row("s1", "T", "X", "")];
        let (catalog, _) = normalize(&rows);
        assert_eq!(catalog.sings.len(), 2);
        assert_eq!(catalog.sings[0], catalog.sings[1]);
    }

    // === Time series ===

    #[test]
    fn test_bad_series_swallowed_and_counted() {
        let rows = vec![row("s1", "T", "X", "not json")];
        let (catalog, stats) = normalize(&rows);
        assert!(catalog.performances.is_empty());
        assert_eq!(stats.rows_bad_series, 1);
        // The row's song and artist processing is unaffected.
        assert_eq!(catalog.songs.len(), 1);
        assert_eq!(catalog.artists.len(), 1);
    }

    #[test]
    fn test_empty_series_is_not_an_error() {
        let rows = vec![row("s1", "T", "X", "  ")];
        let (catalog, stats) = normalize(&rows);
        assert!(catalog.performances.is_empty());
        assert_eq!(stats.rows_bad_series, 0);
    }

    #[test]
    fn test_observation_count() {
        let series = r#"[{"date":"2021-01-01","spotify-streams":"1"},
                         {"date":"2021-01-02","spotify-streams":"2"}]"#;
        let rows = vec![row("s1", "T", "X", series)];
        let (catalog, stats) = normalize(&rows);
        assert_eq!(catalog.performances.len(), 2);
        assert_eq!(stats.observations, 2);
    }

    // === Referential completeness ===

    #[test]
    fn test_every_reference_resolves_pre_load() {
        let rows = vec![
            row("s1", "One", "X & Y feat. Z", r#"[{"date":"2021-01-01"}]"#),
            row("s2", "Two", "Y, W", r#"[{"date":"2021-01-02","spotify-streams":5}]"#),
            row("s1", "dup", "V", ""),
        ];
        let (catalog, _) = normalize(&rows);

        let song_ids: HashSet<i32> = catalog.songs.iter().map(|s| s.song_id).collect();
        let artist_ids: HashSet<i64> = catalog.artists.iter().map(|a| a.artist_id).collect();

        for sing in &catalog.sings {
            assert!(song_ids.contains(&sing.song_id));
            assert!(artist_ids.contains(&sing.artist_id));
        }
        for performance in &catalog.performances {
            assert!(song_ids.contains(&performance.song_id));
        }
    }

    // === End to end ===

    #[test]
    fn test_two_row_report() {
        let rows = vec![
            ReportRow {
                song_key: "s1".to_string(),
                title: "Song One".to_string(),
                release_date: "2020-05-01T00:00:00".to_string(),
                image_url: "http://covers/1.jpg".to_string(),
                artist: "X & Y".to_string(),
                time_series:
                    r#"[{"date":"2021-01-01T00:00:00","spotify-streams":"100","spotify-popularity":"50"}]"#
                        .to_string(),
            },
            ReportRow {
                song_key: "s1".to_string(),
                title: "Song One (duplicate)".to_string(),
                release_date: String::new(),
                image_url: String::new(),
                artist: "Z".to_string(),
                time_series: String::new(),
            },
        ];
        let (catalog, stats) = normalize(&rows);

        assert_eq!(catalog.songs.len(), 1);
        assert_eq!(catalog.songs[0].title, "Song One");
        assert_eq!(catalog.songs[0].release_date, Some(date("2020-05-01")));

        let names: Vec<&str> = catalog.artists.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);

        assert_eq!(catalog.sings.len(), 3);
        let song_id = catalog.songs[0].song_id;
        assert!(catalog.sings.iter().all(|s| s.song_id == song_id));

        assert_eq!(catalog.performances.len(), 1);
        let p = &catalog.performances[0];
        assert_eq!(p.date, date("2021-01-01"));
        assert_eq!(p.streams, Some(100));
        assert_eq!(p.popularity, Some(50));

        assert_eq!(stats.rows, 2);
        assert_eq!(stats.rows_missing_key, 0);
        assert_eq!(stats.rows_bad_series, 0);
        assert_eq!(stats.observations, 1);
    }
}
