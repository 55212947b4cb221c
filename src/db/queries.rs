use super::models::{LoadStats, TableCount};
use super::{Database, Result};
use crate::normalize::Catalog;

impl Database {
    /// Insert a whole catalog in one transaction: artists, then songs, then
    /// sing pairs, then performances. Rows that collide on a primary key are
    /// silently dropped, never updated. Any failure rolls everything back.
    pub async fn load_catalog(&self, catalog: &Catalog) -> Result<LoadStats> {
        let mut tx = self.pool.begin().await?;
        let mut stats = LoadStats::default();

        for artist in &catalog.artists {
            let inserted = sqlx::query(
                "INSERT INTO artists (artist_id, name) VALUES ($1, $2)
                 ON CONFLICT (artist_id) DO NOTHING",
            )
            .bind(artist.artist_id)
            .bind(&artist.name)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if inserted > 0 {
                stats.artists_inserted += 1;
            } else {
                stats.artists_skipped += 1;
            }
        }

        for song in &catalog.songs {
            let inserted = sqlx::query(
                "INSERT INTO songs (song_id, title, release_date, cover_url)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (song_id) DO NOTHING",
            )
            .bind(song.song_id)
            .bind(&song.title)
            .bind(song.release_date)
            .bind(&song.cover_url)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if inserted > 0 {
                stats.songs_inserted += 1;
            } else {
                stats.songs_skipped += 1;
            }
        }

        for sing in &catalog.sings {
            let inserted = sqlx::query(
                "INSERT INTO sing (artist_id, song_id) VALUES ($1, $2)
                 ON CONFLICT (artist_id, song_id) DO NOTHING",
            )
            .bind(sing.artist_id)
            .bind(sing.song_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if inserted > 0 {
                stats.sings_inserted += 1;
            } else {
                stats.sings_skipped += 1;
            }
        }

        for performance in &catalog.performances {
            let inserted = sqlx::query(
                "INSERT INTO performances (song_id, date, streams, popularity)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (song_id, date) DO NOTHING",
            )
            .bind(performance.song_id)
            .bind(performance.date)
            .bind(performance.streams)
            .bind(performance.popularity)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if inserted > 0 {
                stats.performances_inserted += 1;
            } else {
                stats.performances_skipped += 1;
            }
        }

        tx.commit().await?;
        Ok(stats)
    }

    /// Row counts for the four report tables.
    pub async fn table_counts(&self) -> Result<Vec<TableCount>> {
        let mut counts = Vec::new();
        for table in ["artists", "songs", "sing", "performances"] {
            let rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&self.pool)
                .await?;
            counts.push(TableCount { table, rows });
        }
        Ok(counts)
    }
}
