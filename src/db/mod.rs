pub mod models;
pub mod queries;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

const DROP_TABLES_SQL: &str = "DROP TABLE IF EXISTS performances, sing, songs, artists CASCADE";

const CREATE_TABLES_SQL: &str = "
    CREATE TABLE artists (
        artist_id   BIGINT PRIMARY KEY,
        name        TEXT NOT NULL UNIQUE
    );
    CREATE TABLE songs (
        song_id      INTEGER PRIMARY KEY,
        title        TEXT,
        release_date DATE,
        cover_url    TEXT
    );
    CREATE TABLE sing (
        artist_id   BIGINT REFERENCES artists(artist_id) ON DELETE CASCADE,
        song_id     INTEGER REFERENCES songs(song_id) ON DELETE CASCADE,
        PRIMARY KEY (artist_id, song_id)
    );
    CREATE TABLE performances (
        song_id     INTEGER REFERENCES songs(song_id) ON DELETE CASCADE,
        date        DATE,
        streams     BIGINT,
        popularity  INTEGER,
        PRIMARY KEY (song_id, date)
    );
";

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL. One linear pipeline, one connection.
    pub async fn connect(options: PgConnectOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Drop and recreate the four report tables in a single transaction.
    /// Destroys any previous contents; a failure rolls the whole unit back.
    pub async fn init_schema(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::raw_sql(DROP_TABLES_SQL).execute(&mut *tx).await?;
        sqlx::raw_sql(CREATE_TABLES_SQL).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Close the pool. Called on every exit path, success or failure.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
