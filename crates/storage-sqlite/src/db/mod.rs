use log::{error, info};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use diesel::connection::{Connection, SimpleConnection};
use diesel::r2d2;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use eventcover_core::errors::{DatabaseError, Error, Result};
use eventcover_core::maintenance::BackupArtifact;

use crate::errors::IntoCore;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub mod write_actor;
pub use write_actor::{spawn_writer, WriteHandle};

/// Prepares the database file at `db_path`, creating its directory and
/// switching the journal to WAL.
pub fn init(db_path: &str) -> Result<String> {
    if let Some(db_dir) = Path::new(db_path).parent() {
        if !db_dir.as_os_str().is_empty() && !db_dir.exists() {
            fs::create_dir_all(db_dir)?;
        }
    }

    {
        let mut conn = SqliteConnection::establish(db_path).map_err(|e| {
            Error::Database(DatabaseError::ConnectionFailed(e.to_string()))
        })?;
        conn.batch_execute(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 30000;
            PRAGMA synchronous  = NORMAL;
        ",
        )
        .into_core()?;
    }

    Ok(db_path.to_string())
}

pub fn create_pool(db_path: &str) -> Result<Arc<DbPool>> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    let pool = r2d2::Pool::builder()
        .max_size(8)
        .min_idle(Some(1))
        .connection_timeout(std::time::Duration::from_secs(30))
        .connection_customizer(Box::new(ConnectionCustomizer {}))
        .build(manager)
        .map_err(|e| Error::Database(DatabaseError::PoolCreationFailed(e.to_string())))?;
    Ok(Arc::new(pool))
}

pub fn run_migrations(pool: &DbPool) -> Result<()> {
    info!("Running database migrations");
    let mut connection = get_connection(pool)?;

    let result = connection.run_pending_migrations(MIGRATIONS).map_err(|e| {
        error!("Database migration failed: {}", e);
        Error::Database(DatabaseError::MigrationFailed(e.to_string()))
    })?;

    if result.is_empty() {
        info!("No pending migrations to apply.");
    } else {
        info!("Applied the following migrations:");
        for migration_version in &result {
            info!("  - {}", migration_version);
        }
    }

    Ok(())
}

/// Gets a connection from the pool
pub fn get_connection(pool: &Pool<ConnectionManager<SqliteConnection>>) -> Result<DbConnection> {
    pool.get().into_core()
}

fn backup_error(err: impl std::fmt::Display) -> Error {
    Error::Database(DatabaseError::BackupFailed(err.to_string()))
}

/// Copies the database and its WAL/SHM companions into `backup_dir` as
/// `<file_stem>.db`. The checksum covers the main file only.
pub fn backup_database(db_path: &str, backup_dir: &str, file_stem: &str) -> Result<BackupArtifact> {
    if !Path::new(db_path).exists() {
        return Err(backup_error(format!("Database file {} not found", db_path)));
    }

    fs::create_dir_all(backup_dir).map_err(|e| {
        error!("Failed to create backup directory: {}", e);
        backup_error(e)
    })?;

    let backup_path: PathBuf = Path::new(backup_dir).join(format!("{}.db", file_stem));
    let backup_path_str = backup_path.to_string_lossy().to_string();

    info!("Creating database backup from {} to {}", db_path, backup_path_str);

    let size_bytes = fs::copy(db_path, &backup_path).map_err(|e| {
        error!("Failed to create database backup: {}", e);
        backup_error(e)
    })?;

    for suffix in ["-wal", "-shm"] {
        let source = format!("{}{}", db_path, suffix);
        let target = format!("{}{}", backup_path_str, suffix);
        if Path::new(&source).exists() {
            fs::copy(&source, &target).map_err(|e| {
                error!("Failed to copy {} file: {}", suffix.trim_start_matches('-'), e);
                backup_error(e)
            })?;
        }
    }

    let checksum = file_checksum(&backup_path).map_err(backup_error)?;

    info!("Database backup created successfully (including WAL/SHM files if present)");
    Ok(BackupArtifact {
        file_path: backup_path_str,
        size_bytes: size_bytes as i64,
        checksum,
    })
}

/// Removes a backup file together with its WAL/SHM companions.
pub fn remove_backup_files(file_path: &str) -> Result<()> {
    for path in [
        file_path.to_string(),
        format!("{}-wal", file_path),
        format!("{}-shm", file_path),
    ] {
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                error!("Failed to remove backup file {}: {}", path, e);
                return Err(e.into());
            }
        }
    }
    Ok(())
}

/// Hex-encoded SHA-256 of a file.
pub fn file_checksum(path: &Path) -> std::io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[derive(Debug)]
struct ConnectionCustomizer;

impl r2d2::CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionCustomizer {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 30000;
            PRAGMA synchronous = NORMAL;
        ",
        )
        .map_err(diesel::r2d2::Error::QueryError)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_backup_copies_database_and_checksums_it() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("app.db");
        let db_path_str = db_path.to_string_lossy().to_string();
        init(&db_path_str).unwrap();
        let pool = create_pool(&db_path_str).unwrap();
        run_migrations(&pool).unwrap();

        let backup_dir = temp_dir.path().join("backups");
        let artifact = backup_database(
            &db_path_str,
            &backup_dir.to_string_lossy(),
            "backup-daily-20260101-020000",
        )
        .unwrap();

        assert!(artifact.file_path.ends_with("backup-daily-20260101-020000.db"));
        assert!(Path::new(&artifact.file_path).exists());
        assert!(artifact.size_bytes > 0);
        assert_eq!(artifact.checksum.len(), 64);
        assert_eq!(
            artifact.checksum,
            file_checksum(Path::new(&artifact.file_path)).unwrap()
        );

        remove_backup_files(&artifact.file_path).unwrap();
        assert!(!Path::new(&artifact.file_path).exists());
        // Removing twice is fine.
        remove_backup_files(&artifact.file_path).unwrap();
    }

    #[test]
    fn test_backup_of_missing_database_fails() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("missing.db");
        let err = backup_database(
            &missing.to_string_lossy(),
            &temp_dir.path().to_string_lossy(),
            "backup",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Database(DatabaseError::BackupFailed(_))
        ));
    }
}
