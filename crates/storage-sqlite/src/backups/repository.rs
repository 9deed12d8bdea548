use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use eventcover_core::errors::Result;
use eventcover_core::maintenance::{
    BackupArtifact, BackupRecord, BackupRepositoryTrait, NewBackupRecord,
};

use super::model::BackupDB;
use crate::db::{self, get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::backups;
use crate::utils::{new_id, now};

pub struct BackupRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
    db_path: String,
}

impl BackupRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
        db_path: impl Into<String>,
    ) -> Self {
        BackupRepository {
            pool,
            writer,
            db_path: db_path.into(),
        }
    }
}

#[async_trait]
impl BackupRepositoryTrait for BackupRepository {
    async fn create_backup(&self, backup_dir: &str, file_stem: &str) -> Result<BackupArtifact> {
        let db_path = self.db_path.clone();
        let backup_dir = backup_dir.to_string();
        let file_stem = file_stem.to_string();
        // Copy on the writer so no write lands mid-copy.
        self.writer
            .exec(move |_conn: &mut SqliteConnection| -> Result<BackupArtifact> {
                db::backup_database(&db_path, &backup_dir, &file_stem)
            })
            .await
    }

    async fn remove_backup_files(&self, file_path: &str) -> Result<()> {
        db::remove_backup_files(file_path)
    }

    async fn record(&self, record: NewBackupRecord) -> Result<BackupRecord> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<BackupRecord> {
                let row = BackupDB::new(new_id(), record, now());
                diesel::insert_into(backups::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(BackupRecord::from(row))
            })
            .await
    }

    async fn delete_record(&self, backup_id: &str) -> Result<usize> {
        let backup_id = backup_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(backups::table.find(backup_id.as_str()))
                    .execute(conn)
                    .into_core()
            })
            .await
    }

    fn list(&self) -> Result<Vec<BackupRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = backups::table
            .order(backups::created_at.desc())
            .select(BackupDB::as_select())
            .load::<BackupDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(BackupRecord::from).collect())
    }

    fn list_expired(&self, now: NaiveDateTime) -> Result<Vec<BackupRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = backups::table
            .filter(backups::expires_at.lt(now))
            .order(backups::expires_at.asc())
            .select(BackupDB::as_select())
            .load::<BackupDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(BackupRecord::from).collect())
    }
}
