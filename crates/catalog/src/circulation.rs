//! Circulation: lending, renewing and returning copies

use crate::error::{CatalogError, Result};
use chrono::NaiveDate;
use libris_core::{Borrow, BorrowId, BorrowStatus, PhysicalBookId, ReaderId};
use libris_database::{queries, DbPool};
use log::info;

/// A borrow together with its status derived for one reference date
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BorrowEntry {
    pub borrow: Borrow,
    pub status: BorrowStatus,
}

/// Circulation workflow over the persisted borrows
pub struct CirculationManager {
    pool: DbPool,
}

impl CirculationManager {
    pub fn with_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Lends a copy to a reader. Fails validation when the copy is
    /// already out.
    pub async fn borrow(
        &self,
        copy_id: PhysicalBookId,
        reader_id: ReaderId,
        date_borrow: NaiveDate,
    ) -> Result<Borrow> {
        let borrow = Borrow::new(copy_id, reader_id, date_borrow);
        queries::create_borrow(&self.pool, &borrow).await?;
        info!("Borrow {} opened for copy {}", borrow.id, copy_id);
        Ok(borrow)
    }

    /// Lends the copy with this circulation number
    pub async fn borrow_by_physical_id(
        &self,
        physical_id: i64,
        reader_id: ReaderId,
        date_borrow: NaiveDate,
    ) -> Result<Borrow> {
        let copy = queries::get_copy_by_physical_id(&self.pool, physical_id)
            .await
            .map_err(|_| CatalogError::CopyNotFound(physical_id.to_string()))?;
        self.borrow(copy.id, reader_id, date_borrow).await
    }

    /// Grants one more week on an open borrow
    pub async fn renew(&self, id: BorrowId) -> Result<Borrow> {
        let borrow = queries::renew_borrow(&self.pool, id).await?;
        info!(
            "Borrow {} renewed, due {}",
            borrow.id,
            borrow.due_date()
        );
        Ok(borrow)
    }

    /// Records the return of the copy
    pub async fn return_copy(&self, id: BorrowId, date_return: NaiveDate) -> Result<Borrow> {
        let borrow = queries::mark_returned(&self.pool, id, date_return).await?;
        info!("Borrow {} closed on {}", borrow.id, date_return);
        Ok(borrow)
    }

    /// The open borrow for a copy, if any
    pub async fn open_borrow_for(&self, copy_id: PhysicalBookId) -> Result<Option<Borrow>> {
        Ok(queries::find_open_borrow_for(&self.pool, copy_id).await?)
    }

    /// Lists borrows with their status as of `today`, optionally
    /// keeping only one status
    pub async fn list(
        &self,
        filter: Option<BorrowStatus>,
        today: NaiveDate,
    ) -> Result<Vec<BorrowEntry>> {
        let borrows = queries::list_borrows(&self.pool).await?;

        Ok(borrows
            .into_iter()
            .map(|borrow| {
                let status = borrow.status_on(today);
                BorrowEntry { borrow, status }
            })
            .filter(|entry| filter.map_or(true, |wanted| entry.status == wanted))
            .collect())
    }
}
