//! PostgreSQL-backed [`DeliveryNoteRepository`].
//!
//! Signing, deletion and PDF caching are single conditional statements.
//! When a statement touches no row, a follow-up read tells a missing note
//! apart from one whose state already moved on.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{DeleteOutcome, DeliveryNoteRepository, SignOutcome, StoreError};
use crate::domain::{DeliveryNote, DeliveryNoteId, UserId};

use super::diesel_error_mapping::map_diesel_error;
use super::models::DeliveryNoteRow;
use super::pool::DbPool;
use super::schema::delivery_notes;

#[derive(Clone)]
pub struct DieselDeliveryNoteRepository {
    pool: DbPool,
}

impl DieselDeliveryNoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Signed flag of an owned note, `None` when absent.
    async fn signed_flag(&self, owner: Uuid, id: Uuid) -> Result<Option<bool>, StoreError> {
        let mut conn = self.pool.get().await?;
        delivery_notes::table
            .filter(delivery_notes::id.eq(id))
            .filter(delivery_notes::owner_id.eq(owner))
            .select(delivery_notes::is_signed)
            .first::<bool>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "read note state"))
    }
}

#[async_trait]
impl DeliveryNoteRepository for DieselDeliveryNoteRepository {
    async fn insert(&self, note: &DeliveryNote) -> Result<(), StoreError> {
        let row = DeliveryNoteRow::try_from(note)?;
        let mut conn = self.pool.get().await?;
        diesel::insert_into(delivery_notes::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "insert delivery note"))?;
        Ok(())
    }

    async fn find(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
    ) -> Result<Option<DeliveryNote>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = delivery_notes::table
            .filter(delivery_notes::id.eq(id.as_uuid()))
            .filter(delivery_notes::owner_id.eq(owner.as_uuid()))
            .select(DeliveryNoteRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find delivery note"))?;
        row.map(DeliveryNote::try_from).transpose()
    }

    async fn list(&self, owner: &UserId) -> Result<Vec<DeliveryNote>, StoreError> {
        let mut conn = self.pool.get().await?;
        let rows = delivery_notes::table
            .filter(delivery_notes::owner_id.eq(owner.as_uuid()))
            .order(delivery_notes::created_at.asc())
            .select(DeliveryNoteRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list delivery notes"))?;
        rows.into_iter().map(DeliveryNote::try_from).collect()
    }

    async fn mark_signed(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
        signature_url: &str,
    ) -> Result<SignOutcome, StoreError> {
        let (owner, id) = (*owner.as_uuid(), *id.as_uuid());
        let updated = {
            let mut conn = self.pool.get().await?;
            diesel::update(
                delivery_notes::table
                    .filter(delivery_notes::id.eq(id))
                    .filter(delivery_notes::owner_id.eq(owner))
                    .filter(delivery_notes::is_signed.eq(false)),
            )
            .set((
                delivery_notes::is_signed.eq(true),
                delivery_notes::signature_url.eq(signature_url),
            ))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "sign delivery note"))?
        };
        if updated > 0 {
            return Ok(SignOutcome::Signed);
        }
        Ok(match self.signed_flag(owner, id).await? {
            Some(_) => SignOutcome::AlreadySigned,
            None => SignOutcome::NotFound,
        })
    }

    async fn delete_unsigned(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
    ) -> Result<DeleteOutcome, StoreError> {
        let (owner, id) = (*owner.as_uuid(), *id.as_uuid());
        let deleted = {
            let mut conn = self.pool.get().await?;
            diesel::delete(
                delivery_notes::table
                    .filter(delivery_notes::id.eq(id))
                    .filter(delivery_notes::owner_id.eq(owner))
                    .filter(delivery_notes::is_signed.eq(false)),
            )
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete delivery note"))?
        };
        if deleted > 0 {
            return Ok(DeleteOutcome::Deleted);
        }
        Ok(match self.signed_flag(owner, id).await? {
            Some(_) => DeleteOutcome::Signed,
            None => DeleteOutcome::NotFound,
        })
    }

    async fn cache_pdf_url(
        &self,
        owner: &UserId,
        id: &DeliveryNoteId,
        pdf_url: &str,
    ) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await?;
        let updated = diesel::update(
            delivery_notes::table
                .filter(delivery_notes::id.eq(id.as_uuid()))
                .filter(delivery_notes::owner_id.eq(owner.as_uuid()))
                .filter(delivery_notes::pdf_url.is_null()),
        )
        .set(delivery_notes::pdf_url.eq(pdf_url))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, "cache delivery note pdf"))?;
        Ok(updated > 0)
    }
}
