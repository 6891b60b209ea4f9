use sea_orm::sea_query::{ColumnDef, Expr, Index, Table};
use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::entity::documents;
use fitlog_domain::storage::{StorageError, StorageResult};

pub async fn run_migrations(db: &DatabaseConnection) -> StorageResult<()> {
    let backend = db.get_database_backend();

    let documents_table = Table::create()
        .if_not_exists()
        .table(documents::Entity)
        .col(
            ColumnDef::new(documents::Column::Id)
                .string_len(24)
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(documents::Column::Collection)
                .string_len(32)
                .not_null(),
        )
        .col(
            ColumnDef::new(documents::Column::Revision)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(ColumnDef::new(documents::Column::Body).json().not_null())
        .col(
            ColumnDef::new(documents::Column::CreatedAt)
                .date_time()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned();
    db.execute(backend.build(&documents_table))
        .await
        .map_err(StorageError::from_source)?;

    let collection_index = Index::create()
        .if_not_exists()
        .name("idx_documents_collection")
        .table(documents::Entity)
        .col(documents::Column::Collection)
        .to_owned();
    db.execute(backend.build(&collection_index))
        .await
        .map_err(StorageError::from_source)?;

    Ok(())
}
