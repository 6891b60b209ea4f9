use chrono::Utc;
use fitlog_domain::model::{Document, ObjectId, Resource};
use fitlog_domain::schema::{apply_patch, validate_document};
use fitlog_domain::storage::{DocumentStore, StorageError, StorageResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde_json::{Map, Value};

use crate::entity::documents;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl<R: Resource> DocumentStore<R> for SeaOrmStorage {
    async fn find_document(&self, id: &ObjectId) -> StorageResult<Option<Document<R>>> {
        let maybe = documents::Entity::find_by_id(id.to_hex())
            .filter(documents::Column::Collection.eq(R::KIND.collection()))
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        maybe.map(model_to_document::<R>).transpose()
    }

    async fn delete_document(&self, id: &ObjectId) -> StorageResult<bool> {
        let result = documents::Entity::delete_many()
            .filter(documents::Column::Id.eq(id.to_hex()))
            .filter(documents::Column::Collection.eq(R::KIND.collection()))
            .exec(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_document(&self, payload: Value) -> StorageResult<Document<R>> {
        let fields: R = validate_document(payload)?;
        let id = ObjectId::generate().map_err(StorageError::from_source)?;
        let document = Document::new(id, fields);
        documents::Entity::insert(document_to_active::<R>(&document)?)
            .exec_without_returning(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(document)
    }

    async fn update_document(
        &self,
        id: &ObjectId,
        patch: Map<String, Value>,
    ) -> StorageResult<Option<Document<R>>> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(StorageError::from_source)?;

        let maybe = documents::Entity::find_by_id(id.to_hex())
            .filter(documents::Column::Collection.eq(R::KIND.collection()))
            .one(&txn)
            .await
            .map_err(StorageError::from_source)?;
        let Some(model) = maybe else {
            return Ok(None);
        };

        let current = model_to_document::<R>(model.clone())?;
        let fields = apply_patch(&current.fields, &patch)?;
        let body = serde_json::to_value(&fields).map_err(StorageError::from_source)?;

        let mut active: documents::ActiveModel = model.into();
        active.body = Set(body);
        active
            .update(&txn)
            .await
            .map_err(StorageError::from_source)?;
        txn.commit().await.map_err(StorageError::from_source)?;

        Ok(Some(Document {
            id: current.id,
            fields,
            revision: current.revision,
        }))
    }

    async fn replace_collection(&self, batch: Vec<Document<R>>) -> StorageResult<u64> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(StorageError::from_source)?;

        documents::Entity::delete_many()
            .filter(documents::Column::Collection.eq(R::KIND.collection()))
            .exec(&txn)
            .await
            .map_err(StorageError::from_source)?;

        let count = batch.len() as u64;
        if !batch.is_empty() {
            let rows = batch
                .iter()
                .map(document_to_active::<R>)
                .collect::<StorageResult<Vec<_>>>()?;
            documents::Entity::insert_many(rows)
                .exec_without_returning(&txn)
                .await
                .map_err(StorageError::from_source)?;
        }

        txn.commit().await.map_err(StorageError::from_source)?;
        Ok(count)
    }
}

fn document_to_active<R: Resource>(
    document: &Document<R>,
) -> StorageResult<documents::ActiveModel> {
    let body = serde_json::to_value(&document.fields).map_err(StorageError::from_source)?;
    Ok(documents::ActiveModel {
        id: Set(document.id.to_hex()),
        collection: Set(R::KIND.collection().to_string()),
        revision: Set(document.revision),
        body: Set(body),
        created_at: Set(Utc::now()),
    })
}

fn model_to_document<R: Resource>(model: documents::Model) -> StorageResult<Document<R>> {
    let id = ObjectId::parse(&model.id).map_err(|err| {
        StorageError::Database(format!("corrupt {} id `{}`: {err}", R::KIND, model.id))
    })?;
    let fields: R = serde_json::from_value(model.body).map_err(|err| {
        StorageError::Database(format!("corrupt {} document {id}: {err}", R::KIND))
    })?;

    Ok(Document {
        id,
        fields,
        revision: model.revision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitlog_domain::model::{Exercise, User, Workout};
    use fitlog_domain::schema::SchemaError;
    use serde_json::json;

    async fn storage() -> SeaOrmStorage {
        SeaOrmStorage::connect("sqlite::memory:")
            .await
            .expect("storage inits")
    }

    fn missing_id() -> ObjectId {
        ObjectId::parse("000000000000000000000000").unwrap()
    }

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    async fn insert_james(storage: &SeaOrmStorage) -> Document<User> {
        DocumentStore::<User>::insert_document(
            storage,
            json!({"username": "James", "password": "verysecurepassword66", "weight": 80}),
        )
        .await
        .expect("user inserts")
    }

    #[tokio::test]
    async fn insert_then_find_round_trips() {
        let storage = storage().await;
        let created = insert_james(&storage).await;
        assert_eq!(created.revision, 0);

        let found: Option<Document<User>> = storage.find_document(&created.id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn insert_rejects_schema_violations() {
        let storage = storage().await;
        let err = DocumentStore::<User>::insert_document(&storage, json!({"password": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Schema(_)));
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let storage = storage().await;
        let user = insert_james(&storage).await;
        let as_exercise: Option<Document<Exercise>> =
            storage.find_document(&user.id).await.unwrap();
        assert!(as_exercise.is_none());
        assert!(!DocumentStore::<Workout>::delete_document(&storage, &user.id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn delete_reports_absence_on_second_call() {
        let storage = storage().await;
        let user = insert_james(&storage).await;
        assert!(DocumentStore::<User>::delete_document(&storage, &user.id)
            .await
            .unwrap());
        assert!(!DocumentStore::<User>::delete_document(&storage, &user.id)
            .await
            .unwrap());
        let found: Option<Document<User>> = storage.find_document(&user.id).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let storage = storage().await;
        let user = insert_james(&storage).await;
        let updated: Document<User> = storage
            .update_document(&user.id, patch(json!({"weight": 85})))
            .await
            .unwrap()
            .expect("user exists");
        assert_eq!(updated.fields.weight, Some(85.into()));
        assert_eq!(updated.fields.username, "James");

        let stored: Document<User> = storage.find_document(&user.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn update_of_missing_document_is_none() {
        let storage = storage().await;
        let updated: Option<Document<User>> = storage
            .update_document(&missing_id(), patch(json!({"weight": 85})))
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn invalid_update_leaves_document_unchanged() {
        let storage = storage().await;
        let user = insert_james(&storage).await;
        let err = DocumentStore::<User>::update_document(
            &storage,
            &user.id,
            patch(json!({"username": ""})),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err,
            StorageError::Schema(SchemaError::MissingRequired { field: "username" })
        );

        let stored: Document<User> = storage.find_document(&user.id).await.unwrap().unwrap();
        assert_eq!(stored, user);
    }

    #[tokio::test]
    async fn replace_collection_swaps_contents() {
        let storage = storage().await;
        let stale = insert_james(&storage).await;
        let seeded = Document::new(
            ObjectId::parse("679b70c0ebe324047c9ca19d").unwrap(),
            User {
                username: "user1".into(),
                password: "password123".into(),
                weight: Some(70.into()),
            },
        );

        let count = storage
            .replace_collection(vec![seeded.clone()])
            .await
            .unwrap();
        assert_eq!(count, 1);

        let gone: Option<Document<User>> = storage.find_document(&stale.id).await.unwrap();
        assert!(gone.is_none());
        let found: Option<Document<User>> = storage.find_document(&seeded.id).await.unwrap();
        assert_eq!(found, Some(seeded));

        let emptied = DocumentStore::<User>::replace_collection(&storage, Vec::new())
            .await
            .unwrap();
        assert_eq!(emptied, 0);
    }
}
