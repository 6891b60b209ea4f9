pub mod documents {
    use sea_orm::entity::prelude::*;
    use sea_orm::sea_query::Expr;

    /// Every resource lives in this table, keyed by object id and tagged
    /// with its collection name. `body` holds the resource fields as JSON.
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "documents")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub collection: String,
        #[sea_orm(default_value = 0)]
        pub revision: i64,
        pub body: Json,
        #[sea_orm(default_expr = "Expr::current_timestamp()")]
        pub created_at: DateTimeUtc,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
