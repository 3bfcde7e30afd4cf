use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "medicines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub name: String,
    #[sea_orm(default_value = 0)]
    pub quantity: i32,
    #[sea_orm(indexed)]
    pub pharmacy_id: Option<Uuid>,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(belongs_to, from = "pharmacy_id", to = "id", on_delete = "SetNull")]
    pub pharmacy: HasOne<super::pharmacy::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

crate::impl_base_entity!();
