use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::entities::menu_item::Entity as MenuItem;
use crate::entities::user::Entity as User;

/// One pending line in a user's cart. The (user, menu item) pair is kept
/// unique by the upsert in the cart routes; `unit_price` is a snapshot of
/// the menu item price at first add, and `price = quantity * unit_price`
/// is recomputed on every mutation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "cart")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub user_id: i32,
    pub menuitem_id: i32,
    pub quantity: u32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub unit_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "User",
        from = "crate::entities::cart::Column::UserId",
        to = "crate::entities::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "MenuItem",
        from = "crate::entities::cart::Column::MenuitemId",
        to = "crate::entities::menu_item::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    MenuItem,
}

impl Related<crate::entities::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<crate::entities::menu_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
