use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customer_addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub main_address: bool,
    pub customer_id: Option<Uuid>,
    pub address_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CustomerId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::address::Entity",
        from = "Column::AddressId",
        to = "super::address::Column::Id",
        on_delete = "SetNull"
    )]
    Address,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Address.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_link(self, customer_email: Option<String>) -> crate::models::CustomerAddress {
        crate::models::CustomerAddress {
            id: self.id,
            main_address: self.main_address,
            customer_id: self.customer_id,
            address_id: self.address_id,
            customer_email,
        }
    }
}

impl From<&crate::models::CustomerAddress> for ActiveModel {
    fn from(link: &crate::models::CustomerAddress) -> Self {
        ActiveModel {
            id: Set(link.id),
            main_address: Set(link.main_address),
            customer_id: Set(link.customer_id),
            address_id: Set(link.address_id),
        }
    }
}
