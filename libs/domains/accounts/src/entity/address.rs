use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::customer_address::Entity")]
    CustomerAddress,
}

impl Related<super::customer_address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomerAddress.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Address {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            street: model.street,
            city: model.city,
            state: model.state,
            zipcode: model.zipcode,
        }
    }
}

impl From<crate::models::Address> for ActiveModel {
    fn from(address: crate::models::Address) -> Self {
        ActiveModel {
            id: Set(address.id),
            street: Set(address.street),
            city: Set(address.city),
            state: Set(address.state),
            zipcode: Set(address.zipcode),
        }
    }
}
