use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub image: Option<String>,
    pub phone_number: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub created_date: DateTimeWithTimeZone,
    pub updated_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_profile(self, user_email: String) -> crate::models::Profile {
        crate::models::Profile {
            id: self.id,
            user_id: self.user_id,
            user_email,
            first_name: self.first_name,
            last_name: self.last_name,
            image: self.image,
            phone_number: self.phone_number,
            description: self.description,
            created_date: self.created_date.into(),
            updated_date: self.updated_date.into(),
        }
    }
}

impl From<&crate::models::Profile> for ActiveModel {
    fn from(profile: &crate::models::Profile) -> Self {
        ActiveModel {
            id: Set(profile.id),
            user_id: Set(profile.user_id),
            first_name: Set(profile.first_name.clone()),
            last_name: Set(profile.last_name.clone()),
            image: Set(profile.image.clone()),
            phone_number: Set(profile.phone_number.clone()),
            description: Set(profile.description.clone()),
            created_date: Set(profile.created_date.into()),
            updated_date: Set(profile.updated_date.into()),
        }
    }
}
