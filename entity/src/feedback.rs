use sea_orm::prelude::{DateTimeWithTimeZone, *};

/// One employee's submission. `name` is the idempotence key: the unique
/// index rejects a second row for the same submitter.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "feedback")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub department: String,
    pub work_environment: i16,
    pub management: i16,
    pub work_life_balance: i16,
    pub development_potential: i16,
    pub overall: i16,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("no relations")
    }
}

impl ActiveModelBehavior for ActiveModel {}
