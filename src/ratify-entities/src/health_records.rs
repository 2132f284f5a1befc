use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "health_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub time: DateTime,
    pub heart_rate: i16,
    pub respiratory_rate: i16,
    #[sea_orm(column_type = "Float")]
    pub nausea: f32,
    #[sea_orm(column_type = "Float")]
    pub headache: f32,
    #[sea_orm(column_type = "Float")]
    pub diarrhea: f32,
    #[sea_orm(column_type = "Float")]
    pub sore_throat: f32,
    #[sea_orm(column_type = "Float")]
    pub fever: f32,
    #[sea_orm(column_type = "Float")]
    pub muscle_ache: f32,
    #[sea_orm(column_type = "Float")]
    pub loss_of_smell_or_taste: f32,
    #[sea_orm(column_type = "Float")]
    pub cough: f32,
    #[sea_orm(column_type = "Float")]
    pub shortness_of_breath: f32,
    #[sea_orm(column_type = "Float")]
    pub feeling_tired: f32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
