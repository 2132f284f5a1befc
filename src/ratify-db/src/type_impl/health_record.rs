use std::fmt::Display;

use chrono::NaiveDateTime;
use ratify_entities::health_records;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::{DatabaseHandler, Symptom, SymptomRatings};

/// One measurement session: the vitals taken plus the symptoms reported
/// alongside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub time: NaiveDateTime,
    pub heart_rate: u8,
    pub respiratory_rate: u8,
    pub symptoms: SymptomRatings,
}

impl Display for HealthRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: HR {} BPM, RR {} BPM, {}",
            self.time.format("%Y-%m-%d %H:%M:%S"),
            self.heart_rate,
            self.respiratory_rate,
            self.symptoms
        )
    }
}

#[derive(Default, Debug)]
pub struct SearchHealthRecords {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
    pub limit: Option<u64>,
}

impl SearchHealthRecords {
    pub(crate) fn conditions(self) -> Condition {
        Condition::all()
            .add_option(self.from.map(|from| health_records::Column::Time.gte(from)))
            .add_option(self.to.map(|to| health_records::Column::Time.lt(to)))
    }
}

impl DatabaseHandler {
    pub async fn create_health_record(
        &self,
        record: &HealthRecord,
    ) -> anyhow::Result<health_records::Model> {
        let symptoms = &record.symptoms;
        let model = health_records::ActiveModel {
            id: NotSet,
            time: Set(record.time),
            heart_rate: Set(i16::from(record.heart_rate)),
            respiratory_rate: Set(i16::from(record.respiratory_rate)),
            nausea: Set(symptoms.get(Symptom::Nausea)),
            headache: Set(symptoms.get(Symptom::Headache)),
            diarrhea: Set(symptoms.get(Symptom::Diarrhea)),
            sore_throat: Set(symptoms.get(Symptom::SoreThroat)),
            fever: Set(symptoms.get(Symptom::Fever)),
            muscle_ache: Set(symptoms.get(Symptom::MuscleAche)),
            loss_of_smell_or_taste: Set(symptoms.get(Symptom::LossOfSmellOrTaste)),
            cough: Set(symptoms.get(Symptom::Cough)),
            shortness_of_breath: Set(symptoms.get(Symptom::ShortnessOfBreath)),
            feeling_tired: Set(symptoms.get(Symptom::FeelingTired)),
        };

        let model = model.insert(&self.db).await?;
        debug!("Saved health record {}", model.id);
        Ok(model)
    }

    pub async fn search_health_records(
        &self,
        options: SearchHealthRecords,
    ) -> anyhow::Result<Vec<HealthRecord>> {
        let limit = options.limit;
        let records = health_records::Entity::find()
            .filter(options.conditions())
            .limit(limit)
            .order_by_asc(health_records::Column::Time)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Self::parse_record)
            .collect();

        Ok(records)
    }

    /// Returns the number of records removed.
    pub async fn delete_all_health_records(&self) -> anyhow::Result<u64> {
        let result = health_records::Entity::delete_many()
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    fn parse_record(model: health_records::Model) -> HealthRecord {
        let symptoms = [
            (Symptom::Nausea, model.nausea),
            (Symptom::Headache, model.headache),
            (Symptom::Diarrhea, model.diarrhea),
            (Symptom::SoreThroat, model.sore_throat),
            (Symptom::Fever, model.fever),
            (Symptom::MuscleAche, model.muscle_ache),
            (Symptom::LossOfSmellOrTaste, model.loss_of_smell_or_taste),
            (Symptom::Cough, model.cough),
            (Symptom::ShortnessOfBreath, model.shortness_of_breath),
            (Symptom::FeelingTired, model.feeling_tired),
        ];

        HealthRecord {
            time: model.time,
            heart_rate: model.heart_rate.try_into().unwrap_or(u8::MAX),
            respiratory_rate: model.respiratory_rate.try_into().unwrap_or(u8::MAX),
            symptoms: symptoms.into_iter().collect(),
        }
    }
}
