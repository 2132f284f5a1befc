use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use anyhow::{anyhow, ensure};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    Nausea,
    Headache,
    Diarrhea,
    SoreThroat,
    Fever,
    MuscleAche,
    LossOfSmellOrTaste,
    Cough,
    ShortnessOfBreath,
    FeelingTired,
}

/// Severity per symptom on a 0-5 scale. Unrated symptoms read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymptomRatings(BTreeMap<Symptom, f32>);

impl SymptomRatings {
    pub const MAX_RATING: f32 = 5.0;

    pub fn set(&mut self, symptom: Symptom, rating: f32) {
        let rating = if rating.is_nan() {
            0.0
        } else {
            rating.clamp(0.0, Self::MAX_RATING)
        };

        if rating > 0.0 {
            self.0.insert(symptom, rating);
        } else {
            self.0.remove(&symptom);
        }
    }

    pub fn get(&self, symptom: Symptom) -> f32 {
        self.0.get(&symptom).copied().unwrap_or_default()
    }

    /// Every symptom with its rating, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Symptom, f32)> + '_ {
        Symptom::iter().map(|symptom| (symptom, self.get(symptom)))
    }

    pub fn reported(&self) -> impl Iterator<Item = (Symptom, f32)> + '_ {
        self.0.iter().map(|(&symptom, &rating)| (symptom, rating))
    }
}

impl FromIterator<(Symptom, f32)> for SymptomRatings {
    fn from_iter<T: IntoIterator<Item = (Symptom, f32)>>(iter: T) -> Self {
        let mut ratings = Self::default();
        for (symptom, rating) in iter {
            ratings.set(symptom, rating);
        }
        ratings
    }
}

impl FromIterator<SymptomRating> for SymptomRatings {
    fn from_iter<T: IntoIterator<Item = SymptomRating>>(iter: T) -> Self {
        iter.into_iter().map(|r| (r.symptom, r.rating)).collect()
    }
}

impl Display for SymptomRatings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reported = self
            .reported()
            .map(|(symptom, rating)| format!("{symptom}={rating}"))
            .collect::<Vec<_>>();

        if reported.is_empty() {
            write!(f, "no symptoms")
        } else {
            write!(f, "{}", reported.join(", "))
        }
    }
}

/// A single `symptom=rating` pair, as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymptomRating {
    pub symptom: Symptom,
    pub rating: f32,
}

impl FromStr for SymptomRating {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, rating) = s
            .split_once('=')
            .ok_or(anyhow!("Expected `symptom=rating`, got `{s}`"))?;

        let name = name.trim().replace([' ', '-'], "_");
        let symptom = name
            .parse::<Symptom>()
            .map_err(|_| anyhow!("Unknown symptom: `{name}`"))?;

        let rating = rating
            .trim()
            .parse::<f32>()
            .map_err(|_| anyhow!("Invalid rating: `{rating}`"))?;
        ensure!(
            (0.0..=SymptomRatings::MAX_RATING).contains(&rating),
            "Rating must be between 0 and {}",
            SymptomRatings::MAX_RATING
        );

        Ok(Self { symptom, rating })
    }
}
