//! Resolves the onboarding form's answers into a fixed-shape profile.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::PipelineError;
use crate::extract::AnswerMap;

/// Stand-in for any answer the profile cannot find.
pub const NOT_PROVIDED: &str = "Not provided";

/// Every question of the onboarding form the prompt depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Birthdate,
    Height,
    Weight,
    Gender,
    FitnessGoals,
    FitnessLevel,
    ExerciseFrequency,
    WorkoutDuration,
    WeightliftingDuration,
    NumberOfExercises,
    SetsReps,
    SetsRepsCustom,
    WorkoutLocation,
    GymName,
    AvailableEquipment,
    OtherEquipment,
    CurrentCardio,
    IncludeCardio,
    CardioFrequency,
    CardioLength,
    PreferredCardioTypes,
    PhysicalInjuries,
    InjuryDetails,
}

impl ProfileField {
    pub const ALL: [ProfileField; 23] = [
        Self::Birthdate,
        Self::Height,
        Self::Weight,
        Self::Gender,
        Self::FitnessGoals,
        Self::FitnessLevel,
        Self::ExerciseFrequency,
        Self::WorkoutDuration,
        Self::WeightliftingDuration,
        Self::NumberOfExercises,
        Self::SetsReps,
        Self::SetsRepsCustom,
        Self::WorkoutLocation,
        Self::GymName,
        Self::AvailableEquipment,
        Self::OtherEquipment,
        Self::CurrentCardio,
        Self::IncludeCardio,
        Self::CardioFrequency,
        Self::CardioLength,
        Self::PreferredCardioTypes,
        Self::PhysicalInjuries,
        Self::InjuryDetails,
    ];

    /// Typeform field id of the question. Editing the form means editing this table.
    pub fn field_id(self) -> &'static str {
        match self {
            Self::Birthdate => "VYsICm8rAEYx",
            Self::Height => "Ie0vINxRmbiE",
            Self::Weight => "U00Hv7HSJJE1",
            Self::Gender => "7NgJc6n3fYKa",
            Self::FitnessGoals => "EKEiaNAbhs9B",
            Self::FitnessLevel => "dN0leyRXTKwb",
            Self::ExerciseFrequency => "v3luF8GH8oTn",
            Self::WorkoutDuration => "4qftExcBXdrX",
            Self::WeightliftingDuration => "wORIrsd4ZVLR",
            Self::NumberOfExercises => "nY5mGGjAbXgZ",
            Self::SetsReps => "VYFQXGfIQyAy",
            Self::SetsRepsCustom => "hLOuuzKYATVt",
            Self::WorkoutLocation => "umri0ewHbWux",
            Self::GymName => "fStabAHHt7Hw",
            Self::AvailableEquipment => "9CnfCXmUgSXo",
            Self::OtherEquipment => "F0T49AYX7sf2",
            Self::CurrentCardio => "zYfBaTZMNkFI",
            Self::IncludeCardio => "lKUgraPL2qDa",
            Self::CardioFrequency => "ZRYPo085Loaz",
            Self::CardioLength => "L5vTS0xxncEz",
            Self::PreferredCardioTypes => "qu9e790LtDZh",
            Self::PhysicalInjuries => "zp6cr5EGryS5",
            Self::InjuryDetails => "TDFLXROBWg4r",
        }
    }
}

/// Answer for `field_id`, or [`NOT_PROVIDED`] when the form did not define it.
pub fn resolve(pairs: &AnswerMap, field_id: &str) -> String {
    pairs
        .get(field_id)
        .map(|pair| pair.answer.clone())
        .unwrap_or_else(|| NOT_PROVIDED.to_string())
}

/// Whole years between `birthdate` (`YYYY-MM-DD`) and `reference`.
pub fn compute_age(birthdate: &str, reference: NaiveDate) -> Result<i32, PipelineError> {
    let born = NaiveDate::parse_from_str(birthdate, "%Y-%m-%d").map_err(|e| {
        PipelineError::InvalidBirthdate {
            birthdate: birthdate.to_string(),
            reason: e.to_string(),
        }
    })?;
    let birthday_pending = (reference.month(), reference.day()) < (born.month(), born.day());
    Ok(reference.year() - born.year() - i32::from(birthday_pending))
}

/// Names held by the identity store, not by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonName {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProfile {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub height: String,
    pub weight: String,
    pub gender: String,
    pub fitness_goals: String,
    pub fitness_level: String,
    pub exercise_frequency: String,
    pub workout_duration: String,
    pub weightlifting_duration: String,
    pub number_of_exercises: String,
    pub sets_reps: String,
    pub sets_reps_custom: String,
    pub workout_location: String,
    pub gym_name: String,
    pub available_equipment: String,
    pub other_equipment: String,
    pub current_cardio: String,
    pub include_cardio: String,
    pub cardio_frequency: String,
    pub cardio_length: String,
    pub preferred_cardio_types: String,
    pub physical_injuries: String,
    pub injury_details: String,
}

/// Build the profile from the extracted answers.
///
/// A missing or malformed birthdate fails the whole resolution; every other
/// absent answer degrades to [`NOT_PROVIDED`].
pub fn resolve_profile(
    pairs: &AnswerMap,
    name: &PersonName,
    reference: NaiveDate,
) -> Result<ResolvedProfile, PipelineError> {
    let get = |field: ProfileField| resolve(pairs, field.field_id());
    let age = compute_age(&get(ProfileField::Birthdate), reference)?;

    Ok(ResolvedProfile {
        first_name: name
            .given_name
            .clone()
            .unwrap_or_else(|| NOT_PROVIDED.to_string()),
        last_name: name
            .family_name
            .clone()
            .unwrap_or_else(|| NOT_PROVIDED.to_string()),
        age,
        height: get(ProfileField::Height),
        weight: get(ProfileField::Weight),
        gender: get(ProfileField::Gender),
        fitness_goals: get(ProfileField::FitnessGoals),
        fitness_level: get(ProfileField::FitnessLevel),
        exercise_frequency: get(ProfileField::ExerciseFrequency),
        workout_duration: get(ProfileField::WorkoutDuration),
        weightlifting_duration: get(ProfileField::WeightliftingDuration),
        number_of_exercises: get(ProfileField::NumberOfExercises),
        sets_reps: get(ProfileField::SetsReps),
        sets_reps_custom: get(ProfileField::SetsRepsCustom),
        workout_location: get(ProfileField::WorkoutLocation),
        gym_name: get(ProfileField::GymName),
        available_equipment: get(ProfileField::AvailableEquipment),
        other_equipment: get(ProfileField::OtherEquipment),
        current_cardio: get(ProfileField::CurrentCardio),
        include_cardio: get(ProfileField::IncludeCardio),
        cardio_frequency: get(ProfileField::CardioFrequency),
        cardio_length: get(ProfileField::CardioLength),
        preferred_cardio_types: get(ProfileField::PreferredCardioTypes),
        physical_injuries: get(ProfileField::PhysicalInjuries),
        injury_details: get(ProfileField::InjuryDetails),
    })
}
