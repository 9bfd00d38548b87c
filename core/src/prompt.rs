//! Workout prompt composition.
//!
//! The prompt is a single paragraph: an identity/biometrics sentence, training
//! frequency, weightlifting structure, then the cardio, environment and injury
//! clauses in that order, closed by a fixed instruction. Every substitution is
//! literal; the only post-processing is [`strip_emoji`].

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::profile::ResolvedProfile;

const YES: &str = "Yes";
const GYM: &str = "Gym";
/// Choice label meaning "use my own sets/reps description instead".
pub const CUSTOM_SETS_REPS: &str = "I have a different style";

/// A composed prompt. Never edited after composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Prompt(String);

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn cardio_clause(p: &ResolvedProfile) -> String {
    if p.current_cardio == YES {
        format!(
            "3. Cardio: {} includes cardio in the workouts, doing {} sessions of {} for {}. ",
            p.first_name, p.cardio_frequency, p.preferred_cardio_types, p.cardio_length
        )
    } else if p.include_cardio == YES {
        format!(
            "3. Cardio: {} plans to start including cardio in the sessions, aiming for {} sessions of {} for {}. ",
            p.first_name, p.cardio_frequency, p.preferred_cardio_types, p.cardio_length
        )
    } else {
        "3. Cardio: Don't include cardio in any plan. ".to_string()
    }
}

pub fn environment_clause(p: &ResolvedProfile) -> String {
    if p.workout_location == GYM {
        return format!("4. Environment: {} trains at {}. ", p.first_name, p.gym_name);
    }
    // Only an empty answer counts as "no other equipment"; the sentinel is joined as-is.
    let equipment = if p.other_equipment.is_empty() {
        p.available_equipment.clone()
    } else {
        format!("{}, {}", p.available_equipment, p.other_equipment)
    };
    format!(
        "4. Environment: {} trains at home with access to {}. ",
        p.first_name, equipment
    )
}

/// Empty when no injury was reported; the clause is omitted, not replaced.
pub fn injury_clause(p: &ResolvedProfile) -> String {
    if p.physical_injuries == YES {
        format!("7. Injury: {} has reported {}. ", p.first_name, p.injury_details)
    } else {
        String::new()
    }
}

pub fn sets_reps(p: &ResolvedProfile) -> &str {
    if p.sets_reps == CUSTOM_SETS_REPS {
        &p.sets_reps_custom
    } else {
        &p.sets_reps
    }
}

/// Compose the workout prompt for `profile`. Pure: equal profiles give equal prompts.
pub fn compose(p: &ResolvedProfile) -> Prompt {
    let text = format!(
        "Create a workout for {first} {last}, {age} years old, {gender}, fitness level: {level}, height: {height}, weight: {weight} lbs. \
         Fitness goals: {goals}. \
         Training frequency: {frequency} sessions/week, duration: {duration} per session. \
         Each session includes {lifting} of weightlifting with {exercises} performed in {sets_reps}. \
         {cardio}{environment}{injury}\
         Based on {first}'s preferences, create a workout with a warm-up, main exercises, cardio (if included), and a cool-down.",
        first = p.first_name,
        last = p.last_name,
        age = p.age,
        gender = p.gender,
        level = p.fitness_level,
        height = p.height,
        weight = p.weight,
        goals = p.fitness_goals,
        frequency = p.exercise_frequency,
        duration = p.workout_duration,
        lifting = p.weightlifting_duration,
        exercises = p.number_of_exercises,
        sets_reps = sets_reps(p),
        cardio = cardio_clause(p),
        environment = environment_clause(p),
        injury = injury_clause(p),
    );
    Prompt(strip_emoji(&text))
}

/// Pictographic, emoji and joiner code points removed from prompts.
///
/// The list is intentionally broad: `24C2..=1F251` and `10000..=10FFFF` also
/// cover CJK and every supplementary plane.
const EMOJI_RANGES: [RangeInclusive<u32>; 22] = [
    0x1F1E0..=0x1F1FF,
    0x1F300..=0x1F5FF,
    0x1F600..=0x1F64F,
    0x1F680..=0x1F6FF,
    0x1F700..=0x1F77F,
    0x1F780..=0x1F7FF,
    0x1F800..=0x1F8FF,
    0x1F900..=0x1F9FF,
    0x1FA00..=0x1FA6F,
    0x1FA70..=0x1FAFF,
    0x2702..=0x27B0,
    0x24C2..=0x1F251,
    0x1F926..=0x1F937,
    0x10000..=0x10FFFF,
    0x200D..=0x200D,
    0x2640..=0x2642,
    0x2600..=0x2B55,
    0x23CF..=0x23CF,
    0x23E9..=0x23E9,
    0x231A..=0x231A,
    0x3030..=0x3030,
    0xFE0F..=0xFE0F,
];

fn is_emoji(c: char) -> bool {
    let code = u32::from(c);
    EMOJI_RANGES.iter().any(|range| range.contains(&code))
}

/// Remove every character in [`EMOJI_RANGES`]; everything else is kept verbatim.
pub fn strip_emoji(text: &str) -> String {
    text.chars().filter(|c| !is_emoji(*c)).collect()
}
