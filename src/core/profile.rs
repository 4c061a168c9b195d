use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a closed questionnaire answer set. Each variant serializes to
/// the exact code the onboarding quiz stores.
macro_rules! answer_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $code:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $code)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            /// Code with underscores turned into spaces, as shown to the model.
            pub fn label(self) -> String {
                self.code().replace('_', " ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }
    };
}

answer_enum!(Gender { Male => "male", Female => "female", Other => "other" });

answer_enum!(MainGoal {
    LoseWeight => "lose_weight",
    GainMuscle => "gain_muscle",
    MaintainFitness => "maintain_fitness",
    ImproveConditioning => "improve_conditioning",
    Other => "other",
});

answer_enum!(ExperienceLevel {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Advanced => "advanced",
});

answer_enum!(ExerciseFrequency {
    None => "none",
    OneToTwo => "1-2_per_week",
    ThreeToFour => "3-4_per_week",
    FivePlus => "5+_per_week",
});

answer_enum!(TrainingLocation { Home => "home", Gym => "gym", Outdoors => "outdoors" });

answer_enum!(TrainingStyle {
    Strength => "strength",
    Cardio => "cardio",
    Stretching => "stretching",
    YogaPilates => "yoga_pilates",
    Mixed => "mixed",
});

answer_enum!(DurationPreference { ShortIntense => "short_intense", LongLight => "long_light" });

answer_enum!(DaysPerWeek {
    OneToTwo => "1-2",
    ThreeToFour => "3-4",
    FiveToSix => "5-6",
    EveryDay => "every_day",
});

answer_enum!(TimePerSession {
    Under20 => "under_20",
    From20To40 => "20-40",
    From40To60 => "40-60",
    Over60 => "over_60",
});

answer_enum!(PreferredTime {
    Morning => "morning",
    Afternoon => "afternoon",
    Night => "night",
    Flexible => "flexible",
});

answer_enum!(MealsPerDay {
    OneToTwo => "1-2",
    Three => "3",
    FourToFive => "4-5",
    FivePlus => "5+",
});

answer_enum!(CookingHabit { MostlyOut => "mostly_out", MostlyHome => "mostly_home", Mixed => "mixed" });

answer_enum!(DietaryRestriction {
    Vegetarian => "vegetarian",
    Vegan => "vegan",
    GlutenFree => "gluten_free",
    LactoseFree => "lactose_free",
});

answer_enum!(Level { Low => "low", Medium => "medium", High => "high" });

answer_enum!(GoalTimeline {
    ShortTerm => "short_term",
    MediumTerm => "medium_term",
    LongTerm => "long_term",
});

answer_enum!(ExtraFocus {
    Strength => "strength",
    Endurance => "endurance",
    FatLoss => "fat_loss",
    SpecificPerformance => "specific_performance",
});

answer_enum!(WorkoutStructure { Individual => "individual", Circuits => "circuits" });

answer_enum!(SleepQuality { Poor => "poor", Average => "average", Good => "good" });

answer_enum!(Budget { Economic => "economic", Moderate => "moderate", Flexible => "flexible" });

/// Everything the onboarding quiz collects. Once a profile exists every
/// required field is present; only the free-text extras are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub height: f64,
    pub current_weight: f64,
    pub target_weight: f64,

    pub main_goal: MainGoal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_goal: Option<String>,

    #[serde(default)]
    pub health_conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_health_conditions: Option<String>,

    pub experience_level: ExperienceLevel,
    pub exercise_frequency: ExerciseFrequency,
    pub had_structured_program: bool,

    pub training_location: TrainingLocation,
    pub training_style: TrainingStyle,
    pub training_duration_preference: DurationPreference,
    pub equipment_available: bool,
    pub high_impact_accepted: bool,

    pub days_per_week: DaysPerWeek,
    pub time_per_session: TimePerSession,
    pub preferred_time: PreferredTime,

    pub meals_per_day: MealsPerDay,
    pub cooking_habit: CookingHabit,
    pub track_macros: bool,
    #[serde(default)]
    pub supplements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_supplements: Option<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<DietaryRestriction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_dietary_restrictions: Option<String>,

    pub motivation_level: Level,
    pub goal_timeline: GoalTimeline,
    pub open_to_challenges: bool,

    pub extra_focus: ExtraFocus,
    pub workout_structure: WorkoutStructure,
    pub visual_tracking: bool,
    pub notifications_enabled: bool,

    pub sleep_quality: SleepQuality,
    pub stress_level: Level,
    pub budget: Budget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disliked_foods: Option<String>,
}

impl UserProfile {
    /// The goal as it should read in a prompt. A custom goal falls back to
    /// the generic label when the user left the text blank.
    pub fn goal_text(&self) -> String {
        match (self.main_goal, self.other_goal.as_deref().map(str::trim)) {
            (MainGoal::Other, Some(goal)) if !goal.is_empty() => goal.to_string(),
            (goal, _) => goal.label(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn sample_profile() -> UserProfile {
        UserProfile {
            name: "Ana".into(),
            age: 31,
            gender: Gender::Female,
            height: 165.0,
            current_weight: 72.5,
            target_weight: 64.0,
            main_goal: MainGoal::LoseWeight,
            other_goal: None,
            health_conditions: vec![],
            other_health_conditions: None,
            experience_level: ExperienceLevel::Beginner,
            exercise_frequency: ExerciseFrequency::OneToTwo,
            had_structured_program: false,
            training_location: TrainingLocation::Home,
            training_style: TrainingStyle::YogaPilates,
            training_duration_preference: DurationPreference::ShortIntense,
            equipment_available: false,
            high_impact_accepted: true,
            days_per_week: DaysPerWeek::ThreeToFour,
            time_per_session: TimePerSession::From20To40,
            preferred_time: PreferredTime::Morning,
            meals_per_day: MealsPerDay::FourToFive,
            cooking_habit: CookingHabit::MostlyHome,
            track_macros: true,
            supplements: vec![],
            other_supplements: None,
            dietary_restrictions: vec![DietaryRestriction::LactoseFree],
            other_dietary_restrictions: None,
            motivation_level: Level::High,
            goal_timeline: GoalTimeline::MediumTerm,
            open_to_challenges: true,
            extra_focus: ExtraFocus::FatLoss,
            workout_structure: WorkoutStructure::Circuits,
            visual_tracking: true,
            notifications_enabled: false,
            sleep_quality: SleepQuality::Average,
            stress_level: Level::Medium,
            budget: Budget::Economic,
            daily_budget: None,
            disliked_foods: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_profile;
    use super::*;

    #[test]
    fn answer_codes_survive_serde() {
        for freq in ExerciseFrequency::ALL {
            let encoded = serde_json::to_string(freq).unwrap();
            assert_eq!(encoded, format!("\"{}\"", freq.code()));
            let decoded: ExerciseFrequency = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, *freq);
        }
    }

    #[test]
    fn labels_replace_underscores() {
        assert_eq!(ExerciseFrequency::ThreeToFour.label(), "3-4 per week");
        assert_eq!(TrainingStyle::YogaPilates.label(), "yoga pilates");
        assert_eq!(MainGoal::LoseWeight.to_string(), "lose_weight");
    }

    #[test]
    fn unknown_answer_is_rejected() {
        let mut value = serde_json::to_value(sample_profile()).unwrap();
        value["trainingLocation"] = "moon".into();
        assert!(serde_json::from_value::<UserProfile>(value).is_err());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut value = serde_json::to_value(sample_profile()).unwrap();
        value.as_object_mut().unwrap().remove("age");
        assert!(serde_json::from_value::<UserProfile>(value).is_err());
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let value = serde_json::to_value(sample_profile()).unwrap();
        assert!(value.get("dailyBudget").is_none());
        let back: UserProfile = serde_json::from_value(value).unwrap();
        assert_eq!(back, sample_profile());
    }

    #[test]
    fn custom_goal_text() {
        let mut profile = sample_profile();
        profile.main_goal = MainGoal::Other;
        profile.other_goal = Some("correr uma maratona".into());
        assert_eq!(profile.goal_text(), "correr uma maratona");

        profile.other_goal = Some("   ".into());
        assert_eq!(profile.goal_text(), "other");
    }
}
