use super::profile::{Gender, MainGoal, UserProfile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    #[default]
    ModeratelyActive,
    VeryActive,
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::LightlyActive => 1.375,
            Self::ModeratelyActive => 1.55,
            Self::VeryActive => 1.725,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyTargets {
    pub tdee: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
}

/// Protein / carbs / fats share of daily calories.
fn macro_split(goal: MainGoal) -> (f64, f64, f64) {
    match goal {
        MainGoal::LoseWeight => (0.40, 0.30, 0.30),
        MainGoal::GainMuscle => (0.35, 0.40, 0.25),
        _ => (0.30, 0.40, 0.30),
    }
}

/// Mifflin-St Jeor BMR scaled by activity, then shifted by goal.
pub fn estimate_targets(profile: &UserProfile, activity: ActivityLevel) -> DailyTargets {
    let mut bmr = 10.0 * profile.current_weight + 6.25 * profile.height - 5.0 * f64::from(profile.age);
    match profile.gender {
        Gender::Male => bmr += 5.0,
        Gender::Female => bmr -= 161.0,
        Gender::Other => {}
    }

    let mut tdee = bmr * activity.multiplier();
    match profile.main_goal {
        MainGoal::LoseWeight => tdee -= 500.0,
        MainGoal::GainMuscle => tdee += 300.0,
        _ => {}
    }
    let tdee = tdee.max(0.0);

    let (p, c, f) = macro_split(profile.main_goal);
    DailyTargets {
        tdee: tdee.round() as u32,
        protein: (tdee * p / 4.0).round() as u32,
        carbs: (tdee * c / 4.0).round() as u32,
        fats: (tdee * f / 9.0).round() as u32,
    }
}
