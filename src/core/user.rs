use super::plans::{DietPlan, FitnessPlan};
use super::profile::UserProfile;
use crate::error::FitError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Completed,
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Aggregate root. Owned by whichever `UserStore` persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness_plan: Option<FitnessPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet_plan: Option<DietPlan>,
    /// week id -> planned meals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_planner_data: Option<BTreeMap<String, Vec<String>>>,
    /// date -> workout outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_schedule_data: Option<BTreeMap<String, ScheduleEntry>>,
    /// challenge id -> per-day completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_progress: Option<BTreeMap<String, Vec<bool>>>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            profile: None,
            fitness_plan: None,
            diet_plan: None,
            meal_planner_data: None,
            workout_schedule_data: None,
            challenge_progress: None,
        }
    }

    pub fn require_profile(&self) -> Result<&UserProfile, FitError> {
        self.profile.as_ref().ok_or(FitError::MissingProfile)
    }
}

/// A plan that can be stored on a `User`.
pub trait StoredPlan: Sized {
    /// Short name used in logs and user-facing messages.
    const KIND: &'static str;

    fn slot(user: &mut User) -> &mut Option<Self>;
}

impl StoredPlan for FitnessPlan {
    const KIND: &'static str = "plano de treino";

    fn slot(user: &mut User) -> &mut Option<Self> {
        &mut user.fitness_plan
    }
}

impl StoredPlan for DietPlan {
    const KIND: &'static str = "plano de dieta";

    fn slot(user: &mut User) -> &mut Option<Self> {
        &mut user.diet_plan
    }
}

impl User {
    pub fn set_plan<P: StoredPlan>(&mut self, plan: P) {
        *P::slot(self) = Some(plan);
    }

    pub fn take_plan<P: StoredPlan>(&mut self) -> Option<P> {
        P::slot(self).take()
    }
}
