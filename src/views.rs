use crate::ai::generator::PlanSource;
use crate::core::plans::{DietPlan, FitnessPlan, MealAnalysis, Recommendation};
use crate::core::profile::UserProfile;
use crate::core::user::StoredPlan;
use crate::error::FitError;
use crate::store::{Session, UserStore};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::future::Future;

#[derive(Debug, Clone, PartialEq)]
pub enum SlotState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

/// Identifies one in-flight request. Only the token of the latest request
/// may complete a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

#[derive(Debug)]
pub struct PlanSlot<T> {
    state: SlotState<T>,
    generation: u64,
}

impl<T> Default for PlanSlot<T> {
    fn default() -> Self {
        Self { state: SlotState::Idle, generation: 0 }
    }
}

impl<T> PlanSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SlotState<T> {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SlotState::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match &self.state {
            SlotState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SlotState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Enters Loading. A slot serves one request at a time.
    pub fn begin(&mut self) -> Result<RequestToken, FitError> {
        if self.is_loading() {
            return Err(FitError::Busy);
        }
        self.generation += 1;
        self.state = SlotState::Loading;
        Ok(RequestToken(self.generation))
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.generation && self.is_loading()
    }

    /// Applies the outcome of `token`'s request. Returns false and leaves the
    /// slot untouched when the request was superseded or reset.
    pub fn complete(&mut self, token: RequestToken, outcome: Result<T, String>) -> bool {
        if !self.is_current(token) {
            log::debug!("Discarding stale response for request {}", token.0);
            return false;
        }
        self.state = match outcome {
            Ok(value) => SlotState::Ready(value),
            Err(message) => SlotState::Failed(message),
        };
        true
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.generation += 1;
        self.state = SlotState::Failed(message.into());
    }

    pub fn show(&mut self, value: T) {
        self.generation += 1;
        self.state = SlotState::Ready(value);
    }

    /// Back to Idle; any in-flight response will be ignored.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = SlotState::Idle;
    }
}

/// A plan the views can request and persist.
pub trait GeneratedPlan: StoredPlan + Clone {
    fn request<G: PlanSource>(source: &G, profile: &UserProfile) -> impl Future<Output = Result<Self, FitError>>;
}

impl GeneratedPlan for FitnessPlan {
    fn request<G: PlanSource>(source: &G, profile: &UserProfile) -> impl Future<Output = Result<Self, FitError>> {
        source.generate_fitness_plan(profile)
    }
}

impl GeneratedPlan for DietPlan {
    fn request<G: PlanSource>(source: &G, profile: &UserProfile) -> impl Future<Output = Result<Self, FitError>> {
        source.generate_diet_plan(profile)
    }
}

/// Generate / show / clear flow for one plan stored on the user.
#[derive(Debug)]
pub struct PlanView<P> {
    slot: PlanSlot<P>,
}

pub type FitnessPlanView = PlanView<FitnessPlan>;
pub type DietPlanView = PlanView<DietPlan>;

impl<P> Default for PlanView<P> {
    fn default() -> Self {
        Self { slot: PlanSlot::new() }
    }
}

impl<P: GeneratedPlan> PlanView<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SlotState<P> {
        self.slot.state()
    }

    pub fn slot_mut(&mut self) -> &mut PlanSlot<P> {
        &mut self.slot
    }

    /// Shows the plan already stored on the signed-in user, if any.
    pub fn load<S: UserStore>(&mut self, session: &Session<S>) {
        let stored = session.current().cloned().and_then(|mut user| user.take_plan::<P>());
        match stored {
            Some(plan) => self.slot.show(plan),
            None => self.slot.reset(),
        }
    }

    /// Requests a fresh plan and stores it on the user. Replaces any plan
    /// already there. Failures land in the slot; nothing is stored.
    pub async fn generate<G, S>(&mut self, source: &G, session: &mut Session<S>) -> &SlotState<P>
    where
        G: PlanSource,
        S: UserStore,
    {
        let Some(profile) = session.profile().cloned() else {
            self.slot.fail(FitError::MissingProfile.to_string());
            return self.slot.state();
        };
        let Ok(token) = self.slot.begin() else {
            return self.slot.state();
        };

        let outcome = match P::request(source, &profile).await {
            Ok(plan) if self.slot.is_current(token) => session
                .modify_user(|user| user.set_plan(plan.clone()))
                .map(|_| plan),
            other => other,
        };

        let outcome = outcome.map_err(|e| {
            log::error!("Generating {} failed: {e}", P::KIND);
            format!("Falha ao gerar o {}: {e}. Por favor, tente novamente mais tarde.", P::KIND)
        });
        self.slot.complete(token, outcome);
        self.slot.state()
    }

    /// Removes the plan from the user and returns to the empty state.
    pub fn clear<S: UserStore>(&mut self, session: &mut Session<S>) -> Result<(), FitError> {
        session.modify_user(|user| {
            user.take_plan::<P>();
        })?;
        self.slot.reset();
        Ok(())
    }
}

/// Meal photo analysis. Results are shown, never stored.
#[derive(Debug, Default)]
pub struct MealScanner {
    slot: PlanSlot<MealAnalysis>,
}

impl MealScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SlotState<MealAnalysis> {
        self.slot.state()
    }

    pub async fn analyze<G, S>(
        &mut self,
        source: &G,
        session: &Session<S>,
        image: &[u8],
        mime_type: &str,
    ) -> &SlotState<MealAnalysis>
    where
        G: PlanSource,
        S: UserStore,
    {
        let Some(profile) = session.profile() else {
            self.slot.fail(FitError::MissingProfile.to_string());
            return self.slot.state();
        };
        let Ok(token) = self.slot.begin() else {
            return self.slot.state();
        };

        let encoded = STANDARD.encode(image);
        let outcome = source.analyze_meal_image(&encoded, mime_type, profile).await.map_err(|e| {
            log::error!("Meal analysis failed: {e}");
            format!(
                "Falha ao analisar a refeição: {e}. A imagem pode não estar nítida ou ocorreu um erro na API. Por favor, tente novamente."
            )
        });
        self.slot.complete(token, outcome);
        self.slot.state()
    }

    pub fn recommendation(&self) -> Option<Recommendation> {
        self.slot.value().and_then(MealAnalysis::category)
    }

    pub fn reset(&mut self) {
        self.slot.reset();
    }
}
