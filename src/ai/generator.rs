use super::client::{GeminiClient, GenerationRequest, Part};
use super::prompts;
use super::schema_utils;
use crate::core::plans::{DietPlan, FitnessPlan, MealAnalysis};
use crate::core::profile::UserProfile;
use crate::error::FitError;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::future::Future;

/// The three operations the views call. `PlanGenerator` is the real
/// implementation; tests substitute canned ones.
pub trait PlanSource {
    fn generate_fitness_plan(
        &self,
        profile: &UserProfile,
    ) -> impl Future<Output = Result<FitnessPlan, FitError>> + Send;

    fn generate_diet_plan(&self, profile: &UserProfile) -> impl Future<Output = Result<DietPlan, FitError>> + Send;

    fn analyze_meal_image(
        &self,
        base64_image: &str,
        mime_type: &str,
        profile: &UserProfile,
    ) -> impl Future<Output = Result<MealAnalysis, FitError>> + Send;
}

pub struct PlanGenerator {
    client: GeminiClient,
}

impl PlanGenerator {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    async fn request<T>(&self, request: GenerationRequest, schema_name: &'static str) -> Result<T, FitError>
    where
        T: DeserializeOwned,
    {
        log::info!("🏗️  Requesting {schema_name} from {}", self.client.model());
        let text = self.client.generate(&request, schema_name).await?;
        parse_json_response(&text, schema_name)
    }

    fn structured<T: JsonSchema>(
        parts: Vec<Part>,
        system_instruction: Option<&str>,
    ) -> Result<GenerationRequest, FitError> {
        Ok(GenerationRequest {
            parts,
            system_instruction: system_instruction.map(str::to_string),
            response_schema: Some(schema_utils::response_schema::<T>()?),
        })
    }
}

impl PlanSource for PlanGenerator {
    async fn generate_fitness_plan(&self, profile: &UserProfile) -> Result<FitnessPlan, FitError> {
        let request = Self::structured::<FitnessPlan>(
            vec![Part::text(prompts::fitness_plan_prompt(profile))],
            Some(prompts::FITNESS_SYSTEM_INSTRUCTION),
        )?;
        let plan: FitnessPlan = self.request(request, "FitnessPlan").await?;

        let gaps = plan.day_sequence_gaps();
        if !gaps.is_empty() {
            log::warn!("FitnessPlan days are not contiguous at positions {gaps:?}");
        }
        log::info!("   -> FitnessPlan ready: {} days, {} exercises", plan.workouts.len(), plan.exercise_count());
        Ok(plan)
    }

    async fn generate_diet_plan(&self, profile: &UserProfile) -> Result<DietPlan, FitError> {
        let request =
            Self::structured::<DietPlan>(vec![Part::text(prompts::diet_plan_prompt(profile))], None)?;
        let plan: DietPlan = self.request(request, "DietPlan").await?;

        if plan.weekly_diet.len() != DietPlan::DAYS {
            log::warn!("DietPlan has {} days, expected {}", plan.weekly_diet.len(), DietPlan::DAYS);
        }
        let mismatches = plan.macro_mismatches();
        if !mismatches.is_empty() {
            log::warn!("DietPlan totals differ from meal sums on {mismatches:?}");
        }
        Ok(plan)
    }

    async fn analyze_meal_image(
        &self,
        base64_image: &str,
        mime_type: &str,
        profile: &UserProfile,
    ) -> Result<MealAnalysis, FitError> {
        if base64_image.trim().is_empty() {
            return Err(FitError::InvalidInput("Nenhuma imagem enviada.".into()));
        }
        if !mime_type.starts_with("image/") {
            return Err(FitError::InvalidInput(format!("Tipo de arquivo não suportado: '{mime_type}'.")));
        }

        let request = Self::structured::<MealAnalysis>(
            vec![Part::image(mime_type, base64_image), Part::text(prompts::meal_analysis_prompt(profile))],
            None,
        )?;
        let analysis: MealAnalysis = self.request(request, "MealAnalysis").await?;
        if analysis.category().is_none() {
            log::warn!("MealAnalysis recommendation has no recognizable verdict");
        }
        Ok(analysis)
    }
}

/// Parses model text as `T`. The raw text is logged on failure and kept on
/// the error, never shown to the user.
pub fn parse_json_response<T: DeserializeOwned>(text: &str, schema_name: &'static str) -> Result<T, FitError> {
    let cleaned = strip_code_fence(text);
    serde_json::from_str(cleaned).map_err(|source| {
        log::error!("Failed to parse {schema_name} JSON from Gemini ({source}). Raw text: {text}");
        FitError::MalformedResponse { schema: schema_name, raw: text.to_string(), source }
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```json").or_else(|| trimmed.strip_prefix("```")) {
        Some(rest) => rest.trim_end().strip_suffix("```").unwrap_or(rest).trim(),
        None => trimmed,
    }
}
