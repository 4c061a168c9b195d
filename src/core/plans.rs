use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Exercise {
    #[schemars(description = "Nome do exercício.")]
    pub name: String,
    #[schemars(description = "Número de séries.")]
    pub sets: u32,
    #[schemars(description = "Faixa de repetições (ex: '8-12').")]
    pub reps: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Uma dica curta sobre a forma correta de execução do exercício.")]
    pub tip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WorkoutDay {
    #[schemars(description = "O número do dia do treino (ex: 1).")]
    pub day: u32,
    #[schemars(
        description = "O principal grupo muscular ou foco do dia (ex: 'Peito & Tríceps'). Manter curto e direto."
    )]
    pub focus: String,
    #[schemars(description = "Uma lista de exercícios para o dia.")]
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FitnessPlan {
    #[schemars(
        description = "Uma descrição geral e abrangente do plano de treino, incluindo recomendações sobre aquecimento, desaquecimento, cardio, dias de descanso, hidratação, sono e dicas motivacionais. Deve ser um parágrafo bem escrito."
    )]
    pub geral_description: String,
    #[schemars(description = "Uma lista de planos de treino diários, com base nos dias disponíveis.")]
    pub workouts: Vec<WorkoutDay>,
}

impl FitnessPlan {
    /// Positions whose `day` breaks the 1..=n sequence. The model is asked
    /// for contiguous days but nothing forces it.
    pub fn day_sequence_gaps(&self) -> Vec<usize> {
        self.workouts
            .iter()
            .enumerate()
            .filter(|(idx, w)| w.day as usize != idx + 1)
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn exercise_count(&self) -> usize {
        self.workouts.iter().map(|w| w.exercises.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Meal {
    #[schemars(description = "Nome da refeição (ex: 'Café da Manhã').")]
    pub name: String,
    #[schemars(description = "Descrição e receita da refeição.")]
    pub description: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MacroTotals {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
}

impl MacroTotals {
    fn checked_add(self, meal: &Meal) -> Option<Self> {
        Some(Self {
            calories: self.calories.checked_add(meal.calories)?,
            protein: self.protein.checked_add(meal.protein)?,
            carbs: self.carbs.checked_add(meal.carbs)?,
            fats: self.fats.checked_add(meal.fats)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyDiet {
    #[schemars(description = "O dia da semana (ex: 'Segunda-feira').")]
    pub day_of_week: String,
    #[schemars(description = "Uma lista de refeições para o dia.")]
    pub meals: Vec<Meal>,
    pub total_calories: u32,
    pub total_protein: u32,
    pub total_carbs: u32,
    pub total_fats: u32,
}

impl DailyDiet {
    pub fn totals(&self) -> MacroTotals {
        MacroTotals {
            calories: self.total_calories,
            protein: self.total_protein,
            carbs: self.total_carbs,
            fats: self.total_fats,
        }
    }

    /// Sum of the meals, or `None` when it does not fit in a `u32`.
    pub fn summed_meals(&self) -> Option<MacroTotals> {
        self.meals.iter().try_fold(MacroTotals::default(), MacroTotals::checked_add)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    #[schemars(description = "Um plano de dieta para 7 dias, de Segunda a Domingo.")]
    pub weekly_diet: Vec<DailyDiet>,
    pub weekly_average: MacroTotals,
}

impl DietPlan {
    pub const DAYS: usize = 7;

    /// Days whose reported totals disagree with the sum of their meals.
    pub fn macro_mismatches(&self) -> Vec<&str> {
        self.weekly_diet
            .iter()
            .filter(|d| d.summed_meals() != Some(d.totals()))
            .map(|d| d.day_of_week.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealAnalysis {
    #[schemars(description = "Uma lista de itens alimentares identificados na imagem.")]
    pub food_items: Vec<String>,
    #[schemars(description = "Total de calorias estimadas.")]
    pub calories: u32,
    #[schemars(description = "Total de proteína estimada em gramas.")]
    pub protein: u32,
    #[schemars(description = "Total de carboidratos estimados em gramas.")]
    pub carbs: u32,
    #[schemars(description = "Total de gorduras estimadas em gramas.")]
    pub fats: u32,
    #[schemars(
        description = "Uma análise detalhada e uma recomendação clara, informando se a refeição é 'Recomendada', 'Aceitável com Moderação', ou 'Não Recomendada' para o objetivo do usuário, com uma explicação."
    )]
    pub recommendation: String,
}

impl MealAnalysis {
    pub fn category(&self) -> Option<Recommendation> {
        Recommendation::classify(&self.recommendation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Recommended,
    Moderation,
    NotRecommended,
}

impl Recommendation {
    /// Infers the verdict from the free-text recommendation. "não
    /// recomendada" contains "recomendada", so the negative phrase is
    /// checked first.
    pub fn classify(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        if text.contains("não recomendada") || text.contains("nao recomendada") {
            Some(Self::NotRecommended)
        } else if text.contains("aceitável com moderação") || text.contains("aceitavel com moderacao") {
            Some(Self::Moderation)
        } else if text.contains("recomendada") {
            Some(Self::Recommended)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Recommended => "Recomendada",
            Self::Moderation => "Aceitável com Moderação",
            Self::NotRecommended => "Não Recomendada",
        }
    }
}
