use crate::core::profile::{DurationPreference, Gender, MainGoal, UserProfile};

pub const FITNESS_SYSTEM_INSTRUCTION: &str = "Você é uma API de fitness. Sua única função é retornar um objeto JSON perfeitamente formatado, seguindo estritamente o schema fornecido. Não adicione nenhum texto, explicação ou markdown fora do JSON.";

/// Section headers of the profile block, in render order.
pub const SECTION_LABELS: [&str; 10] = [
    "**Dados Pessoais:**",
    "**1. Objetivo Principal:**",
    "**3. Saúde e Condições Médicas:**",
    "**4. Experiência Física:**",
    "**5. Preferências de Treino:**",
    "**6. Disponibilidade:**",
    "**7. Nutrição e Hábitos Alimentares:**",
    "**8. Motivação e Metas:**",
    "**9. Preferências Extras:**",
    "**10. Estilo de Vida:**",
];

const FITNESS_TASK: &str = r#"
**Tarefa:**
Com base neste perfil de usuário EXTREMAMENTE DETALHADO, sua tarefa é criar o plano de treino mais eficaz e personalizado possível.

**Instruções Cruciais:**
1.  **Descrição Geral:** No campo 'geralDescription', escreva um parágrafo introdutório completo. Inclua recomendações sobre aquecimento, desaquecimento, dias de descanso, importância do cardio, hidratação e sono. Seja encorajador.
2.  **Foco do Dia:** No campo 'focus' para cada dia, seja MUITO CONCISO (ex: "Peito, Ombros e Tríceps" ou "Pernas e Glúteos"). NÃO adicione recomendações gerais aqui.
3.  **Dias:** Numere os dias de treino em sequência, começando em 1, de acordo com os dias disponíveis por semana.
4.  **Exercícios:** Forneça uma lista de exercícios apropriada para o nível de experiência e preferências do usuário. Para cada exercício, inclua uma dica curta e útil sobre a forma correta de execução.
5.  **Idioma:** O plano deve ser em português do Brasil.
"#;

const DIET_TASK: &str = r#"
**Tarefa:**
Com base neste perfil de usuário EXTREMAMENTE DETALHADO, crie um plano alimentar SEMANAL DETALHADO, de Segunda a Domingo.

**Instruções Cruciais:**
1.  **Refeições Diárias:** Para cada dia, inclua 4 refeições: Café da Manhã, Almoço, Lanche da Tarde e Jantar.
2.  **Receitas Práticas:** Para cada refeição, forneça uma descrição clara e sugestões de receitas práticas e saborosas que se alinhem com as preferências, restrições e, MUITO IMPORTANTE, o **orçamento** do usuário.
3.  **Cálculos Precisos:** Calcule os totais diários de calorias e macronutrientes. Os totais de cada dia devem ser a soma das refeições. Ao final, calcule e forneça as médias semanais.
4.  **Idioma:** O plano deve ser em português do Brasil.
"#;

fn yes_no(flag: bool) -> &'static str {
    if flag { "Sim" } else { "Não" }
}

/// User-typed text loses its bold markers so it cannot forge a section label.
fn free_text(value: &str) -> String {
    value.replace("**", "")
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => free_text(v),
        _ => placeholder.to_string(),
    }
}

fn join_or<I, S>(items: I, placeholder: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = items.into_iter().map(|s| free_text(s.as_ref())).collect::<Vec<_>>().join(", ");
    if joined.is_empty() { placeholder.to_string() } else { joined }
}

/// Renders the profile as the labelled block shared by the fitness and diet
/// prompts. Every line is always present; blanks become placeholders.
pub fn profile_block(profile: &UserProfile) -> String {
    let gender = match profile.gender {
        Gender::Male => "Masculino",
        Gender::Female => "Feminino",
        Gender::Other => "Prefere não informar",
    };
    let duration = match profile.training_duration_preference {
        DurationPreference::ShortIntense => "Curtos e intensos",
        DurationPreference::LongLight => "Longos e leves",
    };
    let [personal, goal, health, experience, training, availability, nutrition, motivation, extras, lifestyle] =
        SECTION_LABELS;

    format!(
        "### Perfil Detalhado do Usuário para IA Fitness ###

{personal}
- **Nome:** {name}
- **Idade:** {age}
- **Sexo:** {gender}
- **Altura:** {height} cm
- **Peso Atual:** {current} kg
- **Peso Alvo:** {target} kg

{goal}
- **Meta:** {goal_text}

{health}
- **Condições Pré-existentes:** {conditions}
- **Outras Condições:** {other_conditions}

{experience}
- **Nível:** {level}
- **Frequência Atual:** {frequency}
- **Já seguiu programa estruturado?:** {structured}

{training}
- **Local:** {location}
- **Estilo Favorito:** {style}
- **Duração/Intensidade:** {duration}
- **Usa Equipamentos?:** {equipment}
- **Aceita Alto Impacto?:** {impact}

{availability}
- **Dias por Semana:** {days}
- **Tempo por Sessão:** {session} minutos
- **Horário Preferido:** {time}

{nutrition}
- **Refeições por Dia:** {meals}
- **Hábito Culinário:** {cooking}
- **Acompanhar Macros?:** {macros}
- **Suplementos:** {supplements}
- **Outros Suplementos:** {other_supplements}
- **Restrições/Preferências:** {restrictions}
- **Outras Restrições:** {other_restrictions}
- **Alimentos não apreciados:** {disliked}

{motivation}
- **Nível de Motivação:** {motivation_level}
- **Prazo para Meta:** {timeline}
- **Aberto a Desafios?:** {challenges}

{extras}
- **Foco Adicional:** {extra_focus}
- **Estrutura de Treino:** {structure}
- **Acompanhamento Visual?:** {visual}
- **Deseja Notificações?:** {notifications}

{lifestyle}
- **Qualidade do Sono:** {sleep}
- **Nível de Estresse:** {stress}
- **Orçamento para Refeições:** {budget}
- **Orçamento Diário:** {daily_budget}
",
        name = free_text(&profile.name),
        age = profile.age,
        height = profile.height,
        current = profile.current_weight,
        target = profile.target_weight,
        goal_text = free_text(&profile.goal_text()),
        conditions = join_or(&profile.health_conditions, "Nenhuma informada"),
        other_conditions = or_placeholder(profile.other_health_conditions.as_deref(), "Nenhuma"),
        level = profile.experience_level.label(),
        frequency = profile.exercise_frequency.label(),
        structured = yes_no(profile.had_structured_program),
        location = profile.training_location.label(),
        style = profile.training_style.label(),
        equipment = yes_no(profile.equipment_available),
        impact = yes_no(profile.high_impact_accepted),
        days = profile.days_per_week.label(),
        session = profile.time_per_session.label(),
        time = profile.preferred_time.label(),
        meals = profile.meals_per_day.label(),
        cooking = profile.cooking_habit.label(),
        macros = yes_no(profile.track_macros),
        supplements = join_or(&profile.supplements, "Nenhum"),
        other_supplements = or_placeholder(profile.other_supplements.as_deref(), "Nenhum"),
        restrictions = join_or(profile.dietary_restrictions.iter().map(|r| r.label()), "Nenhuma"),
        other_restrictions = or_placeholder(profile.other_dietary_restrictions.as_deref(), "Nenhuma"),
        disliked = or_placeholder(profile.disliked_foods.as_deref(), "Nenhum"),
        motivation_level = profile.motivation_level.label(),
        timeline = profile.goal_timeline.label(),
        challenges = yes_no(profile.open_to_challenges),
        extra_focus = profile.extra_focus.label(),
        structure = profile.workout_structure.label(),
        visual = yes_no(profile.visual_tracking),
        notifications = yes_no(profile.notifications_enabled),
        sleep = profile.sleep_quality.label(),
        stress = profile.stress_level.label(),
        budget = profile.budget.label(),
        daily_budget = or_placeholder(profile.daily_budget.as_deref(), "Nenhuma"),
    )
}

pub fn fitness_plan_prompt(profile: &UserProfile) -> String {
    format!("{}{}", profile_block(profile), FITNESS_TASK)
}

pub fn diet_plan_prompt(profile: &UserProfile) -> String {
    format!("{}{}", profile_block(profile), DIET_TASK)
}

fn goal_phrase(profile: &UserProfile) -> String {
    match profile.main_goal {
        MainGoal::LoseWeight => "perder peso".into(),
        MainGoal::GainMuscle => "ganhar massa muscular".into(),
        MainGoal::MaintainFitness => "manter a forma".into(),
        MainGoal::ImproveConditioning => "melhorar condicionamento".into(),
        MainGoal::Other => profile.goal_text(),
    }
}

/// Goal-only prompt for the meal scanner; the image part travels alongside.
pub fn meal_analysis_prompt(profile: &UserProfile) -> String {
    format!(
        r#"Você é a "FitBuilder Pro", uma nutricionista especialista em IA. Sua tarefa é analisar a refeição na imagem para um usuário com o objetivo de '{goal}'.
Siga estes passos na sua análise:
1.  **Identificação:** Liste os alimentos que você consegue identificar no prato.
2.  **Estimativa Nutricional:** Forneça uma estimativa para o total de calorias, proteínas, carboidratos e gorduras da refeição completa.
3.  **Recomendação Personalizada:** Esta é a parte mais importante. Compare a refeição com o objetivo do usuário. Forneça uma recomendação clara e direta, começando com uma das três classificações: "Recomendada", "Aceitável com Moderação" ou "Não Recomendada". Em seguida, explique o porquê da sua classificação, mencionando como os macronutrientes do prato se alinham (ou não) ao objetivo. Se possível, sugira pequenas alterações que poderiam tornar a refeição melhor para o objetivo do usuário.
Mantenha um tom profissional, encorajador e útil. A resposta deve ser em português do Brasil e estritamente no formato JSON especificado.
"#,
        goal = goal_phrase(profile)
    )
}
