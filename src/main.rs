use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use fitbuilder::config;
use fitbuilder::core::nutrition::{self, ActivityLevel};
use fitbuilder::core::plans::{DietPlan, FitnessPlan, MealAnalysis};
use fitbuilder::core::profile::UserProfile;
use fitbuilder::store::{JsonFileStore, Session};
use fitbuilder::views::{DietPlanView, FitnessPlanView, MealScanner, SlotState};
use fitbuilder::{Config, FitError, GeminiClient, PlanGenerator};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fitbuilder", about = "AI-generated workout and diet plans")]
struct Cli {
    /// Account to act on
    #[arg(long, env = "FITBUILDER_EMAIL")]
    email: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Save the onboarding answers from a JSON file
    Profile { file: PathBuf },
    /// Show the stored workout plan, generating one if missing
    Fitness {
        #[arg(long)]
        regenerate: bool,
    },
    /// Show the stored weekly diet, generating one if missing
    Diet {
        #[arg(long)]
        regenerate: bool,
    },
    /// Analyze a meal photo against the user's goal
    Scan { image: PathBuf },
    /// Delete a stored plan
    Clear { plan: PlanKind },
    /// Print the stored user record
    Show,
    /// Estimate daily calories and macros from the profile
    Targets {
        #[arg(long, value_enum, default_value_t = ActivityLevel::ModeratelyActive)]
        activity: ActivityLevel,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PlanKind {
    Fitness,
    Diet,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("❌ {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), FitError> {
    let mut session = Session::new(JsonFileStore::new(config::data_file_from_env()));
    session.sign_in(&cli.email)?;

    match cli.command {
        Command::Profile { file } => {
            let text = std::fs::read_to_string(&file)?;
            let profile: UserProfile = serde_json::from_str(&text)?;
            session.set_profile(profile)?;
            println!("✅ Perfil salvo em {}", session.store().path().display());
        }
        Command::Fitness { regenerate } => {
            let mut view = FitnessPlanView::new();
            view.load(&session);
            if regenerate || !matches!(view.state(), SlotState::Ready(_)) {
                let generator = generator()?;
                view.generate(&generator, &mut session).await;
            }
            render(view.state(), print_fitness)?;
        }
        Command::Diet { regenerate } => {
            let mut view = DietPlanView::new();
            view.load(&session);
            if regenerate || !matches!(view.state(), SlotState::Ready(_)) {
                let generator = generator()?;
                view.generate(&generator, &mut session).await;
            }
            render(view.state(), print_diet)?;
        }
        Command::Scan { image } => {
            let bytes = std::fs::read(&image)?;
            let mime = mime_for(&image)?;
            let generator = generator()?;
            let mut scanner = MealScanner::new();
            scanner.analyze(&generator, &session, &bytes, mime).await;
            render(scanner.state(), print_analysis)?;
        }
        Command::Clear { plan } => {
            match plan {
                PlanKind::Fitness => FitnessPlanView::new().clear(&mut session)?,
                PlanKind::Diet => DietPlanView::new().clear(&mut session)?,
            }
            println!("🗑️  Plano removido.");
        }
        Command::Show => {
            if let Some(user) = session.current() {
                println!("{}", serde_json::to_string_pretty(user)?);
            }
        }
        Command::Targets { activity } => {
            let profile = session.current().ok_or(FitError::MissingProfile)?.require_profile()?;
            let targets = nutrition::estimate_targets(profile, activity);
            println!("🔥 Gasto diário estimado: {} kcal", targets.tdee);
            println!("   Proteínas: {} g | Carboidratos: {} g | Gorduras: {} g", targets.protein, targets.carbs, targets.fats);
        }
    }
    Ok(())
}

fn generator() -> Result<PlanGenerator, FitError> {
    let config = Config::from_env()?;
    Ok(PlanGenerator::new(GeminiClient::new(&config)?))
}

fn mime_for(path: &Path) -> Result<&'static str, FitError> {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => Ok("image/jpeg"),
        Some("png") => Ok("image/png"),
        Some("webp") => Ok("image/webp"),
        Some("heic") => Ok("image/heic"),
        Some("heif") => Ok("image/heif"),
        _ => Err(FitError::InvalidInput(format!("Formato de imagem não suportado: {}", path.display()))),
    }
}

fn render<T>(state: &SlotState<T>, print: fn(&T)) -> Result<(), FitError> {
    match state {
        SlotState::Ready(value) => {
            print(value);
            Ok(())
        }
        SlotState::Failed(message) => Err(FitError::InvalidInput(message.clone())),
        SlotState::Idle | SlotState::Loading => Ok(()),
    }
}

fn print_fitness(plan: &FitnessPlan) {
    println!("📋 {}\n", plan.geral_description);
    for workout in &plan.workouts {
        println!("Dia {} - {}", workout.day, workout.focus);
        for exercise in &workout.exercises {
            println!("  • {}: {} x {}", exercise.name, exercise.sets, exercise.reps);
            if let Some(tip) = &exercise.tip {
                println!("    💡 {tip}");
            }
        }
    }
}

fn print_diet(plan: &DietPlan) {
    for day in &plan.weekly_diet {
        println!(
            "{} ({} kcal | P {}g C {}g G {}g)",
            day.day_of_week, day.total_calories, day.total_protein, day.total_carbs, day.total_fats
        );
        for meal in &day.meals {
            println!("  • {}: {} ({} kcal)", meal.name, meal.description, meal.calories);
        }
    }
    let avg = plan.weekly_average;
    println!("\nMédia semanal: {} kcal | P {}g C {}g G {}g", avg.calories, avg.protein, avg.carbs, avg.fats);
}

fn print_analysis(analysis: &MealAnalysis) {
    println!("🍽️  {}", analysis.food_items.join(", "));
    println!(
        "   {} kcal | P {}g C {}g G {}g",
        analysis.calories, analysis.protein, analysis.carbs, analysis.fats
    );
    if let Some(category) = analysis.category() {
        println!("   Classificação: {}", category.label());
    }
    println!("\n{}", analysis.recommendation);
}
