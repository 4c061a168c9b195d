use fitbuilder::ai::client::GeminiClient;
use fitbuilder::ai::generator::{PlanGenerator, PlanSource};
use fitbuilder::core::plans::Recommendation;
use fitbuilder::core::profile::UserProfile;
use fitbuilder::store::{MemoryStore, Session};
use fitbuilder::views::{FitnessPlanView, MealScanner, SlotState};
use fitbuilder::{Config, FitError};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/models/gemini-2.5-flash:generateContent";

fn profile() -> UserProfile {
    serde_json::from_str(include_str!("fixtures/profile.json")).unwrap()
}

fn generator_for(base_url: &str, max_retries: u32) -> PlanGenerator {
    let mut config = Config::new("test-key");
    config.base_url = base_url.to_string();
    config.max_retries = max_retries;
    config.retry_backoff = Duration::from_millis(5);
    PlanGenerator::new(GeminiClient::new(&config).unwrap())
}

/// Wraps model text the way `generateContent` returns it.
fn model_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    }))
}

fn fitness_json() -> String {
    json!({
        "geralDescription": "Aqueça 10 minutos e durma bem.",
        "workouts": [
            { "day": 1, "focus": "Peito e Tríceps", "exercises": [
                { "name": "Supino reto", "sets": 4, "reps": "8-10", "tip": "Escápulas retraídas." }
            ]},
            { "day": 2, "focus": "Costas e Bíceps", "exercises": [
                { "name": "Remada curvada", "sets": 4, "reps": "8-12" }
            ]}
        ]
    })
    .to_string()
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn fitness_plan_is_requested_with_schema_and_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(model_reply(&fitness_json()))
        .expect(1)
        .mount(&server)
        .await;

    let plan = generator_for(&server.uri(), 0).generate_fitness_plan(&profile()).await.unwrap();
    assert_eq!(plan.workouts.len(), 2);
    assert_eq!(plan.workouts[0].exercises[0].name, "Supino reto");
    assert_eq!(plan.workouts[1].exercises[0].tip, None);

    let body = &request_bodies(&server).await[0];
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("- **Nome:** Carlos"));
    assert!(prompt.contains("- **Condições Pré-existentes:** asthma"));
    assert!(body["systemInstruction"]["parts"][0]["text"].as_str().unwrap().contains("JSON"));
    let config = &body["generationConfig"];
    assert_eq!(config["responseMimeType"], "application/json");
    assert_eq!(config["responseSchema"]["properties"]["workouts"]["type"], "array");
}

#[tokio::test]
async fn diet_plan_request_carries_diet_schema() {
    let server = MockServer::start().await;
    let day = json!({
        "dayOfWeek": "Segunda-feira",
        "meals": [{ "name": "Almoço", "description": "Arroz, feijão e frango", "calories": 700, "protein": 50, "carbs": 80, "fats": 15 }],
        "totalCalories": 700, "totalProtein": 50, "totalCarbs": 80, "totalFats": 15
    });
    let diet = json!({
        "weeklyDiet": vec![day; 7],
        "weeklyAverage": { "calories": 700, "protein": 50, "carbs": 80, "fats": 15 }
    });
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(model_reply(&diet.to_string()))
        .mount(&server)
        .await;

    let plan = generator_for(&server.uri(), 0).generate_diet_plan(&profile()).await.unwrap();
    assert_eq!(plan.weekly_diet.len(), 7);
    assert_eq!(plan.weekly_average.protein, 50);
    assert!(plan.macro_mismatches().is_empty());

    let body = &request_bodies(&server).await[0];
    assert!(body.get("systemInstruction").is_none());
    let schema = &body["generationConfig"]["responseSchema"];
    assert_eq!(schema["properties"]["weeklyAverage"]["type"], "object");
}

#[tokio::test]
async fn meal_image_is_sent_before_prompt() {
    let server = MockServer::start().await;
    let analysis = json!({
        "foodItems": ["Pastel", "Refrigerante"],
        "calories": 850, "protein": 15, "carbs": 95, "fats": 45,
        "recommendation": "Não Recomendada: muita gordura para o seu objetivo."
    });
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(model_reply(&analysis.to_string()))
        .mount(&server)
        .await;

    let result = generator_for(&server.uri(), 0)
        .analyze_meal_image("aW1n", "image/jpeg", &profile())
        .await
        .unwrap();
    assert_eq!(result.category(), Some(Recommendation::NotRecommended));

    let body = &request_bodies(&server).await[0];
    let parts = &body["contents"][0]["parts"];
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(parts[0]["inlineData"]["data"], "aW1n");
    assert!(parts[1]["text"].as_str().unwrap().contains("ganhar massa muscular"));
}

#[tokio::test]
async fn invalid_image_input_never_reaches_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(model_reply("{}")).expect(0).mount(&server).await;

    let generator = generator_for(&server.uri(), 0);
    let err = generator.analyze_meal_image("", "image/png", &profile()).await.unwrap_err();
    assert!(matches!(err, FitError::InvalidInput(_)));
    let err = generator.analyze_meal_image("aW1n", "text/plain", &profile()).await.unwrap_err();
    assert!(matches!(err, FitError::InvalidInput(_)));
}

#[tokio::test]
async fn malformed_text_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(model_reply("Desculpe, não consigo ajudar."))
        .expect(1)
        .mount(&server)
        .await;

    let err = generator_for(&server.uri(), 3).generate_fitness_plan(&profile()).await.unwrap_err();
    match err {
        FitError::MalformedResponse { schema, raw, .. } => {
            assert_eq!(schema, "FitnessPlan");
            assert_eq!(raw, "Desculpe, não consigo ajudar.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn auth_failure_surfaces_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": 401, "message": "API key not valid.", "status": "UNAUTHENTICATED" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = generator_for(&server.uri(), 3).generate_diet_plan(&profile()).await.unwrap_err();
    match err {
        FitError::Service { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "API key not valid.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_retried_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(model_reply(&fitness_json()))
        .expect(1)
        .mount(&server)
        .await;

    let plan = generator_for(&server.uri(), 2).generate_fitness_plan(&profile()).await.unwrap();
    assert_eq!(plan.workouts.len(), 2);
}

#[tokio::test]
async fn server_error_without_retries_fails_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let err = generator_for(&server.uri(), 0).generate_fitness_plan(&profile()).await.unwrap_err();
    assert!(matches!(err, FitError::Service { status: 500, .. }));
}

#[tokio::test]
async fn network_error_leaves_view_failed_with_original_message() {
    // Nothing listens on the discard port.
    let generator = generator_for("http://127.0.0.1:9", 0);
    let mut session = Session::new(MemoryStore::new());
    session.sign_in("carlos@example.com").unwrap();
    session.set_profile(profile()).unwrap();

    let mut view = FitnessPlanView::new();
    let state = view.generate(&generator, &mut session).await;
    match state {
        SlotState::Failed(message) => {
            assert!(message.starts_with("Falha ao gerar o plano de treino: API Error"), "{message}");
        }
        other => panic!("unexpected state: {other:?}"),
    }
    assert!(!view.slot_mut().is_loading());
    assert!(session.current().unwrap().fitness_plan.is_none());
}

#[tokio::test]
async fn scanner_view_end_to_end() {
    let server = MockServer::start().await;
    let analysis = json!({
        "foodItems": ["Salada", "Salmão"],
        "calories": 520, "protein": 38, "carbs": 12, "fats": 30,
        "recommendation": "Recomendada: ótima escolha"
    });
    Mock::given(method("POST")).respond_with(model_reply(&analysis.to_string())).mount(&server).await;

    let generator = generator_for(&server.uri(), 0);
    let mut session = Session::new(MemoryStore::new());
    session.sign_in("carlos@example.com").unwrap();
    session.set_profile(profile()).unwrap();

    let mut scanner = MealScanner::new();
    scanner.analyze(&generator, &session, &[0xFF, 0xD8, 0xFF], "image/jpeg").await;
    assert_eq!(scanner.recommendation(), Some(Recommendation::Recommended));

    let body = &request_bodies(&server).await[0];
    assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["data"], "/9j/");
}
