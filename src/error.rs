use thiserror::Error;

#[derive(Error, Debug)]
pub enum FitError {
    #[error("API Error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Perfil de usuário não encontrado.")]
    MissingProfile,

    #[error("Invalid Input: {0}")]
    InvalidInput(String),

    #[error("Service Error {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Empty Response: {0}")]
    EmptyResponse(String),

    #[error("A resposta da IA para {schema} não estava em um formato JSON válido.")]
    MalformedResponse {
        schema: &'static str,
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("A request is already in flight for this plan")]
    Busy,
}

impl FitError {
    /// Transport failures, rate limiting and server-side errors. Parse
    /// failures are never transient.
    pub fn is_transient(&self) -> bool {
        match self {
            FitError::Api(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FitError::Service { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Text safe to show to the user. Never includes raw AI output.
    pub fn user_message(&self) -> String {
        match self {
            FitError::MissingProfile | FitError::MalformedResponse { .. } => self.to_string(),
            FitError::InvalidInput(msg) => msg.clone(),
            FitError::Service { status: 429, .. } => {
                "O serviço de IA atingiu o limite de uso. Aguarde um momento e tente novamente."
                    .into()
            }
            FitError::Busy => "Aguarde a conclusão da solicitação atual.".into(),
            FitError::Api(_) | FitError::Service { .. } | FitError::EmptyResponse(_) => {
                "Não foi possível contatar o serviço de IA. Por favor, tente novamente.".into()
            }
            FitError::Json(_) | FitError::Io(_) | FitError::Config(_) => {
                "Ocorreu um erro desconhecido.".into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malformed() -> FitError {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        FitError::MalformedResponse { schema: "DietPlan", raw: "not json".into(), source }
    }

    #[test]
    fn malformed_response_names_schema_but_hides_raw_text() {
        let err = malformed();
        assert!(err.to_string().contains("DietPlan"));
        assert!(!err.user_message().contains("not json"));
        assert!(!err.is_transient());
    }

    #[test]
    fn only_rate_limits_and_server_errors_are_transient() {
        let rate = FitError::Service { status: 429, message: "quota".into() };
        let server = FitError::Service { status: 503, message: "down".into() };
        let auth = FitError::Service { status: 401, message: "bad key".into() };
        assert!(rate.is_transient());
        assert!(server.is_transient());
        assert!(!auth.is_transient());
        assert!(!FitError::MissingProfile.is_transient());
    }
}
