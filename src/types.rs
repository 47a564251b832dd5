use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Output classes in model order. `top` ties resolve to the first entry.
pub const LABELS: [&str; 2] = ["non-toxic", "toxic"];

fn default_lang() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
    /// Language hint from the caller. Accepted for wire compatibility; the
    /// classifier does not use it.
    #[serde(default = "default_lang")]
    pub lang: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub model: String,
    pub top: &'static str,
    pub scores: Scores,
}

#[derive(Debug, Serialize)]
pub struct Scores {
    #[serde(rename = "non-toxic")]
    pub non_toxic: f64,
    pub toxic: f64,
}

/// Numerically stable softmax over the two class logits: subtract the max
/// before exponentiating so large logits cannot overflow.
pub fn softmax(logits: [f32; 2]) -> [f64; 2] {
    let max = f64::from(logits[0]).max(f64::from(logits[1]));
    let e0 = (f64::from(logits[0]) - max).exp();
    let e1 = (f64::from(logits[1]) - max).exp();
    let sum = e0 + e1;
    [e0 / sum, e1 / sum]
}

impl ClassifyResponse {
    pub fn from_logits(model: String, logits: [f32; 2]) -> Self {
        let [non_toxic, toxic] = softmax(logits);
        let top = if toxic > non_toxic {
            LABELS[1]
        } else {
            LABELS[0]
        };
        Self {
            model,
            top,
            scores: Scores { non_toxic, toxic },
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "bad token",
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "classification failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one() {
        let [a, b] = softmax([1.3, -0.7]);
        assert!((a + b - 1.0).abs() < 1e-9);
        assert!(a > 0.0 && b > 0.0);
    }

    #[test]
    fn softmax_is_stable_for_extreme_logits() {
        let [a, b] = softmax([1000.0, 0.0]);
        assert!(a.is_finite() && b.is_finite());
        assert!((a + b - 1.0).abs() < 1e-9);
        assert!(a > 0.999);
    }

    #[test]
    fn top_is_argmax() {
        let response = ClassifyResponse::from_logits("m".into(), [-2.0, 3.0]);
        assert_eq!(response.top, "toxic");
        assert!(response.scores.toxic > response.scores.non_toxic);

        let response = ClassifyResponse::from_logits("m".into(), [3.0, -2.0]);
        assert_eq!(response.top, "non-toxic");
    }

    #[test]
    fn tied_logits_resolve_to_first_label() {
        let response = ClassifyResponse::from_logits("m".into(), [0.5, 0.5]);
        assert_eq!(response.top, "non-toxic");
    }

    #[test]
    fn scores_serialize_with_hyphenated_label() {
        let response = ClassifyResponse::from_logits("org/toxicity-deberta".into(), [2.0, -1.0]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["model"], "org/toxicity-deberta");
        assert_eq!(json["top"], "non-toxic");
        assert!(json["scores"]["non-toxic"].is_f64());
        assert!(json["scores"]["toxic"].is_f64());
    }

    #[test]
    fn lang_defaults_to_en() {
        let request: ClassifyRequest = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(request.lang, "en");
        assert_eq!(request.text, "hi");
    }
}
