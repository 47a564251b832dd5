use clap::Parser;
use std::fmt;
use std::path::PathBuf;

#[derive(Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Server host to bind to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Server port to bind to
    #[arg(long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Model ID from Hugging Face Hub (must be a two-class DeBERTa-v2
    /// sequence-classification checkpoint)
    #[arg(long, env = "MODEL_ID")]
    pub model_id: Option<String>,

    /// Local path to model directory (takes precedence over --model-id)
    #[arg(long, env = "MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Model revision/branch on Hugging Face
    #[arg(long, env = "MODEL_REVISION", default_value = "main")]
    pub model_revision: String,

    /// Use PyTorch weights instead of safetensors
    #[arg(long, env = "USE_PTH")]
    pub use_pth: bool,

    /// Run on CPU instead of GPU
    #[arg(long, env = "CPU_ONLY")]
    pub cpu_only: bool,

    /// Maximum sequence length allowed
    #[arg(long, env = "MAX_SEQUENCE_LENGTH", default_value = "512")]
    pub max_sequence_length: usize,

    /// Shared secret that callers must present in the Authorization header
    #[arg(long, env = "SERVICE_JWT", hide_env_values = true)]
    pub service_jwt: Option<String>,
}

impl Config {
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured shared secret. An empty string counts as unset.
    pub fn secret(&self) -> Option<String> {
        self.service_jwt.clone().filter(|s| !s.is_empty())
    }

    /// Identifier reported in the `model` response field: the hub id, or the
    /// local directory when loading from disk. `None` when neither source is
    /// configured.
    pub fn model_name(&self) -> Option<String> {
        self.model_id.clone().or_else(|| {
            self.model_path
                .as_ref()
                .map(|path| path.display().to_string())
        })
    }
}

// Manual Debug so the secret never ends up in startup logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("model_id", &self.model_id)
            .field("model_path", &self.model_path)
            .field("model_revision", &self.model_revision)
            .field("use_pth", &self.use_pth)
            .field("cpu_only", &self.cpu_only)
            .field("max_sequence_length", &self.max_sequence_length)
            .field("service_jwt", &self.service_jwt.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_counts_as_unset() {
        let config = Config::parse_from(["verdict", "--service-jwt", ""]);
        assert_eq!(config.secret(), None);
    }

    #[test]
    fn secret_is_passed_through() {
        let config = Config::parse_from(["verdict", "--service-jwt", "s3cret"]);
        assert_eq!(config.secret().as_deref(), Some("s3cret"));
    }

    #[test]
    fn debug_output_redacts_the_secret() {
        let config = Config::parse_from(["verdict", "--service-jwt", "s3cret"]);
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn defaults_require_an_explicit_model_source() {
        let config = Config::parse_from(["verdict"]);
        assert_eq!(config.server_address(), "127.0.0.1:8000");
        assert_eq!(config.max_sequence_length, 512);
        assert_eq!(config.secret(), None);
        assert_eq!(config.model_name(), None);
    }

    #[test]
    fn model_name_prefers_the_hub_id() {
        let config = Config::parse_from(["verdict", "--model-id", "org/toxicity-deberta"]);
        assert_eq!(config.model_name().as_deref(), Some("org/toxicity-deberta"));

        let config = Config::parse_from(["verdict", "--model-path", "/models/toxicity"]);
        assert_eq!(config.model_name().as_deref(), Some("/models/toxicity"));

        let config = Config::parse_from([
            "verdict",
            "--model-id",
            "org/toxicity-deberta",
            "--model-path",
            "/models/toxicity",
        ]);
        assert_eq!(config.model_name().as_deref(), Some("org/toxicity-deberta"));
    }
}
