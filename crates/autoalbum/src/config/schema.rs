use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo-instruct";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    /// Directory scanned for new images. Required: resolution fails when it
    /// is missing or blank.
    #[serde(default)]
    pub pictures_directory: Option<String>,
    /// Root of the `<year>/<month>` archive. Falls back to
    /// `<documents>/by-year`.
    #[serde(default)]
    pub archive_directory: Option<String>,
    #[serde(default)]
    pub tesseract: TesseractConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TesseractConfig {
    /// Tessdata directory. Falls back to `TESSDATA_PREFIX`.
    #[serde(default)]
    pub data_path: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "eng".to_string()
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            language: default_language(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_openai_env_var")]
    pub api_key_env_var: Option<String>,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_openai_env_var() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_openai_env_var(),
            model: default_openai_model(),
            base_url: default_openai_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_vision_env_var")]
    pub api_key_env_var: Option<String>,
    #[serde(default = "default_vision_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_max_labels")]
    pub max_results: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_vision_env_var() -> Option<String> {
    Some("GOOGLE_VISION_API_KEY".to_string())
}

fn default_vision_endpoint() -> String {
    DEFAULT_VISION_ENDPOINT.to_string()
}

fn default_max_labels() -> u32 {
    10
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_vision_env_var(),
            endpoint: default_vision_endpoint(),
            max_results: default_max_labels(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Which files in the pictures directory are picked up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_prefix() -> String {
    "img".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["jpg".to_string(), "jpeg".to_string()]
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            extensions: default_extensions(),
        }
    }
}
