use std::env;
use std::path::PathBuf;

/// Where the scenario inputs come from, in precedence order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// `IMAGES` or `IMAGE`
    Explicit(Vec<PathBuf>),
    /// Every regular, non-hidden file in the directory
    SamplesDir(PathBuf),
}

#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Base URL for REST and batched-RPC
    pub api_url: String,
    /// host:port of the gateway's gRPC passthrough
    pub api_grpc_addr: String,
    /// host:port of the model service
    pub model_addr: String,
    pub out_path: PathBuf,
    pub images: ImageSource,
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = env::var("API_URL").unwrap_or_else(|_| "http://127.0.0.1:4000".to_string());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue("API_URL".to_string()));
        }

        Ok(HarnessConfig {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_grpc_addr: env::var("API_GRPC_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:50052".to_string()),
            model_addr: env::var("MODEL_ADDR").unwrap_or_else(|_| "127.0.0.1:50051".to_string()),
            out_path: env::var("BENCH_OUT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./benchmarks.json")),
            images: image_source(
                env::var("IMAGES").ok().as_deref(),
                env::var("IMAGE").ok().as_deref(),
                env::var("SAMPLES_DIR").ok().as_deref(),
            ),
        })
    }
}

/// `IMAGES` wins over `IMAGE`, which wins over the sample directory.
pub fn image_source(images: Option<&str>, image: Option<&str>, samples_dir: Option<&str>) -> ImageSource {
    if let Some(list) = images.filter(|s| !s.trim().is_empty()) {
        return ImageSource::Explicit(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect(),
        );
    }
    if let Some(single) = image.map(str::trim).filter(|s| !s.is_empty()) {
        return ImageSource::Explicit(vec![PathBuf::from(single)]);
    }
    ImageSource::SamplesDir(PathBuf::from(samples_dir.unwrap_or("./samples")))
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(var) => write!(f, "Invalid value for: {}", var),
        }
    }
}

impl std::error::Error for ConfigError {}
