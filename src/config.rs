//! Configuração do phantom-crop carregada a partir de `phantom-crop.toml`.
//!
//! A struct [`CropConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! As variáveis de ambiente `PHANTOM_CROP_SERVER_URL` e
//! `PHANTOM_CROP_DESCRIBE_URL` têm precedência sobre o arquivo.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::gateway::BackendConfig;
use crate::state_machine::ReadingMode;

/// Nome do arquivo de configuração procurado no diretório atual.
pub const CONFIG_FILE: &str = "phantom-crop.toml";

/// Como a leitura de um ritual concluído é preenchida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingSource {
    /// Usa o valor devolvido pelo serviço de descrição.
    Resolved,
    /// Usa sempre o texto fixo de `placeholder_reading`.
    Placeholder,
}

/// Configuração de nível superior carregada de `phantom-crop.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropConfig {
    /// Usa os substitutos locais em vez dos serviços reais.
    #[serde(default = "default_use_mock")]
    pub use_mock: bool,

    /// Endpoint do serviço de remoção de fundo.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Endpoint do serviço de descrição (opcional).
    #[serde(default)]
    pub describe_url: Option<String>,

    /// Origem da leitura: "resolved" ou "placeholder".
    #[serde(default = "default_reading")]
    pub reading: ReadingSource,

    /// Texto usado quando `reading = "placeholder"`.
    #[serde(default = "default_placeholder_reading")]
    pub placeholder_reading: String,

    /// Atraso do substituto de remoção, em milissegundos.
    #[serde(default = "default_mock_delay_ms")]
    pub mock_delay_ms: u64,

    /// Tempo até um ritual falho voltar sozinho para IDLE, em milissegundos.
    #[serde(default = "default_failure_reset_ms")]
    pub failure_reset_ms: u64,

    /// Timeout total de cada requisição HTTP, em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// Valor padrão para o modo simulado: ligado.
fn default_use_mock() -> bool {
    true
}

// Valor padrão para o endpoint de remoção.
fn default_server_url() -> String {
    "http://localhost:5000/sever".to_string()
}

fn default_reading() -> ReadingSource {
    ReadingSource::Resolved
}

fn default_placeholder_reading() -> String {
    "A mysterious presence emerges from the shadows...".to_string()
}

// Valor padrão para o atraso simulado: 2000ms.
fn default_mock_delay_ms() -> u64 {
    2000
}

// Valor padrão para o auto-reset após falha: 3000ms.
fn default_failure_reset_ms() -> u64 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            use_mock: default_use_mock(),
            server_url: default_server_url(),
            describe_url: None,
            reading: default_reading(),
            placeholder_reading: default_placeholder_reading(),
            mock_delay_ms: default_mock_delay_ms(),
            failure_reset_ms: default_failure_reset_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl CropConfig {
    /// Carrega a configuração de `phantom-crop.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;
        config.apply_env();
        Ok(config)
    }

    /// Carrega a configuração de um caminho específico, sem aplicar o ambiente.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = toml::from_str::<CropConfig>(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    // Variáveis de ambiente têm precedência sobre o arquivo para os endpoints.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("PHANTOM_CROP_SERVER_URL")
            && !url.is_empty()
        {
            self.server_url = url;
        }
        if let Ok(url) = std::env::var("PHANTOM_CROP_DESCRIBE_URL")
            && !url.is_empty()
        {
            self.describe_url = Some(url);
        }
    }

    /// Configuração inicial do backend derivada deste arquivo.
    pub fn backend(&self) -> BackendConfig {
        BackendConfig {
            use_mock: self.use_mock,
            server_url: self.server_url.clone(),
            describe_url: self.describe_url.clone(),
        }
    }

    pub fn reading_mode(&self) -> ReadingMode {
        match self.reading {
            ReadingSource::Resolved => ReadingMode::Resolved,
            ReadingSource::Placeholder => ReadingMode::Placeholder(self.placeholder_reading.clone()),
        }
    }

    pub fn mock_delay(&self) -> Duration {
        Duration::from_millis(self.mock_delay_ms)
    }

    pub fn failure_reset(&self) -> Duration {
        Duration::from_millis(self.failure_reset_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
