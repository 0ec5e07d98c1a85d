//! Tipos de dados trocados com o gateway de backend.
//!
//! [`ImageFile`] é a imagem oferecida pelo usuário, [`BackendConfig`] a
//! configuração capturada no momento da submissão e [`SharedConfig`] o
//! valor mutável em tempo de execução do qual os snapshots são tirados.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Uma imagem oferecida ao portal: nome, tipo MIME declarado e bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Nome do arquivo, enviado como `filename` no upload multipart.
    pub name: String,
    /// Tipo MIME declarado (ex.: "image/png").
    pub mime: String,
    /// Conteúdo bruto da imagem.
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

/// Configuração do backend usada por uma única chamada.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Usa os substitutos locais determinísticos em vez da rede.
    pub use_mock: bool,
    /// Endpoint do serviço de remoção de fundo.
    pub server_url: String,
    /// Endpoint opcional do serviço de descrição.
    pub describe_url: Option<String>,
}

/// Corpo JSON retornado pelo serviço de descrição.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingResponse {
    /// Legenda curta descrevendo a imagem.
    pub reading: String,
}

/// Configuração compartilhada, alterável enquanto um ritual está em andamento.
///
/// O controlador tira um [`snapshot`](SharedConfig::snapshot) a cada
/// submissão; alterações posteriores só valem para a próxima.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    tx: Arc<watch::Sender<BackendConfig>>,
}

impl SharedConfig {
    pub fn new(config: BackendConfig) -> Self {
        let (tx, _rx) = watch::channel(config);
        Self { tx: Arc::new(tx) }
    }

    /// Cópia do valor atual.
    pub fn snapshot(&self) -> BackendConfig {
        self.tx.borrow().clone()
    }

    /// Inverte `use_mock` e retorna o novo valor.
    pub fn toggle_mock(&self) -> bool {
        let mut now_mock = false;
        self.tx.send_modify(|config| {
            config.use_mock = !config.use_mock;
            now_mock = config.use_mock;
        });
        now_mock
    }

    /// Troca o endpoint do serviço de remoção.
    pub fn set_server_url(&self, url: impl Into<String>) {
        let url = url.into();
        self.tx.send_modify(|config| config.server_url = url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BackendConfig {
        BackendConfig {
            use_mock: true,
            server_url: "http://localhost:5000/sever".into(),
            describe_url: None,
        }
    }

    #[test]
    fn toggle_flips_and_reports() {
        let shared = SharedConfig::new(config());
        assert!(!shared.toggle_mock());
        assert!(!shared.snapshot().use_mock);
        assert!(shared.toggle_mock());
    }

    #[test]
    fn snapshot_is_detached_from_later_changes() {
        let shared = SharedConfig::new(config());
        let before = shared.snapshot();
        shared.toggle_mock();
        shared.set_server_url("http://spirits.example/sever");

        assert!(before.use_mock);
        assert_eq!(before.server_url, "http://localhost:5000/sever");
        assert_eq!(shared.snapshot().server_url, "http://spirits.example/sever");
    }

    #[test]
    fn clones_share_the_same_value() {
        let shared = SharedConfig::new(config());
        let other = shared.clone();
        other.toggle_mock();
        assert!(!shared.snapshot().use_mock);
    }

    #[test]
    fn reading_response_deserializes() {
        let resp: ReadingResponse =
            serde_json::from_str(r#"{"reading": "A cat, mid-leap"}"#).unwrap();
        assert_eq!(resp.reading, "A cat, mid-leap");
    }
}
