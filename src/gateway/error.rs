//! Tipos de erro do gateway de backend.
//!
//! Define [`GatewayError`] com variantes para falha remota, erro de rede e
//! leitura indisponível. Usa `thiserror` para derivar `Display` e `Error`
//! a partir dos atributos `#[error(...)]`.

use thiserror::Error;

/// Erros que podem ocorrer ao falar com os serviços de remoção e descrição.
///
/// - [`RemoteFailure`](GatewayError::RemoteFailure): o serviço respondeu fora da faixa 2xx
/// - [`Network`](GatewayError::Network): falha na camada de rede
/// - [`DescriptionUnavailable`](GatewayError::DescriptionUnavailable): sem leitura utilizável
#[derive(Debug, Error)]
pub enum GatewayError {
    /// O serviço retornou um status fora da faixa de sucesso.
    /// Carrega o código HTTP e o texto do status.
    #[error("the spirits refused (status {status}): {status_text}")]
    RemoteFailure { status: u16, status_text: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// O serviço de descrição não produziu uma leitura.
    #[error("reading unavailable: {0}")]
    DescriptionUnavailable(String),
}

impl GatewayError {
    /// Monta uma [`RemoteFailure`](GatewayError::RemoteFailure) a partir do status HTTP.
    pub fn remote(status: reqwest::StatusCode) -> Self {
        GatewayError::RemoteFailure {
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
        }
    }
}
