//! Interface de linha de comando do phantom-crop baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (sever, session,
//! config) e flags globais (--live, --server-url, --placeholder, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// phantom-crop: separa o espírito do plano (remoção de fundo de imagens).
#[derive(Debug, Parser)]
#[command(name = "phantom-crop", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Usa os serviços reais em vez do modo simulado.
    #[arg(long, global = true, default_value_t = false)]
    pub live: bool,

    /// Endpoint do serviço de remoção de fundo.
    #[arg(long, global = true)]
    pub server_url: Option<String>,

    /// Usa a leitura fixa em vez de consultar o serviço de descrição.
    #[arg(long, global = true, default_value_t = false)]
    pub placeholder: bool,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Executa um único ritual sobre a imagem fornecida.
    Sever {
        /// Caminho da imagem a ser oferecida ao portal.
        path: PathBuf,

        /// Onde gravar a imagem processada.
        #[arg(long, default_value = "phantom_severed.png")]
        out: PathBuf,

        /// Imprime o registro do ritual em JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Sessão interativa: offer, reset, toggle, status, export, record, quit.
    Session,

    /// Mostra a configuração efetiva.
    Config,
}
