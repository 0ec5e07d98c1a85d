//! Interface de terminal do phantom-crop: spinner e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner de progresso e `console` para
//! estilização com cores. O [`RitualProgress`] acompanha visualmente um
//! ritual no terminal, da submissão ao estado final.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::artifact::{ArtifactHandle, ArtifactStore};
use crate::state_machine::{ProcessedImage, RitualRecord, RitualState};

/// Indicador visual de progresso para um ritual no terminal.
///
/// Exibe um spinner animado enquanto o ritual está em SEVERING e mensagens
/// coloridas para sucesso (verde), falha (vermelho) e avisos (amarelo).
pub struct RitualProgress {
    // Spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para mensagens de sucesso.
    green: Style,
    // Estilo vermelho para mensagens de falha.
    red: Style,
    // Estilo amarelo para avisos.
    yellow: Style,
    // Estilo discreto para detalhes.
    dim: Style,
}

impl RitualProgress {
    /// Inicia o spinner com o nome do arquivo oferecido.
    pub fn start(file_name: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.red} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("{}: {file_name}", RitualState::Idle));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
        }
    }

    /// Atualiza a mensagem do spinner para refletir o estado atual.
    pub fn update_state(&self, state: RitualState) {
        let message = match state {
            RitualState::Severing => "SEVERING: separating the spirit from the plane...".to_string(),
            other => other.to_string(),
        };
        self.pb.set_message(message);
    }

    /// Finaliza o spinner e mostra o par original/processado lado a lado.
    pub fn complete(&self, image: &ProcessedImage, store: &ArtifactStore) {
        self.pb.finish_and_clear();
        println!("  {} Spirit severed from {}", self.green.apply_to("✓"), image.source_name);
        print_artifact(&self.dim, "original ", &image.original, store);
        print_artifact(&self.dim, "processed", &image.processed, store);
        println!("  reading:   {}", render_reading(image.reading.as_deref()));
    }

    /// Finaliza o spinner e mostra o motivo da falha.
    pub fn failed(&self, reason: Option<&str>, reset_ms: u64) {
        self.pb.finish_and_clear();
        println!(
            "  {} The ritual failed: {}",
            self.red.apply_to("✗"),
            reason.unwrap_or("unknown cause")
        );
        println!(
            "  {}",
            self.yellow
                .apply_to(format!("The portal reopens in {reset_ms}ms."))
        );
    }

    /// Finaliza o spinner com um aviso (ex.: submissão recusada).
    pub fn warn(&self, message: &str) {
        self.pb.finish_and_clear();
        println!("  {} {message}", self.yellow.apply_to("!"));
    }
}

/// Imprime o registro do ritual formatado em JSON com estilo colorido.
pub fn print_record(record: &RitualRecord) {
    let style = if record.failure.is_some() {
        Style::new().red().bold()
    } else {
        Style::new().green().bold()
    };
    println!();
    println!("{}", style.apply_to("─── Ritual Record ───"));
    println!("{}", serde_json::to_string_pretty(record).unwrap_or_default());
}

// Ausência de leitura é exibida de forma distinta de uma leitura vazia.
fn render_reading(reading: Option<&str>) -> String {
    match reading {
        Some(text) => format!("\"{text}\""),
        None => "(no reading)".to_string(),
    }
}

fn print_artifact(dim: &Style, label: &str, handle: &ArtifactHandle, store: &ArtifactStore) {
    let size = store.resolve(handle).map(<[u8]>::len).unwrap_or(0);
    println!(
        "  {label}: {handle} {}",
        dim.apply_to(format!("({size} bytes)"))
    );
}
