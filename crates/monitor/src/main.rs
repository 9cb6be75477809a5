//! # Sonda Monitor
//!
//! Monitor de console para sondas de pressão e repetidores de campo
//! em enlace serial. Decodifica quadros binários de 26 bytes e mantém
//! estado vivo por dispositivo, indicadores de vitalidade e sumários
//! de período.
//!
//! ## Uso
//! ```bash
//! sonda_monitor            # lê da porta configurada (ou autodetecta)
//! sonda_monitor --portas   # só lista as portas seriais e sai
//! ```

mod app;
mod display;
mod reader;
mod serial;
mod session;
#[cfg(test)]
mod testutil;

use app::MonitorApp;
use reader::ReaderOptions;
use serial::SerialSource;
use session::ReaderSession;
use sonda_core::config::AppConfig;
use std::time::Instant;
use tracing::{error, info, warn};

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Modo utilitário: listar portas ──
    if std::env::args().any(|a| a == "--portas") {
        println!("Portas seriais disponíveis:");
        serial::list_ports();
        return;
    }

    // ── Carregar config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    for problem in config.validate() {
        warn!("Configuração: {problem}");
    }

    // ── Porta serial ──
    let port = match serial::pick_port(&config.serial.port) {
        Ok(port) => port,
        Err(e) => {
            error!("Sem porta para ler: {e}");
            return;
        }
    };

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   ⚡ SONDA MONITOR – ATIVO (Rust)");
    println!("══════════════════════════════════════════════");
    println!("  Porta:      {port}");
    println!("  Velocidade: {} baud", config.serial.baud_rate);
    println!("  Quadro:     {} bytes", sonda_core::FRAME_LEN);
    println!("  Sumário:    a cada {}s", config.monitor.summary_interval_secs);
    println!("══════════════════════════════════════════════");
    println!();

    let source = match SerialSource::open(&port, config.serial.baud_rate) {
        Ok(source) => source,
        Err(e) => {
            error!("Falha ao abrir {port}: {e}");
            return;
        }
    };

    // ── Sessão de leitura + agregação ──
    let options = ReaderOptions {
        poll_timeout: config.serial.poll_timeout(),
        fw_offset: config.protocol.fw_offset(),
        resync_after_unknown: config.protocol.resync_after_unknown,
    };

    let mut session = ReaderSession::new();
    let rx = match session.connect(Box::new(source), options) {
        Ok(rx) => rx,
        Err(e) => {
            error!("Falha ao iniciar sessão: {e}");
            return;
        }
    };

    let mut app = MonitorApp::new(&config.monitor, Instant::now());
    app.subscribe(display::console_subscriber());

    // Roda até o leitor encerrar (erro de E/S na porta)
    app::run_loop(&mut app, &rx, config.monitor.summary_interval());

    // ── Encerramento: aguarda o leitor de verdade, sem sleep ──
    if let Some(exit) = session.join() {
        info!("Sessão encerrada: {exit:?}");
    }

    let stats = app.registry().stats();
    println!();
    println!("═══ ESTATÍSTICAS DA SESSÃO ═══");
    println!("  Pacotes:       {}", stats.total_packets);
    println!("  Sondas únicas: {}", app.registry().unique_sensors());
    println!("  Repetidores:   {}", app.registry().unique_repeaters());
    println!("  Desconhecidos: {}", stats.unknown_packets);
    println!(
        "  Taxa média:    {:.1} pac/s",
        app.registry().receive_rate(Instant::now())
    );
}
