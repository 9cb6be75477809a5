//! # Sonda Simulador
//!
//! Gera quadros sintéticos de sonda e repetidor e os escreve numa porta
//! serial, para exercitar o monitor sem hardware de campo (use um par
//! de portas virtuais, ex: `socat -d -d pty,raw pty,raw`).
//!
//! Os valores variam em rampa determinística — sem aleatoriedade, os
//! quadros são reprodutíveis.

use sonda_core::config::AppConfig;
use sonda_core::decode::{FrameFields, REPEATER_TYPE_BYTE, SENSOR_TYPE_BYTE, encode_frame};
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Campos de um quadro de sonda no ciclo dado, em rampa determinística.
fn sensor_fields(id: u32, cycle: u32, fw_version: i8) -> FrameFields {
    FrameFields {
        type_byte: SENSOR_TYPE_BYTE,
        id,
        // 1..=3000 contagens ≈ 0.0 a 82.5 bar, em dente de serra
        raw_pressure: 1 + (cycle.wrapping_mul(37) % 3000) as u16,
        // ~3.1 V com ondulação leve
        raw_voltage: 200 + (cycle % 10) as u8,
        // 20..29 °C
        raw_temperature: 75 + (cycle % 10) as u8,
        fw_version,
        // −60..−89 dBm
        raw_rssi: 60 + (cycle % 30) as u8,
    }
}

fn repeater_fields(id: u32, cycle: u32, fw_version: i8) -> FrameFields {
    FrameFields {
        type_byte: REPEATER_TYPE_BYTE,
        id,
        raw_pressure: 1,
        raw_voltage: 231,
        raw_temperature: 90,
        fw_version,
        raw_rssi: 55 + (cycle % 10) as u8,
    }
}

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);
    let sim = &config.simulador;

    if sim.port.is_empty() {
        error!("Configure [simulador].port no config.toml (porta de saída)");
        return;
    }

    let interval = Duration::from_secs_f64(sim.interval_secs);
    let fw_offset = config.protocol.fw_offset();

    let mut port = match serialport::new(&sim.port, config.serial.baud_rate)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .timeout(Duration::from_secs(1))
        .open()
    {
        Ok(port) => port,
        Err(e) => {
            error!("Falha ao abrir {}: {e}", sim.port);
            return;
        }
    };

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   ⚡ SONDA SIMULADOR – ATIVO (Rust)");
    println!("══════════════════════════════════════════════");
    println!("  Porta:      {}", sim.port);
    println!("  Intervalo:  {:.1}s", sim.interval_secs);
    println!("  Sondas:     {}", sim.sensor_ids.len());
    println!("══════════════════════════════════════════════");
    println!();

    // ── Loop principal ──
    let mut cycle: u32 = 0;
    loop {
        let cycle_start = Instant::now();

        for &id in &sim.sensor_ids {
            let frame = encode_frame(&sensor_fields(id, cycle, sim.fw_version), fw_offset);
            match port.write_all(&frame) {
                Ok(()) => info!("→ sonda 0x{id:08X} ({} bytes)", frame.len()),
                Err(e) => warn!("Erro ao escrever quadro: {e}"),
            }
        }

        if sim.repeater_every > 0 && cycle % sim.repeater_every == 0 {
            let frame = encode_frame(
                &repeater_fields(sim.repeater_id, cycle, sim.fw_version),
                fw_offset,
            );
            match port.write_all(&frame) {
                Ok(()) => info!("→ repetidor 0x{:08X}", sim.repeater_id),
                Err(e) => warn!("Erro ao escrever quadro: {e}"),
            }
        }

        cycle = cycle.wrapping_add(1);

        // Dormir pelo tempo restante do intervalo
        let elapsed = cycle_start.elapsed();
        if elapsed < interval {
            std::thread::sleep(interval - elapsed);
        }
    }
}
