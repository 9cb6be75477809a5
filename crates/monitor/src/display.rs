//! Renderização de eventos no console.
//!
//! Uma linha por amostra, no formato do utilitário de bancada, mais
//! sumarização de período e mudanças de vitalidade — tudo via tracing,
//! sem estado próprio.

use sonda_core::events::MonitorEvent;
use sonda_core::liveness::{LivenessSnapshot, LivenessState};
use sonda_core::period::PeriodSummary;
use sonda_core::registry::UpdateOutcome;
use sonda_core::types::{DeviceSample, DeviceType};
use tracing::info;

fn type_label(device_type: DeviceType) -> &'static str {
    match device_type {
        DeviceType::Sensor => "SONDA",
        DeviceType::Repeater => "REPETIDOR",
        DeviceType::Unknown => "DESCONHECIDO",
    }
}

fn state_label(state: LivenessState) -> &'static str {
    match state {
        LivenessState::NoData => "SEM DADOS",
        LivenessState::Fresh => "ATIVO",
        LivenessState::Stale => "INSTÁVEL",
        LivenessState::Dead => "SEM SINAL",
    }
}

/// Formata uma amostra como linha única.
pub fn format_sample(seq: u64, sample: &DeviceSample) -> String {
    format!(
        "[{seq:4}] {:<12} | ID: 0x{:08X} | Ver: {:2} | P: {:7.3} bar | T: {:4}°C | \
         V: {:5.3} V | RSSI: {:4} | Bytes ID: 0x{:02X}{:02X}{:02X}{:02X}",
        type_label(sample.device_type),
        sample.id,
        sample.fw_version,
        sample.pressure_bar,
        sample.temperature_c,
        sample.voltage_v,
        sample.rssi,
        sample.raw[3],
        sample.raw[4],
        sample.raw[5],
        sample.raw[6],
    )
}

pub fn format_summary(summary: &PeriodSummary) -> String {
    format!(
        "Sumário {}s: {} pacotes | {} sondas novas | {:.1} pac/s",
        summary.window.as_secs(),
        summary.packets,
        summary.new_devices,
        summary.rate,
    )
}

pub fn format_liveness(snapshot: &LivenessSnapshot) -> String {
    format!(
        "Vitalidade — sondas: {} | repetidor: {}",
        state_label(snapshot.sensor),
        state_label(snapshot.repeater),
    )
}

/// Assinante de console: loga cada evento em uma linha.
pub fn console_subscriber() -> impl FnMut(&MonitorEvent) + Send + 'static {
    |event: &MonitorEvent| match event {
        MonitorEvent::Sample {
            seq,
            sample,
            outcome,
        } => {
            let marker = match outcome {
                UpdateOutcome::NewDevice => " ← NOVO",
                UpdateOutcome::UpdatedDevice => "",
                UpdateOutcome::Ignored => " (ignorado)",
            };
            info!("{}{marker}", format_sample(*seq, sample));
        }
        MonitorEvent::Summary(summary) => info!("{}", format_summary(summary)),
        MonitorEvent::Liveness(snapshot) => info!("{}", format_liveness(snapshot)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonda_core::decode::{FrameFields, FwOffset, SENSOR_TYPE_BYTE, decode, encode_frame};

    #[test]
    fn sample_line_carries_id_and_raw_bytes() {
        let frame = encode_frame(
            &FrameFields {
                type_byte: SENSOR_TYPE_BYTE,
                id: 0x7857_E03F,
                raw_pressure: 101,
                raw_voltage: 205,
                raw_temperature: 80,
                fw_version: 5,
                raw_rssi: 70,
            },
            FwOffset::Byte19,
        );
        let line = format_sample(3, &decode(&frame, FwOffset::Byte19));

        assert!(line.contains("SONDA"));
        assert!(line.contains("ID: 0x7857E03F"));
        // Bytes do id na ordem do quadro (LSB primeiro)
        assert!(line.contains("Bytes ID: 0x3FE05778"));
        assert!(line.contains("RSSI:  -70"));
    }

    #[test]
    fn liveness_line_uses_portuguese_labels() {
        let snap = LivenessSnapshot {
            sensor: LivenessState::Fresh,
            repeater: LivenessState::NoData,
        };
        let line = format_liveness(&snap);
        assert!(line.contains("sondas: ATIVO"));
        assert!(line.contains("repetidor: SEM DADOS"));
    }
}
