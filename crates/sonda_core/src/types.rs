//! Definição de tipos/structs do domínio de sondas.
//!
//! Porta direta do `DeviceData` do utilitário C para structs Rust.
//! Uma amostra ([`DeviceSample`]) é o resultado imutável da decodificação
//! de um quadro; um registro ([`DeviceRecord`]) é o estado vivo mantido
//! pelo registro de dispositivos.

use crate::frame::FRAME_LEN;
use std::time::Instant;

// ──────────────────────────────────────────────
// Tipo de dispositivo
// ──────────────────────────────────────────────

/// Classe de dispositivo de campo, derivada do byte de tipo do quadro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    /// Sonda de pressão (byte de tipo `0xF0`)
    Sensor,
    /// Repetidor de rádio (byte de tipo `0xF1`)
    Repeater,
    /// Byte de tipo não reconhecido
    Unknown,
}

// ──────────────────────────────────────────────
// Amostra decodificada
// ──────────────────────────────────────────────

/// Uma medição decodificada de um quadro de 26 bytes.
///
/// Imutável após a decodificação; `raw` preserva o quadro original
/// para inspeção.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSample {
    pub device_type: DeviceType,
    /// Identificador único do dispositivo (bytes 3–6 do quadro)
    pub id: u32,
    /// Pressão (bar)
    pub pressure_bar: f32,
    /// Temperatura (°C)
    pub temperature_c: i32,
    /// Tensão da bateria (V)
    pub voltage_v: f32,
    /// Versão de firmware (sempre ≥ 0)
    pub fw_version: i32,
    /// Intensidade de sinal (dBm, negativo)
    pub rssi: i32,
    /// Quadro original completo
    pub raw: [u8; FRAME_LEN],
}

// ──────────────────────────────────────────────
// Registro por dispositivo
// ──────────────────────────────────────────────

/// Estado agregado de um dispositivo: últimos valores + contadores.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    pub id: u32,
    pub device_type: DeviceType,
    pub fw_version: i32,
    pub pressure_bar: f32,
    pub temperature_c: i32,
    pub voltage_v: f32,
    pub rssi: i32,
    /// Instante da primeira amostra deste id
    pub first_seen: Instant,
    /// Instante da amostra mais recente (nunca anterior a `first_seen`)
    pub last_seen: Instant,
    /// Total de pacotes recebidos deste id (monotônico)
    pub total_packets: u64,
}

impl DeviceRecord {
    /// Cria o registro a partir da primeira amostra observada.
    pub fn from_sample(sample: &DeviceSample, now: Instant) -> Self {
        Self {
            id: sample.id,
            device_type: sample.device_type,
            fw_version: sample.fw_version,
            pressure_bar: sample.pressure_bar,
            temperature_c: sample.temperature_c,
            voltage_v: sample.voltage_v,
            rssi: sample.rssi,
            first_seen: now,
            last_seen: now,
            total_packets: 1,
        }
    }

    /// Absorve uma nova amostra: atualiza valores e contadores.
    pub fn absorb(&mut self, sample: &DeviceSample, now: Instant) {
        self.fw_version = sample.fw_version;
        self.pressure_bar = sample.pressure_bar;
        self.temperature_c = sample.temperature_c;
        self.voltage_v = sample.voltage_v;
        self.rssi = sample.rssi;
        self.last_seen = now;
        self.total_packets += 1;
    }
}
