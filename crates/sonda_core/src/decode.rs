//! Decodificação do quadro binário de 26 bytes.
//!
//! Layout observado nos dispositivos de campo (offsets em base 0):
//!
//! | Campo       | Bytes   | Semântica                                    |
//! |-------------|---------|----------------------------------------------|
//! | tipo        | 2       | `0xF0` sonda, `0xF1` repetidor, outro ignoto |
//! | id          | 3..=6   | u32 little-endian (byte 3 é o menos signif.) |
//! | pressão     | 7..=8   | u16 LE; `2750 * (raw - 1) / 100000` bar      |
//! | tensão      | 13      | u8; `raw * 0.01512` V                        |
//! | temperatura | 14      | i8; `raw - 55` °C                            |
//! | firmware    | 18 ou 19| i8; valor absoluto (ver [`FwOffset`])        |
//! | rssi        | 24      | i8; sinal invertido                          |
//!
//! O protocolo não carrega checksum: a decodificação é total e nunca
//! falha — qualquer quadro vira uma [`DeviceSample`], no pior caso com
//! tipo [`DeviceType::Unknown`].

use crate::frame::FRAME_LEN;
use crate::types::{DeviceSample, DeviceType};

/// Byte de tipo que identifica uma sonda de pressão.
pub const SENSOR_TYPE_BYTE: u8 = 0xF0;

/// Byte de tipo que identifica um repetidor.
pub const REPEATER_TYPE_BYTE: u8 = 0xF1;

/// Escala de conversão de pressão (contagem → bar).
const PRESSURE_NUMERATOR: f32 = 2750.0;
const PRESSURE_DENOMINATOR: f32 = 100_000.0;

/// Offset do zero de temperatura.
const TEMPERATURE_OFFSET_C: i32 = 55;

/// Volts por contagem do ADC de tensão.
const VOLTS_PER_COUNT: f32 = 0.01512;

// ──────────────────────────────────────────────
// Offset da versão de firmware
// ──────────────────────────────────────────────

/// Posição do byte de versão de firmware no quadro.
///
/// As duas variantes de firmware de campo divergem: uma usa o byte 18,
/// a outra o byte 19. Nenhuma é canônica; o offset é parâmetro explícito
/// da decodificação (configurável em `[protocol]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FwOffset {
    Byte18,
    Byte19,
}

impl FwOffset {
    /// Índice do byte no quadro.
    pub const fn index(self) -> usize {
        match self {
            FwOffset::Byte18 => 18,
            FwOffset::Byte19 => 19,
        }
    }

    /// Converte o índice configurado; apenas 18 e 19 são válidos.
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            18 => Some(FwOffset::Byte18),
            19 => Some(FwOffset::Byte19),
            _ => None,
        }
    }
}

impl Default for FwOffset {
    fn default() -> Self {
        FwOffset::Byte19
    }
}

// ──────────────────────────────────────────────
// Decodificação
// ──────────────────────────────────────────────

/// Classifica o byte de tipo do quadro.
pub fn classify(type_byte: u8) -> DeviceType {
    match type_byte {
        SENSOR_TYPE_BYTE => DeviceType::Sensor,
        REPEATER_TYPE_BYTE => DeviceType::Repeater,
        _ => DeviceType::Unknown,
    }
}

/// Decodifica um quadro de 26 bytes em uma [`DeviceSample`].
///
/// Função pura, total e determinística: nunca falha, para qualquer
/// conteúdo de quadro. Reinterpretações com sinal usam `as i8`
/// (complemento de dois bem definido), nunca aritmética de ponteiro.
pub fn decode(frame: &[u8; FRAME_LEN], fw_offset: FwOffset) -> DeviceSample {
    let device_type = classify(frame[2]);

    // byte 3 é o menos significativo, apesar de vir primeiro no quadro
    let id = u32::from_le_bytes([frame[3], frame[4], frame[5], frame[6]]);

    // Pressão: contagem 1 corresponde a exatamente 0.0 bar; contagem 0
    // fica negativa (promoção inteira, como no firmware das sondas)
    let raw_pressure = u16::from_le_bytes([frame[7], frame[8]]);
    let pressure_bar =
        PRESSURE_NUMERATOR * (i32::from(raw_pressure) - 1) as f32 / PRESSURE_DENOMINATOR;

    let temperature_c = i32::from(frame[14] as i8) - TEMPERATURE_OFFSET_C;

    let voltage_v = f32::from(frame[13]) * VOLTS_PER_COUNT;

    let fw_version = i32::from(frame[fw_offset.index()] as i8).abs();

    let rssi = -i32::from(frame[24] as i8);

    DeviceSample {
        device_type,
        id,
        pressure_bar,
        temperature_c,
        voltage_v,
        fw_version,
        rssi,
        raw: *frame,
    }
}

// ──────────────────────────────────────────────
// Codificação (simulador e vetores de teste)
// ──────────────────────────────────────────────

/// Campos crus de um quadro, na representação do fio.
#[derive(Debug, Clone, Copy)]
pub struct FrameFields {
    pub type_byte: u8,
    pub id: u32,
    /// Contagem de pressão (1 = 0.0 bar)
    pub raw_pressure: u16,
    /// Contagem de tensão (V / 0.01512)
    pub raw_voltage: u8,
    /// Temperatura em °C + 55
    pub raw_temperature: u8,
    pub fw_version: i8,
    /// RSSI com sinal invertido (dBm × −1)
    pub raw_rssi: u8,
}

/// Monta um quadro de 26 bytes a partir dos campos crus.
///
/// Inversa de [`decode`] para valores dentro da faixa do protocolo;
/// bytes não mapeados ficam em zero.
pub fn encode_frame(fields: &FrameFields, fw_offset: FwOffset) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[2] = fields.type_byte;
    frame[3..7].copy_from_slice(&fields.id.to_le_bytes());
    frame[7..9].copy_from_slice(&fields.raw_pressure.to_le_bytes());
    frame[13] = fields.raw_voltage;
    frame[14] = fields.raw_temperature;
    frame[fw_offset.index()] = fields.fw_version as u8;
    frame[24] = fields.raw_rssi;
    frame
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
