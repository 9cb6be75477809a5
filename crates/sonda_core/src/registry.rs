//! Registro de dispositivos – estado vivo por id, separado por classe.
//!
//! Sondas e repetidores vivem em mapas independentes: o mesmo id pode
//! existir nas duas classes sem conflito. Amostras de tipo desconhecido
//! nunca entram nos mapas, mas contam no total bruto de pacotes.

use crate::types::{DeviceRecord, DeviceSample, DeviceType};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Instant;

/// Resultado de aplicar uma amostra ao registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Primeiro pacote deste id nesta classe
    NewDevice,
    /// Id já conhecido; registro atualizado
    UpdatedDevice,
    /// Tipo desconhecido; não inserido
    Ignored,
}

/// Contadores brutos da sessão.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub sensor_packets: u64,
    pub repeater_packets: u64,
    pub unknown_packets: u64,
    /// Todos os quadros decodificados, inclusive desconhecidos
    pub total_packets: u64,
}

/// Mapas de estado por dispositivo + contadores da sessão.
pub struct DeviceRegistry {
    sensors: HashMap<u32, DeviceRecord>,
    repeaters: HashMap<u32, DeviceRecord>,
    stats: RegistryStats,
    first_packet_at: Option<Instant>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            sensors: HashMap::new(),
            repeaters: HashMap::new(),
            stats: RegistryStats::default(),
            first_packet_at: None,
        }
    }

    /// Aplica uma amostra decodificada ao estado.
    ///
    /// Todo quadro conta em `total_packets`; só sondas e repetidores
    /// criam/atualizam registros. O id nunca é reatribuído: o registro
    /// existente do mesmo id é sempre o atualizado.
    pub fn apply(&mut self, sample: &DeviceSample, now: Instant) -> UpdateOutcome {
        self.stats.total_packets += 1;
        if self.first_packet_at.is_none() {
            self.first_packet_at = Some(now);
        }

        match sample.device_type {
            DeviceType::Unknown => {
                self.stats.unknown_packets += 1;
                UpdateOutcome::Ignored
            }
            DeviceType::Sensor => {
                self.stats.sensor_packets += 1;
                Self::upsert(&mut self.sensors, sample, now)
            }
            DeviceType::Repeater => {
                self.stats.repeater_packets += 1;
                Self::upsert(&mut self.repeaters, sample, now)
            }
        }
    }

    fn upsert(
        map: &mut HashMap<u32, DeviceRecord>,
        sample: &DeviceSample,
        now: Instant,
    ) -> UpdateOutcome {
        match map.entry(sample.id) {
            Entry::Vacant(slot) => {
                slot.insert(DeviceRecord::from_sample(sample, now));
                UpdateOutcome::NewDevice
            }
            Entry::Occupied(mut entry) => {
                entry.get_mut().absorb(sample, now);
                UpdateOutcome::UpdatedDevice
            }
        }
    }

    // ── Consultas ──

    pub fn unique_sensors(&self) -> usize {
        self.sensors.len()
    }

    pub fn unique_repeaters(&self) -> usize {
        self.repeaters.len()
    }

    pub fn sensor(&self, id: u32) -> Option<&DeviceRecord> {
        self.sensors.get(&id)
    }

    pub fn repeater(&self, id: u32) -> Option<&DeviceRecord> {
        self.repeaters.get(&id)
    }

    pub fn sensors(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.sensors.values()
    }

    pub fn repeaters(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.repeaters.values()
    }

    pub fn stats(&self) -> RegistryStats {
        self.stats
    }

    /// Taxa de recepção da sessão: pacotes / segundos desde o primeiro
    /// pacote. Zero enquanto não houver pelo menos um segundo decorrido.
    pub fn receive_rate(&self, now: Instant) -> f64 {
        match self.first_packet_at {
            Some(first) => {
                let secs = now.duration_since(first).as_secs();
                if secs > 0 {
                    self.stats.total_packets as f64 / secs as f64
                } else {
                    0.0
                }
            }
            None => 0.0,
        }
    }

    /// Reinício completo: destrói todos os registros e zera contadores.
    pub fn reset(&mut self) {
        self.sensors.clear();
        self.repeaters.clear();
        self.stats = RegistryStats::default();
        self.first_packet_at = None;
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FRAME_LEN;
    use std::time::Duration;

    fn sample(device_type: DeviceType, id: u32) -> DeviceSample {
        DeviceSample {
            device_type,
            id,
            pressure_bar: 1.0,
            temperature_c: 20,
            voltage_v: 3.1,
            fw_version: 5,
            rssi: -70,
            raw: [0u8; FRAME_LEN],
        }
    }

    #[test]
    fn first_sensor_sample_creates_record() {
        let mut reg = DeviceRegistry::new();
        let now = Instant::now();

        let outcome = reg.apply(&sample(DeviceType::Sensor, 0x10), now);
        assert_eq!(outcome, UpdateOutcome::NewDevice);
        assert_eq!(reg.unique_sensors(), 1);

        let rec = reg.sensor(0x10).unwrap();
        assert_eq!(rec.total_packets, 1);
        assert_eq!(rec.first_seen, now);
    }

    #[test]
    fn repeated_sensor_updates_in_place() {
        let mut reg = DeviceRegistry::new();
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);

        reg.apply(&sample(DeviceType::Sensor, 0x10), t0);
        let mut second = sample(DeviceType::Sensor, 0x10);
        second.pressure_bar = 2.5;
        let outcome = reg.apply(&second, t1);

        assert_eq!(outcome, UpdateOutcome::UpdatedDevice);
        // Id único: nunca um segundo registro para o mesmo id
        assert_eq!(reg.unique_sensors(), 1);

        let rec = reg.sensor(0x10).unwrap();
        assert_eq!(rec.total_packets, 2);
        assert_eq!(rec.first_seen, t0);
        assert_eq!(rec.last_seen, t1);
        assert_eq!(rec.pressure_bar, 2.5);
    }

    #[test]
    fn sensor_and_repeater_maps_are_independent() {
        let mut reg = DeviceRegistry::new();
        let now = Instant::now();

        assert_eq!(
            reg.apply(&sample(DeviceType::Sensor, 0x42), now),
            UpdateOutcome::NewDevice
        );
        assert_eq!(
            reg.apply(&sample(DeviceType::Repeater, 0x42), now),
            UpdateOutcome::NewDevice
        );

        assert_eq!(reg.unique_sensors(), 1);
        assert_eq!(reg.unique_repeaters(), 1);
    }

    #[test]
    fn repeater_record_accumulates_packets() {
        let mut reg = DeviceRegistry::new();
        let t0 = Instant::now();

        reg.apply(&sample(DeviceType::Repeater, 0x77), t0);
        let mut second = sample(DeviceType::Repeater, 0x77);
        second.rssi = -90;
        reg.apply(&second, t0 + Duration::from_secs(2));

        let rec = reg.repeater(0x77).unwrap();
        assert_eq!(rec.total_packets, 2);
        // Campos substituídos por inteiro a cada amostra
        assert_eq!(rec.rssi, -90);
    }

    #[test]
    fn unknown_is_ignored_but_counted_in_totals() {
        let mut reg = DeviceRegistry::new();
        let now = Instant::now();

        let outcome = reg.apply(&sample(DeviceType::Unknown, 0x99), now);
        assert_eq!(outcome, UpdateOutcome::Ignored);
        assert_eq!(reg.unique_sensors(), 0);
        assert_eq!(reg.unique_repeaters(), 0);

        let stats = reg.stats();
        assert_eq!(stats.unknown_packets, 1);
        assert_eq!(stats.total_packets, 1);
        assert_eq!(stats.sensor_packets, 0);
        assert_eq!(stats.repeater_packets, 0);
    }

    #[test]
    fn receive_rate_uses_first_packet_instant() {
        let mut reg = DeviceRegistry::new();
        let t0 = Instant::now();

        assert_eq!(reg.receive_rate(t0), 0.0);

        for i in 0..10 {
            reg.apply(
                &sample(DeviceType::Sensor, 0x10),
                t0 + Duration::from_millis(i * 100),
            );
        }
        let rate = reg.receive_rate(t0 + Duration::from_secs(5));
        assert!((rate - 2.0).abs() < 1e-9);
    }

    #[test]
    fn reset_destroys_all_records_and_counters() {
        let mut reg = DeviceRegistry::new();
        let now = Instant::now();
        reg.apply(&sample(DeviceType::Sensor, 1), now);
        reg.apply(&sample(DeviceType::Repeater, 2), now);
        reg.apply(&sample(DeviceType::Unknown, 3), now);

        reg.reset();

        assert_eq!(reg.unique_sensors(), 0);
        assert_eq!(reg.unique_repeaters(), 0);
        assert_eq!(reg.stats(), RegistryStats::default());
        assert_eq!(reg.receive_rate(now + Duration::from_secs(10)), 0.0);
    }
}
