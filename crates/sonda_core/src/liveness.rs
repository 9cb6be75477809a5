//! Indicadores de vitalidade por classe de dispositivo.
//!
//! Deriva um estado de frescor a partir do tempo decorrido desde a
//! última amostra de cada classe. Avaliado em cadência fixa externa
//! (tipicamente 1 s), nunca pelo caminho de dados.

use crate::types::DeviceType;
use std::time::{Duration, Instant};

/// Estado de vitalidade de uma classe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessState {
    /// Nenhuma amostra recebida nesta sessão
    NoData,
    /// Última amostra há menos de 2 s (limiar configurável)
    Fresh,
    /// Última amostra há menos de 5 s
    Stale,
    /// Sem amostras há 5 s ou mais, ou sem conexão ativa
    Dead,
}

/// Par de estados avaliados num mesmo instante.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessSnapshot {
    pub sensor: LivenessState,
    pub repeater: LivenessState,
}

/// Limiares de frescor.
#[derive(Debug, Clone, Copy)]
pub struct LivenessThresholds {
    pub fresh: Duration,
    pub stale: Duration,
}

impl Default for LivenessThresholds {
    fn default() -> Self {
        Self {
            fresh: Duration::from_secs(2),
            stale: Duration::from_secs(5),
        }
    }
}

/// Rastreia o instante da última amostra de cada classe.
pub struct LivenessMonitor {
    thresholds: LivenessThresholds,
    last_sensor: Option<Instant>,
    last_repeater: Option<Instant>,
}

impl LivenessMonitor {
    pub fn new(thresholds: LivenessThresholds) -> Self {
        Self {
            thresholds,
            last_sensor: None,
            last_repeater: None,
        }
    }

    /// Registra uma amostra aceita da classe dada. `Unknown` não move
    /// nenhum indicador.
    pub fn mark(&mut self, class: DeviceType, now: Instant) {
        match class {
            DeviceType::Sensor => self.last_sensor = Some(now),
            DeviceType::Repeater => self.last_repeater = Some(now),
            DeviceType::Unknown => {}
        }
    }

    /// Avalia os dois indicadores no instante `now`.
    ///
    /// Sem conexão ativa, ambos são forçados a [`LivenessState::Dead`]
    /// independentemente do tempo decorrido.
    pub fn tick(&self, now: Instant, connected: bool) -> LivenessSnapshot {
        if !connected {
            return LivenessSnapshot {
                sensor: LivenessState::Dead,
                repeater: LivenessState::Dead,
            };
        }

        LivenessSnapshot {
            sensor: self.classify(self.last_sensor, now),
            repeater: self.classify(self.last_repeater, now),
        }
    }

    fn classify(&self, last: Option<Instant>, now: Instant) -> LivenessState {
        let Some(last) = last else {
            return LivenessState::NoData;
        };

        let elapsed = now.duration_since(last);
        if elapsed < self.thresholds.fresh {
            LivenessState::Fresh
        } else if elapsed < self.thresholds.stale {
            LivenessState::Stale
        } else {
            LivenessState::Dead
        }
    }

    pub fn reset(&mut self) {
        self.last_sensor = None;
        self.last_repeater = None;
    }
}
