//! Eventos tipados do monitor e barramento de assinantes.
//!
//! O núcleo nunca conhece a camada de apresentação: emite eventos por
//! push a qualquer número de assinantes registrados. Substitui o
//! acoplamento sinal/slot da versão de bancada por um barramento
//! neutro de tecnologia.

use crate::liveness::LivenessSnapshot;
use crate::period::PeriodSummary;
use crate::registry::UpdateOutcome;
use crate::types::DeviceSample;

/// Evento emitido pelo lado de agregação.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// Uma amostra decodificada foi aplicada ao registro.
    Sample {
        /// Número sequencial do pacote na sessão (1-based)
        seq: u64,
        sample: DeviceSample,
        outcome: UpdateOutcome,
    },
    /// Fechamento de janela de período.
    Summary(PeriodSummary),
    /// Mudança nos indicadores de vitalidade.
    Liveness(LivenessSnapshot),
}

/// Assinante de eventos.
pub type EventHandler = Box<dyn FnMut(&MonitorEvent) + Send>;

/// Barramento de eventos por registro de callbacks.
///
/// A emissão é síncrona e na ordem de registro; assinantes não podem
/// reentrar no barramento.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<EventHandler>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Registra um assinante; recebe todos os eventos subsequentes.
    pub fn subscribe(&mut self, handler: impl FnMut(&MonitorEvent) + Send + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Entrega o evento a todos os assinantes, na ordem de registro.
    pub fn emit(&mut self, event: &MonitorEvent) {
        for handler in &mut self.handlers {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}
