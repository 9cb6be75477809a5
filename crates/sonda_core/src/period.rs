//! Janela deslizante de estatísticas por período.
//!
//! Acumula contadores entre fechamentos de janela (cadência externa,
//! tipicamente 30 s) e produz uma sumarização com taxa de pacotes.
//! O agregador não conhece o intervalo: só reage ao tique de quem o
//! agenda.

use std::time::{Duration, Instant};

/// Sumarização de uma janela fechada.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodSummary {
    /// Pacotes recebidos na janela (inclusive desconhecidos)
    pub packets: u64,
    /// Sondas inéditas vistas na janela
    pub new_devices: u64,
    /// Pacotes por segundo na janela
    pub rate: f64,
    /// Duração real da janela
    pub window: Duration,
}

/// Contadores da janela corrente.
pub struct PeriodAggregator {
    window_start: Instant,
    packets: u64,
    new_devices: u64,
}

impl PeriodAggregator {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            packets: 0,
            new_devices: 0,
        }
    }

    /// Conta um pacote recebido (qualquer tipo).
    pub fn on_sample(&mut self) {
        self.packets += 1;
    }

    /// Conta uma sonda inédita (repetidores não participam).
    pub fn on_new_device(&mut self) {
        self.new_devices += 1;
    }

    /// Fecha a janela corrente: produz a sumarização, zera os contadores
    /// e reinicia a janela em `now`.
    ///
    /// `rate = pacotes / max(1, segundos inteiros desde o início)`.
    pub fn close_window(&mut self, now: Instant) -> PeriodSummary {
        let window = now.duration_since(self.window_start);
        let secs = window.as_secs().max(1);

        let summary = PeriodSummary {
            packets: self.packets,
            new_devices: self.new_devices,
            rate: self.packets as f64 / secs as f64,
            window,
        };

        self.packets = 0;
        self.new_devices = 0;
        self.window_start = now;

        summary
    }

    /// Reinício completo, equivalente a fechar e descartar a janela.
    pub fn reset(&mut self, now: Instant) {
        self.packets = 0;
        self.new_devices = 0;
        self.window_start = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteen_packets_in_thirty_seconds_is_half_rate() {
        let t0 = Instant::now();
        let mut agg = PeriodAggregator::new(t0);
        for _ in 0..15 {
            agg.on_sample();
        }

        let summary = agg.close_window(t0 + Duration::from_secs(30));
        assert_eq!(summary.packets, 15);
        assert!((summary.rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn close_resets_counters_and_window() {
        let t0 = Instant::now();
        let mut agg = PeriodAggregator::new(t0);
        agg.on_sample();
        agg.on_new_device();

        let t1 = t0 + Duration::from_secs(30);
        let first = agg.close_window(t1);
        assert_eq!(first.packets, 1);
        assert_eq!(first.new_devices, 1);

        // A segunda janela parte de t1, vazia
        let second = agg.close_window(t1 + Duration::from_secs(30));
        assert_eq!(second.packets, 0);
        assert_eq!(second.new_devices, 0);
        assert_eq!(second.window, Duration::from_secs(30));
    }

    #[test]
    fn sub_second_window_divides_by_one() {
        let t0 = Instant::now();
        let mut agg = PeriodAggregator::new(t0);
        for _ in 0..7 {
            agg.on_sample();
        }

        // Janela de 100 ms: divisor saturado em 1 s
        let summary = agg.close_window(t0 + Duration::from_millis(100));
        assert!((summary.rate - 7.0).abs() < 1e-9);
    }

    #[test]
    fn new_devices_counted_separately_from_packets() {
        let t0 = Instant::now();
        let mut agg = PeriodAggregator::new(t0);
        agg.on_sample();
        agg.on_sample();
        agg.on_new_device();

        let summary = agg.close_window(t0 + Duration::from_secs(1));
        assert_eq!(summary.packets, 2);
        assert_eq!(summary.new_devices, 1);
    }

    #[test]
    fn reset_discards_pending_counts() {
        let t0 = Instant::now();
        let mut agg = PeriodAggregator::new(t0);
        agg.on_sample();
        agg.reset(t0 + Duration::from_secs(5));

        let summary = agg.close_window(t0 + Duration::from_secs(35));
        assert_eq!(summary.packets, 0);
        assert_eq!(summary.window, Duration::from_secs(30));
    }
}
