//! Configuração unificada via TOML.
//!
//! Um único `config.toml` ao lado do executável cobre o monitor e o
//! simulador. Campos ausentes caem nos padrões; arquivo ausente ou
//! inválido degrada para a configuração padrão com aviso.

use crate::decode::FwOffset;
use crate::liveness::LivenessThresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Velocidades de porta aceitas pelos dispositivos de campo.
pub const ALLOWED_BAUD_RATES: [u32; 8] = [
    1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200,
];

/// Configuração da porta serial.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Caminho da porta (ex: "/dev/ttyACM0", "COM3"); vazio = autodetectar
    pub port: String,
    /// Velocidade em baud (restrita a [`ALLOWED_BAUD_RATES`])
    pub baud_rate: u32,
    /// Timeout de cada tentativa de leitura de byte (ms)
    pub poll_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: 9600,
            poll_timeout_ms: 1,
        }
    }
}

impl SerialConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

/// Parâmetros do protocolo de quadros.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Offset do byte de versão de firmware: 18 ou 19 (as variantes de
    /// firmware de campo divergem)
    pub fw_version_offset: u8,
    /// Heurística de ressincronização: desliza 1 byte após N quadros
    /// consecutivos de tipo desconhecido; 0 = desligada
    pub resync_after_unknown: u32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            fw_version_offset: 19,
            resync_after_unknown: 0,
        }
    }
}

impl ProtocolConfig {
    /// Offset validado; valores fora de {18, 19} caem no padrão com aviso.
    pub fn fw_offset(&self) -> FwOffset {
        match FwOffset::from_index(self.fw_version_offset) {
            Some(offset) => offset,
            None => {
                warn!(
                    "fw_version_offset inválido: {} (use 18 ou 19); usando 19",
                    self.fw_version_offset
                );
                FwOffset::default()
            }
        }
    }
}

/// Cadências e limiares do lado de agregação.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Intervalo da sumarização por período (s)
    pub summary_interval_secs: u64,
    /// Limiar "recente" dos indicadores de vitalidade (s)
    pub liveness_fresh_secs: f64,
    /// Limiar "instável" dos indicadores de vitalidade (s)
    pub liveness_stale_secs: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            summary_interval_secs: 30,
            liveness_fresh_secs: 2.0,
            liveness_stale_secs: 5.0,
        }
    }
}

impl MonitorConfig {
    pub fn summary_interval(&self) -> Duration {
        Duration::from_secs(self.summary_interval_secs)
    }

    pub fn liveness_thresholds(&self) -> LivenessThresholds {
        LivenessThresholds {
            fresh: Duration::from_secs_f64(self.liveness_fresh_secs),
            stale: Duration::from_secs_f64(self.liveness_stale_secs),
        }
    }
}

/// Configuração do gerador de quadros sintéticos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimuladorConfig {
    /// Porta de saída; vazio = autodetectar
    pub port: String,
    /// Intervalo entre rajadas de quadros (s)
    pub interval_secs: f64,
    /// Ids das sondas simuladas
    pub sensor_ids: Vec<u32>,
    /// Id do repetidor simulado
    pub repeater_id: u32,
    /// Um quadro de repetidor a cada N ciclos
    pub repeater_every: u32,
    /// Versão de firmware anunciada nos quadros
    pub fw_version: i8,
}

impl Default for SimuladorConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            interval_secs: 0.5,
            sensor_ids: vec![0x7857_E03F, 0x7857_E040],
            repeater_id: 0x00A1_0001,
            repeater_every: 4,
            fw_version: 5,
        }
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub serial: SerialConfig,
    pub protocol: ProtocolConfig,
    pub monitor: MonitorConfig,
    pub simulador: SimuladorConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !ALLOWED_BAUD_RATES.contains(&self.serial.baud_rate) {
            errors.push(format!(
                "Baud rate inválido: {} (aceitos: {:?})",
                self.serial.baud_rate, ALLOWED_BAUD_RATES
            ));
        }
        if self.serial.poll_timeout_ms == 0 {
            errors.push("poll_timeout_ms não pode ser 0".into());
        }
        if FwOffset::from_index(self.protocol.fw_version_offset).is_none() {
            errors.push(format!(
                "fw_version_offset inválido: {} (use 18 ou 19)",
                self.protocol.fw_version_offset
            ));
        }
        if self.monitor.summary_interval_secs == 0 {
            errors.push("summary_interval_secs não pode ser 0".into());
        }
        if self.monitor.liveness_fresh_secs <= 0.0
            || self.monitor.liveness_stale_secs <= self.monitor.liveness_fresh_secs
        {
            errors.push(format!(
                "Limiares de vitalidade inválidos: {} / {} (exige 0 < recente < instável)",
                self.monitor.liveness_fresh_secs, self.monitor.liveness_stale_secs
            ));
        }
        if self.simulador.interval_secs < 0.01 || self.simulador.interval_secs > 60.0 {
            errors.push(format!(
                "Intervalo do simulador inválido: {} (0.01–60.0)",
                self.simulador.interval_secs
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let errors = config.validate();
        assert!(errors.is_empty(), "Erros: {:?}", errors);
    }

    #[test]
    fn default_matches_field_hardware() {
        let config = AppConfig::default();
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.protocol.fw_version_offset, 19);
        assert_eq!(config.monitor.summary_interval_secs, 30);
        assert_eq!(config.monitor.liveness_fresh_secs, 2.0);
        assert_eq!(config.monitor.liveness_stale_secs, 5.0);
    }

    #[test]
    fn roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.serial.baud_rate, config.serial.baud_rate);
        assert_eq!(parsed.simulador.sensor_ids, config.simulador.sensor_ids);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let partial = r#"
[serial]
port = "/dev/ttyUSB1"
baud_rate = 115200
"#;
        let config: AppConfig = toml::from_str(partial).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB1");
        assert_eq!(config.serial.baud_rate, 115200);
        // Outros campos devem ter valor padrão
        assert_eq!(config.serial.poll_timeout_ms, 1);
        assert_eq!(config.protocol.fw_version_offset, 19);
    }

    #[test]
    fn rejects_out_of_set_baud() {
        let mut config = AppConfig::default();
        config.serial.baud_rate = 14400;
        assert!(!config.validate().is_empty());
    }

    #[test]
    fn rejects_bad_fw_offset() {
        let mut config = AppConfig::default();
        config.protocol.fw_version_offset = 20;
        assert!(!config.validate().is_empty());
        // O acesso validado ainda degrada para o padrão
        assert_eq!(config.protocol.fw_offset(), FwOffset::Byte19);
    }

    #[test]
    fn rejects_inverted_liveness_thresholds() {
        let mut config = AppConfig::default();
        config.monitor.liveness_fresh_secs = 5.0;
        config.monitor.liveness_stale_secs = 2.0;
        assert!(!config.validate().is_empty());
    }

    #[test]
    fn thresholds_converted_to_durations() {
        let config = AppConfig::default();
        let th = config.monitor.liveness_thresholds();
        assert_eq!(th.fresh, Duration::from_secs(2));
        assert_eq!(th.stale, Duration::from_secs(5));
    }
}
