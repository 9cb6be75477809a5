//! # Sonda Core
//!
//! Crate compartilhada que define o protocolo de quadros de 26 bytes
//! das sondas de campo, o registro de dispositivos, os indicadores de
//! vitalidade, a sumarização por período e a configuração TOML do
//! sistema Sonda.
//!
//! ## Módulos
//! - [`types`] – Structs do domínio (amostras, registros, classes)
//! - [`frame`] – Sincronizador posicional de quadros de 26 bytes
//! - [`decode`] – Decodificação/codificação do quadro binário
//! - [`registry`] – Estado vivo por dispositivo, separado por classe
//! - [`liveness`] – Indicadores de frescor por classe (2 s / 5 s)
//! - [`period`] – Janela de estatísticas com taxa de pacotes
//! - [`events`] – Eventos tipados + barramento de assinantes
//! - [`source`] – Contrato com a fonte de bytes (porta serial)
//! - [`config`] – Configuração unificada via TOML

pub mod types;
pub mod frame;
pub mod decode;
pub mod registry;
pub mod liveness;
pub mod period;
pub mod events;
pub mod source;
pub mod config;

// Re-exports convenientes
pub use config::AppConfig;
pub use decode::{FwOffset, decode, encode_frame};
pub use events::{EventBus, MonitorEvent};
pub use frame::{FRAME_LEN, FrameSync};
pub use registry::{DeviceRegistry, UpdateOutcome};
pub use source::{ByteSource, SourceError};
pub use types::{DeviceSample, DeviceType};
