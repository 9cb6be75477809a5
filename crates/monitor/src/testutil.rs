//! Fontes de bytes roteirizadas para testes.

use sonda_core::source::{ByteSource, SourceError};
use std::collections::VecDeque;
use std::time::Duration;

/// Fonte que entrega uma sequência fixa de bytes e depois fica em
/// timeout (ou falha, se configurada assim).
pub struct ScriptedSource {
    data: VecDeque<u8>,
    fail_when_exhausted: bool,
}

impl ScriptedSource {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: data.into(),
            fail_when_exhausted: false,
        }
    }

    /// Após esgotar os bytes, cada leitura devolve erro de E/S.
    pub fn fail_after_exhausted(mut self) -> Self {
        self.fail_when_exhausted = true;
        self
    }
}

impl ByteSource for ScriptedSource {
    fn read_byte(&mut self, _timeout: Duration) -> Result<Option<u8>, SourceError> {
        match self.data.pop_front() {
            Some(byte) => Ok(Some(byte)),
            None if self.fail_when_exhausted => Err(SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "fonte roteirizada esgotada",
            ))),
            None => Ok(None),
        }
    }

    fn close(&mut self) {}
}
