use std::fmt;

use crate::error::{DriverError, TransportError};
use crate::loader::Source;

/// Messages the user has to see.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    UnsupportedCartridge { source: Source },
    TransportFailure { source: Source, error: TransportError },
    Halted(DriverError),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::UnsupportedCartridge { source } => {
                write!(f, "Unsupported cartridge: {source}")
            }
            Notice::TransportFailure { source, error } => {
                write!(f, "Could not load {source}: {error}")
            }
            Notice::Halted(err) => write!(f, "Emulation stopped: {err}"),
        }
    }
}

pub trait Notifier {
    fn notify(&mut self, notice: &Notice);
}

/// Sends notices to the log only.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, notice: &Notice) {
        log::warn!("{notice}");
    }
}
