use chip::{Fault, LoadError};
use thiserror::Error;

/// Command line usage error
pub const EX_USAGE: i32 = 64;
/// Internal software error, the program faulted
pub const EX_SOFTWARE: i32 = 70;
/// Input/output error on the terminal
pub const EX_IOERR: i32 = 74;

const ENOENT: i32 = 2;
const EIO: i32 = 5;
const ENOMEM: i32 = 12;
const EFBIG: i32 = 27;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("The program stopped with a fault: {fault}\n\n{dump}")]
    Fault { fault: Fault, dump: String },
    #[error("{0:#}")]
    Terminal(anyhow::Error),
}

impl CliError {
    /// The process exit status for the error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Load(LoadError::NotFound(_)) => ENOENT,
            CliError::Load(LoadError::ProgramTooLarge { .. }) => EFBIG,
            CliError::Load(LoadError::Allocation(_)) => ENOMEM,
            CliError::Load(LoadError::Read { .. }) => EIO,
            CliError::Fault { .. } => EX_SOFTWARE,
            CliError::Terminal(_) => EX_IOERR,
        }
    }
}
