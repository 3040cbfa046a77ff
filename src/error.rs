#[derive(Debug)]
pub enum ErrorType {
    Error,
    IOError,
    ConfigError,
    InputError,
    PeerError,
    OutputMismatch,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, new)]
pub struct CcError {
    error_type: ErrorType,
    message: String,
}

pub fn cc_error(message: String) -> CcError {
    CcError::new(ErrorType::Error, message)
}

pub fn io_error(message: String) -> CcError {
    CcError::new(ErrorType::IOError, message)
}

pub fn config_error(message: String) -> CcError {
    CcError::new(ErrorType::ConfigError, message)
}

pub fn input_error(message: String) -> CcError {
    CcError::new(ErrorType::InputError, message)
}

pub fn peer_error(message: String) -> CcError {
    CcError::new(ErrorType::PeerError, message)
}

pub fn mismatch_error(message: String) -> CcError {
    CcError::new(ErrorType::OutputMismatch, message)
}

impl std::fmt::Display for CcError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{}] {}", self.error_type, self.message)
    }
}
