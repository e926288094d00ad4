use std::path::PathBuf;

/// Result type alias for the library core
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library core
#[derive(Debug)]
pub enum Error {
    /// A source file is not valid Rust
    ParseError { file: PathBuf, message: String },
    InvalidArgument(String),
    SerializationError(String),
    /// A route handler could not be split into controller and method, or has no known signature
    HandlerResolution { handler: String, reason: String },
    /// An enumerated type exposed an empty value sequence, so no schema type can be inferred
    UndefinedEnumType { type_name: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::ParseError { file, message } => {
                write!(f, "解析错误 {}: {}", file.display(), message)
            }
            Error::InvalidArgument(msg) => write!(f, "无效参数: {}", msg),
            Error::SerializationError(msg) => write!(f, "序列化错误: {}", msg),
            Error::HandlerResolution { handler, reason } => {
                write!(f, "无法解析处理器 '{}': {}", handler, reason)
            }
            Error::UndefinedEnumType { type_name } => {
                write!(f, "枚举类型 {} 没有可用的值，无法推断类型", type_name)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML 序列化错误: {}", err))
    }
}
