use thiserror::Error;

#[derive(Error, Debug)]
/// Binding error
pub enum BindError {
    /// Error reported by the underlying XML token stream or output sink.
    #[error("XML stream error: {0}")]
    Stream(String),

    /// The token stream ended while more input was expected.
    ///
    /// The top-level sequence decode loop treats this as normal termination;
    /// everywhere else it aborts the current call.
    #[error("unexpected end of XML document")]
    UnexpectedEof,

    /// A value kind with no defined leaf encoding was placed in text or
    /// attribute position.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Leaf text that failed numeric, boolean or timestamp coercion.
    #[error("malformed value: {0}")]
    Malformed(String),
}
