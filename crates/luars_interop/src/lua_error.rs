use thiserror::Error;

/// Errors raised by the value model and the table protocol.
///
/// Messages follow the reference Lua wording so they can be surfaced to
/// script authors unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LuaError {
    /// A requested MultiReturns shape is not one of the eight supported ones
    #[error("type '{shape}' is not a supported MultiReturns type")]
    UnsupportedMultiReturnsShape { shape: String },

    /// Sequence position outside the range accepted by insert/remove
    #[error("bad argument #{arg} to '{function}' (position out of bounds)")]
    PositionOutOfBounds {
        function: &'static str,
        arg: usize,
        position: i64,
    },

    #[error("object length is not an integer")]
    LengthNotInteger,

    #[error("attempt to get length of a {0} value")]
    LengthNotSupported(&'static str),

    #[error("attempt to index a {0} value")]
    IndexNotSupported(&'static str),

    #[error("attempt to call a {0} value")]
    NotCallable(&'static str),

    #[error("index is nil")]
    NilIndex,

    #[error("index is NaN")]
    NaNIndex,

    /// `__index` / `__newindex` chain exceeded the configured loop limit
    #[error("'{0}' chain too long; possible loop")]
    MetamethodLoop(&'static str),

    #[error("cannot change a protected metatable")]
    ProtectedMetatable,

    #[error("bad argument #{arg} to '{function}' ({message})")]
    BadArgument {
        function: &'static str,
        arg: usize,
        message: String,
    },

    /// Raised by host functions
    #[error("{0}")]
    RuntimeError(String),
}

pub type LuaResult<T> = Result<T, LuaError>;
