/// Standard JSON-RPC 2.0 and LSP-specific error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Sent when a request comes in before `initialize` has completed, or
    /// after `shutdown`.
    pub const SERVER_NOT_INITIALIZED: i32 = -32002;

    /// A request was cancelled via `$/cancelRequest` or superseded.
    pub const REQUEST_CANCELLED: i32 = -32800;

    /// The request's content could not be decoded as valid JSON-RPC.
    pub const CONTENT_MODIFIED: i32 = -32801;
}

/// A typed view over the raw JSON-RPC error codes above, for call sites that
/// want to branch on error class rather than a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerNotInitialized,
    RequestCancelled,
    ContentModified,
    Other(i32),
}

impl JsonRpcErrorCode {
    pub fn code(self) -> i32 {
        match self {
            Self::ParseError => error_codes::PARSE_ERROR,
            Self::InvalidRequest => error_codes::INVALID_REQUEST,
            Self::MethodNotFound => error_codes::METHOD_NOT_FOUND,
            Self::InvalidParams => error_codes::INVALID_PARAMS,
            Self::InternalError => error_codes::INTERNAL_ERROR,
            Self::ServerNotInitialized => error_codes::SERVER_NOT_INITIALIZED,
            Self::RequestCancelled => error_codes::REQUEST_CANCELLED,
            Self::ContentModified => error_codes::CONTENT_MODIFIED,
            Self::Other(code) => code,
        }
    }
}

impl From<i32> for JsonRpcErrorCode {
    fn from(code: i32) -> Self {
        match code {
            error_codes::PARSE_ERROR => Self::ParseError,
            error_codes::INVALID_REQUEST => Self::InvalidRequest,
            error_codes::METHOD_NOT_FOUND => Self::MethodNotFound,
            error_codes::INVALID_PARAMS => Self::InvalidParams,
            error_codes::INTERNAL_ERROR => Self::InternalError,
            error_codes::SERVER_NOT_INITIALIZED => Self::ServerNotInitialized,
            error_codes::REQUEST_CANCELLED => Self::RequestCancelled,
            error_codes::CONTENT_MODIFIED => Self::ContentModified,
            other => Self::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_known_codes() {
        for code in [
            error_codes::PARSE_ERROR,
            error_codes::INVALID_REQUEST,
            error_codes::METHOD_NOT_FOUND,
            error_codes::INVALID_PARAMS,
            error_codes::INTERNAL_ERROR,
            error_codes::SERVER_NOT_INITIALIZED,
            error_codes::REQUEST_CANCELLED,
            error_codes::CONTENT_MODIFIED,
        ] {
            let typed: JsonRpcErrorCode = code.into();
            assert_eq!(typed.code(), code);
        }
    }

    #[test]
    fn unknown_code_passes_through() {
        let typed: JsonRpcErrorCode = (-1).into();
        assert_eq!(typed, JsonRpcErrorCode::Other(-1));
    }
}
