//! Content-Length framing for the LSP Base Protocol, over any `BufRead`/`Write`.

use std::collections::HashMap;
use std::io::{self, BufRead, Read, Write};

use smithy_lsp_protocol::{JsonRpcRequest, JsonRpcResponse};

/// Reads one framed LSP message.
///
/// Returns `Ok(None)` on EOF or on a malformed frame (both recoverable: the
/// caller should just stop or keep reading). Returns `Err` only for actual
/// I/O failures.
pub fn read_message<R: BufRead>(reader: &mut R) -> io::Result<Option<JsonRpcRequest>> {
    let mut headers = HashMap::new();

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(": ") {
            headers.insert(key.to_string(), value.to_string());
        }
    }

    let Some(content_length) = headers.get("Content-Length") else {
        tracing::warn!("LSP message missing Content-Length header");
        return Ok(None);
    };
    let Ok(length) = content_length.parse::<usize>() else {
        tracing::warn!(value = %content_length, "Content-Length is not a valid integer");
        return Ok(None);
    };

    let mut content = vec![0u8; length];
    let mut bytes_read = 0;
    while bytes_read < length {
        match reader.read(&mut content[bytes_read..])? {
            0 => return Ok(None),
            n => bytes_read += n,
        }
    }

    match serde_json::from_slice(&content) {
        Ok(request) => Ok(Some(request)),
        Err(e) => {
            let content_str = String::from_utf8_lossy(&content);
            let preview = if content_str.len() > 100 {
                format!("{}...", &content_str[..100])
            } else {
                content_str.into_owned()
            };
            tracing::warn!(error = %e, frame = %preview, "malformed LSP frame, dropping");
            Ok(None)
        }
    }
}

/// Writes one framed LSP response.
pub fn write_message<W: Write>(writer: &mut W, response: &JsonRpcResponse) -> io::Result<()> {
    let content = serde_json::to_string(response)?;
    write!(writer, "Content-Length: {}\r\n\r\n{}", content.len(), content)?;
    writer.flush()
}

/// Writes one framed LSP notification (server to client).
pub fn write_notification<W: Write>(
    writer: &mut W,
    method: &str,
    params: serde_json::Value,
) -> io::Result<()> {
    let notification = serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
    });
    let content = serde_json::to_string(&notification)?;
    write!(writer, "Content-Length: {}\r\n\r\n{}", content.len(), content)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn frame(body: &str) -> Vec<u8> {
        format!("Content-Length: {}\r\n\r\n{}", body.len(), body).into_bytes()
    }

    #[test]
    fn reads_well_formed_request() {
        let body = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#;
        let mut cursor = Cursor::new(frame(body));
        let msg = read_message(&mut cursor).expect("io ok").expect("message");
        assert_eq!(msg.method, "initialize");
        assert_eq!(msg.id, Some(serde_json::json!(1)));
    }

    #[test]
    fn returns_none_on_eof() {
        let mut cursor = Cursor::new(Vec::new());
        assert!(read_message(&mut cursor).expect("io ok").is_none());
    }

    #[test]
    fn returns_none_on_malformed_json_without_erroring() {
        let mut cursor = Cursor::new(frame("not json"));
        assert!(read_message(&mut cursor).expect("io ok").is_none());
    }

    #[test]
    fn returns_none_on_missing_content_length() {
        let mut cursor = Cursor::new(b"X-Custom: 1\r\n\r\n".to_vec());
        assert!(read_message(&mut cursor).expect("io ok").is_none());
    }

    #[test]
    fn write_message_produces_valid_framing() {
        let response = JsonRpcResponse::success(Some(serde_json::json!(7)), serde_json::json!("ok"));
        let mut buf = Vec::new();
        write_message(&mut buf, &response).expect("write");
        assert!(buf.starts_with(b"Content-Length:"));
        assert!(buf.windows(4).any(|w| w == b"\r\n\r\n"));
    }
}
