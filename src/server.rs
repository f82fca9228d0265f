//! Line-delimited JSON host loop for editor integrations.
//!
//! One request object per line on stdin:
//!
//! ```text
//! {"id": 1, "method": "open", "params": {"document": "file:///a.rzn", "text": "let x = 1"}}
//! ```
//!
//! and one response per line on stdout, either `{"id": 1, "result": ...}` or
//! `{"id": 1, "error": {"message": "..."}}`. Requests are handled strictly in
//! arrival order. A malformed request gets an error response; it never ends
//! the loop. The loop ends on EOF or after `shutdown`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::analysis::{Analysis, Analyzer, Diagnostic, Position};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed request: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("request is not valid UTF-8: {0}")]
    InvalidUtf8(#[source] std::str::Utf8Error),

    #[error("invalid params for '{method}': {source}")]
    InvalidParams {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown method '{0}'")]
    UnknownMethod(String),

    #[error("document is not open: {0}")]
    UnknownDocument(String),

    #[error("failed to encode result: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

#[derive(Debug, Serialize)]
pub struct ResponseError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct TextParams {
    document: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct DocumentParams {
    document: String,
}

#[derive(Debug, Deserialize)]
struct CodeActionParams {
    document: String,
    /// Defaults to the diagnostics of the last pass.
    #[serde(default)]
    diagnostics: Option<Vec<Diagnostic>>,
}

#[derive(Debug, Deserialize)]
struct CompletionParams {
    document: String,
    position: Position,
}

/// Last analyzed state of an open document.
#[derive(Debug, Clone)]
struct DocumentState {
    text: String,
    analysis: Analysis,
}

/// Open documents and the analyzer that serves them.
pub struct Session<'r> {
    analyzer: Analyzer<'r>,
    documents: HashMap<String, DocumentState>,
    shutdown: bool,
}

impl Default for Session<'static> {
    fn default() -> Self {
        Self::new(Analyzer::default())
    }
}

impl<'r> Session<'r> {
    pub fn new(analyzer: Analyzer<'r>) -> Self {
        Self {
            analyzer,
            documents: HashMap::new(),
            shutdown: false,
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown
    }

    pub fn open_documents(&self) -> usize {
        self.documents.len()
    }

    /// Handle one input line. Blank lines produce no response.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                let id = request.id.clone();
                match self.dispatch(request) {
                    Ok(result) => Response {
                        id,
                        result: Some(result),
                        error: None,
                    },
                    Err(e) => error_response(id, &e),
                }
            }
            Err(e) => error_response(Value::Null, &ProtocolError::Malformed(e)),
        };
        encode(&response)
    }

    /// Handle one raw input line, answering undecodable bytes with an error
    /// response.
    pub fn handle_bytes(&mut self, line: &[u8]) -> Option<String> {
        match std::str::from_utf8(line) {
            Ok(line) => self.handle_line(line),
            Err(e) => encode(&error_response(Value::Null, &ProtocolError::InvalidUtf8(e))),
        }
    }

    fn dispatch(&mut self, request: Request) -> Result<Value, ProtocolError> {
        tracing::debug!(method = %request.method, "request");
        let method = request.method.as_str();
        match method {
            "open" | "change" => {
                let params: TextParams = parse_params(method, request.params)?;
                let analysis = self.analyzer.analyze(&params.document, &params.text);
                let result = to_value(&analysis)?;
                self.documents.insert(
                    params.document,
                    DocumentState {
                        text: params.text,
                        analysis,
                    },
                );
                Ok(result)
            }
            "tokens" => {
                let params: DocumentParams = parse_params(method, request.params)?;
                to_value(&self.document(&params.document)?.analysis.tokens)
            }
            "codeActions" => {
                let params: CodeActionParams = parse_params(method, request.params)?;
                let state = self.document(&params.document)?;
                let diagnostics = params
                    .diagnostics
                    .as_deref()
                    .unwrap_or(&state.analysis.diagnostics);
                let actions = self
                    .analyzer
                    .code_actions(&params.document, &state.text, diagnostics);
                to_value(&actions)
            }
            "completion" => {
                let params: CompletionParams = parse_params(method, request.params)?;
                let state = self.document(&params.document)?;
                to_value(&self.analyzer.complete(&state.text, params.position))
            }
            "close" => {
                let params: DocumentParams = parse_params(method, request.params)?;
                Ok(Value::Bool(self.documents.remove(&params.document).is_some()))
            }
            "shutdown" => {
                self.shutdown = true;
                self.documents.clear();
                Ok(Value::Null)
            }
            other => Err(ProtocolError::UnknownMethod(other.to_string())),
        }
    }

    fn document(&self, document: &str) -> Result<&DocumentState, ProtocolError> {
        self.documents
            .get(document)
            .ok_or_else(|| ProtocolError::UnknownDocument(document.to_string()))
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(
    method: &str,
    params: Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(params).map_err(|source| ProtocolError::InvalidParams {
        method: method.to_string(),
        source,
    })
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ProtocolError> {
    serde_json::to_value(value).map_err(ProtocolError::Encode)
}

fn encode(response: &Response) -> Option<String> {
    match serde_json::to_string(response) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response");
            None
        }
    }
}

fn error_response(id: Value, error: &ProtocolError) -> Response {
    tracing::warn!(error = %error, "request failed");
    Response {
        id,
        result: None,
        error: Some(ResponseError {
            message: error.to_string(),
        }),
    }
}

/// Serve requests from `reader` until EOF or `shutdown`. Only I/O failures
/// end the loop early.
pub async fn serve<R, W>(session: &mut Session<'_>, mut reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        if let Some(response) = session.handle_bytes(&line) {
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        if session.is_shut_down() {
            break;
        }
    }
    tracing::info!("host loop finished");
    Ok(())
}

/// Run the host loop over stdin/stdout on a current-thread runtime.
pub fn run_stdio() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    runtime.block_on(async {
        let mut session = Session::default();
        let stdin = BufReader::new(tokio::io::stdin());
        serve(&mut session, stdin, tokio::io::stdout()).await
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(session: &mut Session<'_>, request: Value) -> Value {
        let line = session.handle_line(&request.to_string()).unwrap();
        serde_json::from_str(&line).unwrap()
    }

    #[test]
    fn test_open_returns_analysis() {
        let mut session = Session::default();
        let resp = call(
            &mut session,
            json!({"id": 1, "method": "open", "params": {"document": "a", "text": "let x = \"hello\""}}),
        );
        assert_eq!(resp["id"], 1);
        assert_eq!(resp["result"]["diagnostics"].as_array().unwrap().len(), 1);
        assert_eq!(resp["result"]["tokens"][0]["tokenType"], "variable");
        assert_eq!(session.open_documents(), 1);
    }

    #[test]
    fn test_malformed_requests_do_not_stop_the_session() {
        let mut session = Session::default();
        let resp = call(&mut session, json!({"id": 2, "method": "bogus"}));
        assert!(resp["error"]["message"].as_str().unwrap().contains("bogus"));

        let line = session.handle_line("{not json").unwrap();
        let resp: Value = serde_json::from_str(&line).unwrap();
        assert!(resp["id"].is_null());
        assert!(resp.get("error").is_some());

        let resp = call(&mut session, json!({"id": 3, "method": "tokens", "params": {"document": "nope"}}));
        assert!(resp["error"]["message"].as_str().unwrap().contains("nope"));

        let resp = call(&mut session, json!({"id": 4, "method": "open", "params": {"text": 5}}));
        assert!(resp.get("error").is_some());

        assert!(!session.is_shut_down());
        assert!(session.handle_line("   ").is_none());
    }

    #[test]
    fn test_code_actions_use_last_text() {
        let mut session = Session::default();
        call(
            &mut session,
            json!({"id": 1, "method": "open", "params": {"document": "a", "text": "ArrLib[push](arr, 1)"}}),
        );
        let resp = call(
            &mut session,
            json!({"id": 2, "method": "codeActions", "params": {"document": "a"}}),
        );
        assert_eq!(resp["result"][0]["edit"]["newText"], "arrlib::push(arr, 1)");

        call(
            &mut session,
            json!({"id": 3, "method": "change", "params": {"document": "a", "text": "arrlib::push(arr, 1)"}}),
        );
        let resp = call(
            &mut session,
            json!({"id": 4, "method": "codeActions", "params": {"document": "a"}}),
        );
        assert_eq!(resp["result"], json!([]));
    }

    #[test]
    fn test_completion_and_close() {
        let mut session = Session::default();
        call(
            &mut session,
            json!({"id": 1, "method": "open", "params": {"document": "a", "text": "let r = strlib::up"}}),
        );
        let resp = call(
            &mut session,
            json!({"id": 2, "method": "completion", "params": {"document": "a", "position": {"line": 0, "character": 18}}}),
        );
        assert_eq!(resp["result"][0]["label"], "upper");

        let resp = call(&mut session, json!({"id": 3, "method": "close", "params": {"document": "a"}}));
        assert_eq!(resp["result"], true);
        assert_eq!(session.open_documents(), 0);
    }

    #[test]
    fn test_invalid_utf8_gets_error_response() {
        let mut session = Session::default();
        let line = session.handle_bytes(b"{\"id\": 1, \"method\": \"open\xff\"}").unwrap();
        let resp: Value = serde_json::from_str(&line).unwrap();
        assert!(resp["id"].is_null());
        assert!(resp["error"]["message"].as_str().unwrap().contains("UTF-8"));
        assert!(!session.is_shut_down());
    }

    #[tokio::test]
    async fn test_serve_continues_after_invalid_utf8() {
        let mut input: Vec<u8> = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(
            br#"{"id":7,"method":"open","params":{"document":"a","text":"let x = 1"}}"#,
        );
        let mut session = Session::default();
        let mut output = Vec::new();
        serve(&mut session, input.as_slice(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0]["error"].is_object());
        assert_eq!(lines[1]["id"], 7);
        assert!(lines[1]["result"]["diagnostics"].is_array());
        assert_eq!(session.open_documents(), 1);
    }

    #[tokio::test]
    async fn test_serve_stops_at_shutdown() {
        let input = concat!(
            r#"{"id":1,"method":"open","params":{"document":"a","text":"let x = 1"}}"#,
            "\n\n",
            r#"{"id":2,"method":"shutdown"}"#,
            "\n",
            r#"{"id":3,"method":"tokens","params":{"document":"a"}}"#,
            "\n",
        );
        let mut session = Session::default();
        let mut output = Vec::new();
        serve(&mut session, input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["id"], 2);
        assert!(session.is_shut_down());
    }
}
