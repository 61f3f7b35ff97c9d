//! JSON-lines tool server.
//!
//! Each input line is one request, each request gets exactly one response line:
//!
//! ```text
//! {"id":1,"method":"tools/list"}
//! {"id":2,"method":"tools/call","params":{"name":"solve_lp","arguments":{"problem":"Maximize A; A <= 3"}}}
//! ```

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use solvekit_lang::{DEFAULT_EQUATION, Options};
use tracing::{debug, warn};

/// Static description of one callable tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ToolParameter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolParameter {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

/// Tools exposed by the server, in listing order
pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "solve_equation",
            description: "Solve a single-variable equation in x and return its first real root.",
            parameters: vec![ToolParameter {
                name: "equation",
                kind: "string",
                description: "Equation in x, e.g. 'x^2 + 7 = 43'",
                required: false,
                default: Some(DEFAULT_EQUATION),
            }],
        },
        ToolDescriptor {
            name: "solve_lp",
            description: "Solve a linear program written as \
                          'Maximize|Minimize <expr>; <constraint>; ...' and return \
                          'obj=<v>; <var>=<v>; ...' or 'Error: <message>'.",
            parameters: vec![ToolParameter {
                name: "problem",
                kind: "string",
                description: "Semicolon-delimited objective and constraints",
                required: true,
                default: None,
            }],
        },
    ]
}

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    params: Option<CallParams>,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct Response {
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
}

impl ErrorBody {
    fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Stateless request handler; every call sees the same [`Options`].
pub struct Server {
    options: Options,
}

impl Server {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Serve until `input` is exhausted. Blank lines are ignored.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let response = self.handle_line(&line);
            writeln!(output, "{response}")?;
            output.flush()?;
        }
        Ok(())
    }

    /// Handle one request line and return one response line.
    pub fn handle_line(&self, line: &str) -> String {
        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                debug!(
                    component = "server",
                    operation = "dispatch",
                    status = "received",
                    method = %request.method,
                    "Request"
                );
                let id = request.id.clone();
                match self.dispatch(request) {
                    Ok(result) => Response {
                        id,
                        result: Some(result),
                        error: None,
                    },
                    Err(error) => Response {
                        id,
                        result: None,
                        error: Some(error),
                    },
                }
            }
            Err(err) => {
                warn!(
                    component = "server",
                    operation = "decode",
                    status = "error",
                    error = %err,
                    "Malformed request"
                );
                Response {
                    id: Value::Null,
                    result: None,
                    error: Some(ErrorBody::new("InvalidRequest", err.to_string())),
                }
            }
        };

        serde_json::to_string(&response).unwrap_or_else(|err| {
            json!({
                "id": Value::Null,
                "error": {"kind": "InvalidRequest", "message": err.to_string()},
            })
            .to_string()
        })
    }

    fn dispatch(&self, request: Request) -> Result<Value, ErrorBody> {
        match request.method.as_str() {
            "tools/list" => Ok(json!({ "tools": tools() })),
            "tools/call" => {
                let params = request
                    .params
                    .ok_or_else(|| ErrorBody::new("InvalidRequest", "tools/call requires params"))?;
                self.call_tool(&params)
            }
            other => Err(ErrorBody::new("UnknownMethod", format!("unknown method '{other}'"))),
        }
    }

    fn call_tool(&self, params: &CallParams) -> Result<Value, ErrorBody> {
        match params.name.as_str() {
            "solve_equation" => {
                let equation =
                    string_argument(&params.arguments, "equation")?.unwrap_or(DEFAULT_EQUATION);
                solvekit_lang::solve_equation(equation)
                    .map(|value| json!({ "value": value }))
                    .map_err(|err| ErrorBody::new(err.kind(), err.to_string()))
            }
            "solve_lp" => {
                let problem = string_argument(&params.arguments, "problem")?.ok_or_else(|| {
                    ErrorBody::new("InvalidArguments", "missing required argument 'problem'")
                })?;
                let text = solvekit_lang::solve_lp_with(problem, &self.options);
                Ok(json!({ "text": text }))
            }
            other => Err(ErrorBody::new("UnknownTool", format!("unknown tool '{other}'"))),
        }
    }
}

/// `Ok(None)` when absent, an error when present but not a string.
fn string_argument<'a>(
    arguments: &'a Map<String, Value>,
    name: &str,
) -> Result<Option<&'a str>, ErrorBody> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ErrorBody::new(
            "InvalidArguments",
            format!("argument '{name}' must be a string"),
        )),
    }
}
