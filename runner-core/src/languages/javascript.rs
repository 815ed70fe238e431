use async_trait::async_trait;
use boa_engine::{
    context::ContextBuilder,
    gc::{Gc, GcRefCell},
    js_string,
    object::ObjectInitializer,
    property::Attribute,
    Context, JsError, JsResult, JsValue, NativeFunction, Source,
};
use tracing::debug;

use crate::{
    error::Error,
    executor::ExecutionBackend,
    types::{Language, WorkerRequest, WorkerResponse, UNDEFINED_RESULT},
};

const LANG: &str = "javascript";

pub(crate) const SAMPLE_SOURCE: &str = r#"// Welcome to the Code Runner!
// Select a language, write your code, and press "Run Code".

console.log("Hello from the JavaScript sandbox!");

function add(a, b) {
  return a + b;
}

console.log("2 + 3 =", add(2, 3));"#;

/// Evaluates JavaScript in a fresh engine context per request
#[derive(Debug, Default)]
pub struct ScriptBackend;

impl ScriptBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExecutionBackend for ScriptBackend {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    async fn execute(&self, request: WorkerRequest) -> Result<WorkerResponse, Error> {
        let code = request.code;
        tokio::task::spawn_blocking(move || evaluate(&code))
            .await
            .map_err(|e| Error::WorkerCrash {
                worker: "JavaScript".to_string(),
                message: e.to_string(),
            })
    }
}

/// Run `code` as a top-level script with a capturing `console`
pub(crate) fn evaluate(code: &str) -> WorkerResponse {
    let logs = Gc::new(GcRefCell::new(Vec::new()));

    let mut context = match ContextBuilder::new().build() {
        Ok(context) => context,
        Err(err) => {
            return WorkerResponse::error(
                LANG,
                Vec::new(),
                format!("failed to construct JS context: {err}"),
            )
        }
    };

    if let Err(err) = install_console(&mut context, logs.clone()) {
        let message = error_message(&err, &mut context);
        return WorkerResponse::error(LANG, Vec::new(), message);
    }

    let outcome = context
        .eval(Source::from_bytes(code.as_bytes()))
        .and_then(|value| describe_result(&value, &mut context));
    let outcome = outcome.map_err(|err| error_message(&err, &mut context));

    let logs = std::mem::take(&mut *logs.borrow_mut());
    debug!(captured = logs.len(), "script evaluation finished");

    match outcome {
        Ok(result) => WorkerResponse::success(LANG, logs, Some(result)),
        Err(message) => WorkerResponse::error(LANG, logs, message),
    }
}

fn install_console(context: &mut Context, logs: Gc<GcRefCell<Vec<String>>>) -> JsResult<()> {
    let log = NativeFunction::from_copy_closure_with_captures(
        |_this, args, logs: &Gc<GcRefCell<Vec<String>>>, context| {
            let mut parts = Vec::with_capacity(args.len());
            for arg in args {
                parts.push(stringify(arg, context)?);
            }
            logs.borrow_mut().push(parts.join(" "));
            Ok(JsValue::undefined())
        },
        logs,
    );

    let console = ObjectInitializer::new(context)
        .function(log, js_string!("log"), 0)
        .build();

    context.register_global_property(
        js_string!("console"),
        console,
        Attribute::WRITABLE | Attribute::CONFIGURABLE,
    )
}

fn describe_result(value: &JsValue, context: &mut Context) -> JsResult<String> {
    if value.is_null_or_undefined() {
        return Ok(UNDEFINED_RESULT.to_string());
    }
    stringify(value, context)
}

/// `String(value)`: symbols get their description instead of throwing
fn stringify(value: &JsValue, context: &mut Context) -> JsResult<String> {
    if let Some(symbol) = value.as_symbol() {
        return Ok(symbol.descriptive_string().to_std_string_escaped());
    }
    Ok(value.to_string(context)?.to_std_string_escaped())
}

/// The thrown value's `message`, or its string form when it has none
fn error_message(error: &JsError, context: &mut Context) -> String {
    let thrown = error.to_opaque(context);

    if let Some(object) = thrown.as_object() {
        if let Ok(message) = object.get(js_string!("message"), context) {
            if !message.is_null_or_undefined() {
                if let Ok(text) = message.to_string(context) {
                    let text = text.to_std_string_escaped();
                    if !text.is_empty() {
                        return text;
                    }
                }
            }
        }
    }

    thrown
        .to_string(context)
        .map(|text| text.to_std_string_escaped())
        .unwrap_or_else(|_| error.to_string())
}
