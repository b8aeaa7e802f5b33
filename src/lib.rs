use std::sync::Arc;

use superdocs_core::{
    AnthropicClient, EditRequest, EditSession, FileSet, ModelConfig, ReconcileConfig, Reconciler,
    StreamMessage,
};
use tokio::sync::mpsc;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::wasm_bindgen;

fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::try_set_as_global_default()
        .unwrap_or_else(|e| tracing::warn!("failed to set tracing: {}", e));
}

fn to_js_error(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", e))
}

/// Config JSON may be empty; missing fields take their defaults.
fn parse_config(config_json: &str) -> anyhow::Result<ReconcileConfig> {
    if config_json.trim().is_empty() {
        return Ok(ReconcileConfig::default());
    }
    Ok(serde_json::from_str(config_json)?)
}

pub fn reconcile_json(
    files_json: &str,
    response: &str,
    config_json: &str,
) -> anyhow::Result<String> {
    let files: FileSet = serde_json::from_str(files_json)?;
    let config = parse_config(config_json)?;
    let reconciliation = Reconciler::new(config).reconcile(&files, response);
    Ok(serde_json::to_string(&reconciliation)?)
}

/// `files_json` is `[{"filepath", "content"}]`; returns the reconciliation
/// (`changes` and `failures`) as JSON.
#[wasm_bindgen]
pub fn reconcile_response(
    files_json: &str,
    response: &str,
    config_json: &str,
) -> Result<String, JsValue> {
    init();
    reconcile_json(files_json, response, config_json).map_err(to_js_error)
}

/// Runs a full edit session and calls `callback` with every stream message
/// serialized as JSON. Resolves to the per-instruction results.
#[wasm_bindgen]
pub async fn stream_edits(
    request_json: String,
    api_key: String,
    callback: js_sys::Function,
) -> Result<String, JsValue> {
    init();
    tracing::info!("start edit session");

    let request: EditRequest =
        serde_json::from_str(&request_json).map_err(|e| to_js_error(e.into()))?;
    let client = AnthropicClient::new(ModelConfig::new(api_key));
    let session = EditSession::new(Arc::new(client), ReconcileConfig::default());

    let (tx, mut rx) = mpsc::unbounded_channel::<StreamMessage>();
    let producer = async move {
        let results = session.run(&request, &tx).await;
        drop(tx);
        results
    };
    let consumer = async {
        while let Some(message) = rx.recv().await {
            match message.to_json() {
                Ok(json) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                        tracing::error!("stream callback failed: {:?}", e);
                    }
                }
                Err(e) => tracing::error!("failed to serialize stream message: {}", e),
            }
        }
    };

    let (results, ()) = futures_util::join!(producer, consumer);
    let results = results.map_err(to_js_error)?;
    serde_json::to_string(&results).map_err(|e| to_js_error(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use superdocs_core::{Change, Reconciliation};

    #[test]
    fn test_reconcile_json() {
        let files = r#"[{"filepath": "foo.py", "content": "x = 1\ny = 3\n"}]"#;
        let response = "```diff\n--- foo.py\n+++ foo.py\n@@ ... @@\n-x = 1\n+x = 2\n```";

        let json = reconcile_json(files, response, "").unwrap();
        let reconciliation: Reconciliation = serde_json::from_str(&json).unwrap();
        assert_eq!(reconciliation.changes, vec![Change::new("foo.py", "x = 1", "x = 2")]);
    }

    #[test]
    fn test_partial_config() {
        let config = parse_config(r#"{"edit_format": "search_replace"}"#).unwrap();
        assert_eq!(config.edit_format, superdocs_core::EditFormat::SearchReplace);
        assert!(parse_config("{not json").is_err());
    }
}
