//! Keyboard-layout-editor (KLE) raw data ingestion.
//!
//! ```
//! let layout = kbplate_layout::parse_layout(r#"["Q", "W"], [{w: 2}, "Shift"]"#).unwrap();
//! assert_eq!(layout.keys.len(), 3);
//! assert_eq!(layout.keys[2].width, 2.0);
//! ```

mod error;
mod kle;
mod properties;

use serde_json::Value;
use tracing::debug;

use kbplate_core::KeyRecord;

pub use error::LayoutError;
pub use properties::{CaseProperties, LayerProperties, LayoutProperties, UsbProperties};

/// Parsed layout: unresolved keyboard properties plus keys in layout order.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub properties: LayoutProperties,
    pub keys: Vec<KeyRecord>,
}

/// Parse KLE raw data, with or without the enclosing brackets.
pub fn parse_layout(text: &str) -> Result<Layout, LayoutError> {
    let wrapped = format!("[{text}]");
    let root: Value = json5::from_str(&wrapped).map_err(|e| LayoutError::Syntax(e.to_string()))?;
    let Value::Array(mut rows) = root else {
        return Err(LayoutError::NotAnArray);
    };
    if is_wrapped_document(&rows) {
        if let Some(Value::Array(inner)) = rows.pop() {
            rows = inner;
        }
    }

    let (keys, props) = kle::parse_rows(&rows)?;
    if keys.is_empty() {
        return Err(LayoutError::NoKeys);
    }
    let properties: LayoutProperties = serde_json::from_value(Value::Object(props))
        .map_err(|e| LayoutError::InvalidProperties(e.to_string()))?;
    debug!(keys = keys.len(), "parsed layout");
    Ok(Layout { properties, keys })
}

/// The text already carried its own brackets: one element holding only rows and objects.
fn is_wrapped_document(rows: &[Value]) -> bool {
    match rows {
        [Value::Array(inner)] => {
            !inner.is_empty()
                && inner
                    .iter()
                    .all(|v| matches!(v, Value::Array(_) | Value::Object(_)))
                && inner.iter().any(|v| matches!(v, Value::Array(_)))
        }
        _ => false,
    }
}
