//! Wire format shared with the classification server
//!
//! Request: one binary frame holding the PNG-encoded attempt.
//! Reply: one text frame, either `{"confidences": [..]}` or `{"error": ".."}`.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use serde::Deserialize;

use crate::ClassifierError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ClassifierReply {
    Confidences { confidences: Vec<f64> },
    Error { error: String },
}

impl ClassifierReply {
    /// Pick the confidence for `label_index`
    pub fn confidence(self, label_index: usize) -> Result<f64, ClassifierError> {
        match self {
            ClassifierReply::Error { error } => Err(ClassifierError::Server(error)),
            ClassifierReply::Confidences { confidences } => {
                let value = confidences.get(label_index).copied().ok_or_else(|| {
                    ClassifierError::InvalidResponse(format!(
                        "no confidence for label {} ({} returned)",
                        label_index,
                        confidences.len()
                    ))
                })?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(ClassifierError::InvalidResponse(format!(
                        "confidence {value} out of range"
                    )));
                }
                Ok(value)
            }
        }
    }
}

/// Parse a text reply and select the confidence for `label_index`
pub fn parse_reply(text: &str, label_index: usize) -> Result<f64, ClassifierError> {
    let reply: ClassifierReply = serde_json::from_str(text)
        .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;
    reply.confidence(label_index)
}

/// Encode an attempt as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ClassifierError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| ClassifierError::Encode(e.to_string()))?;
    Ok(bytes)
}
