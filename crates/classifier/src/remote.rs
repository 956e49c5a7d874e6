//! Remote classification server client

use crate::protocol::{encode_png, parse_reply};
use crate::{ClassifierBackend, ClassifierError, ClassifyingGuard};
use futures_util::{SinkExt, StreamExt};
use spiralcal_config::ClassifierConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Remote classifier that connects to a WebSocket server
pub struct RemoteClassifier {
    server_url: String,
    label_index: usize,
    cancelled: Arc<AtomicBool>,
    classifying: Arc<AtomicBool>,
}

impl RemoteClassifier {
    pub fn new(server_url: String, label_index: usize) -> Self {
        Self {
            server_url,
            label_index,
            cancelled: Arc::new(AtomicBool::new(false)),
            classifying: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.server_url.clone(), config.label_index)
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

impl ClassifierBackend for RemoteClassifier {
    async fn classify(&mut self, image: &image::RgbaImage) -> Result<f64, ClassifierError> {
        self.cancelled.store(false, Ordering::SeqCst);
        let _guard = ClassifyingGuard::start(&self.classifying);

        self.classify_inner(image).await
    }

    fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_classifying(&self) -> bool {
        self.classifying.load(Ordering::SeqCst)
    }
}

impl RemoteClassifier {
    async fn classify_inner(&self, image: &image::RgbaImage) -> Result<f64, ClassifierError> {
        let payload = encode_png(image)?;

        let (ws_stream, _) = connect_async(&self.server_url)
            .await
            .map_err(|e| ClassifierError::Connection(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        tracing::debug!(
            "Sending {} byte attempt to {}",
            payload.len(),
            self.server_url
        );
        write
            .send(Message::Binary(payload.into()))
            .await
            .map_err(|e| ClassifierError::Connection(e.to_string()))?;

        while let Some(msg) = read.next().await {
            if self.cancelled.load(Ordering::SeqCst) {
                return Err(ClassifierError::Cancelled);
            }

            match msg {
                Ok(Message::Text(text)) => {
                    let confidence = parse_reply(&text, self.label_index)?;
                    // Best effort; the reply is already in hand
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(confidence);
                }
                Ok(Message::Close(_)) => break,
                Err(e) => return Err(ClassifierError::Connection(e.to_string())),
                _ => {}
            }
        }

        Err(ClassifierError::InvalidResponse(
            "Connection closed before a reply".into(),
        ))
    }
}
