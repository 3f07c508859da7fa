//! WebSocket push of refreshed previews.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use stillframe_jsx::Conversion;

/// Messages sent to preview clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HmrMessage {
    /// Full page reload
    Reload,

    /// Replace the framed preview document
    Refresh {
        /// Logical path of the rendered file
        file: Option<String>,
        /// Complete preview document
        html: String,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Connection established
    Connected,
}

impl HmrMessage {
    /// Build a refresh message from a conversion result.
    pub fn refresh(file: Option<&str>, conversion: &Conversion) -> Self {
        Self::Refresh {
            file: file.map(str::to_string),
            html: conversion.html.clone(),
            success: conversion.success,
            error: conversion.error.clone(),
        }
    }
}

/// Hub for broadcasting messages to all connected clients.
#[derive(Debug, Clone)]
pub struct HmrHub {
    sender: broadcast::Sender<HmrMessage>,
}

impl HmrHub {
    /// Create a new hub.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected clients.
    pub fn send(&self, msg: HmrMessage) {
        // No receivers is fine
        let _ = self.sender.send(msg);
    }

    /// Subscribe to messages.
    pub fn subscribe(&self) -> broadcast::Receiver<HmrMessage> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for HmrHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate the client-side script that keeps the preview frame current.
///
/// The socket URL is derived from the page location, so the script works on
/// any host and port.
pub fn hmr_client_script(ws_path: &str) -> String {
    format!(
        r#"
(function() {{
  'use strict';

  const scheme = location.protocol === 'https:' ? 'wss://' : 'ws://';
  const ws = new WebSocket(scheme + location.host + '{}');
  let reconnectAttempts = 0;
  const maxReconnectAttempts = 10;

  function setStatus(success, error) {{
    const badge = document.getElementById('status');
    if (!badge) return;
    badge.className = 'badge ' + (success ? 'ok' : 'err');
    badge.textContent = success ? 'Rendered' : (error || 'Conversion failed');
  }}

  ws.onopen = function() {{
    console.log('[stillframe] Connected');
    reconnectAttempts = 0;
  }};

  ws.onmessage = function(event) {{
    const msg = JSON.parse(event.data);

    switch (msg.type) {{
      case 'reload':
        location.reload();
        break;

      case 'refresh':
        const frame = document.getElementById('preview');
        if (!frame) {{
          location.reload();
          break;
        }}
        frame.srcdoc = msg.html;
        if (msg.file) {{
          const label = document.getElementById('file');
          if (label) label.textContent = msg.file;
        }}
        setStatus(msg.success, msg.error);
        break;

      case 'connected':
        console.log('[stillframe] Server acknowledged connection');
        break;
    }}
  }};

  ws.onclose = function() {{
    console.log('[stillframe] Disconnected');
    if (reconnectAttempts < maxReconnectAttempts) {{
      reconnectAttempts++;
      setTimeout(function() {{
        location.reload();
      }}, 1000 * reconnectAttempts);
    }}
  }};

  ws.onerror = function(e) {{
    console.error('[stillframe] WebSocket error:', e);
  }};
}})();
"#,
        ws_path
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_broadcasts_messages() {
        let hub = HmrHub::new();
        let mut rx = hub.subscribe();

        hub.send(HmrMessage::Reload);

        match rx.try_recv() {
            Ok(HmrMessage::Reload) => {}
            _ => panic!("Expected Reload message"),
        }
    }

    #[test]
    fn send_without_subscribers_is_silent() {
        let hub = HmrHub::new();

        hub.send(HmrMessage::Connected);

        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn serializes_refresh() {
        let conversion = Conversion {
            html: "<!DOCTYPE html><p>x</p>".to_string(),
            success: true,
            error: None,
        };
        let msg = HmrMessage::refresh(Some("App.jsx"), &conversion);

        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "refresh");
        assert_eq!(json["file"], "App.jsx");
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn client_script_targets_socket_path() {
        let script = hmr_client_script("/__hmr");

        assert!(script.contains("location.host + '/__hmr'"));
        assert!(script.contains("frame.srcdoc = msg.html"));
    }
}
