use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::models::ApiResponse;
use crate::services::events::Table;
use crate::services::views::ManagerRow;

/// What a screen shows for one fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Data(T),
    Empty,
    Error(String),
}

impl<T> ViewState<Vec<T>> {
    pub fn from_rows(result: Result<Vec<T>>) -> Self {
        match result {
            Ok(rows) if rows.is_empty() => ViewState::Empty,
            Ok(rows) => ViewState::Data(rows),
            Err(e) => ViewState::Error(e.to_string()),
        }
    }
}

/// Identifies one fetch; later fetches get larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// Holds the newest view state. A result is applied only if its request was
/// issued after the one currently shown, so a slow early response cannot
/// overwrite a fresher one.
pub struct LatestSlot<T> {
    issued: AtomicU64,
    current: Mutex<(u64, ViewState<T>)>,
}

impl<T: Clone> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            current: Mutex::new((0, ViewState::Loading)),
        }
    }

    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns false when the result was stale and dropped.
    pub fn apply(&self, ticket: RequestTicket, state: ViewState<T>) -> bool {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if ticket.0 <= current.0 {
            tracing::debug!("Dropping stale response #{} (showing #{})", ticket.0, current.0);
            return false;
        }
        *current = (ticket.0, state);
        true
    }

    pub fn snapshot(&self) -> ViewState<T> {
        match self.current.lock() {
            Ok(guard) => guard.1.clone(),
            Err(poisoned) => poisoned.into_inner().1.clone(),
        }
    }
}

impl<T: Clone> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One server-sent event frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Drains every complete frame from `buffer`, leaving a partial tail behind.
/// Frames are decoded only once complete, so a character split across two
/// network chunks survives. Comment-only frames (keep-alives) are skipped.
pub fn drain_frames(buffer: &mut Vec<u8>) -> Vec<SseFrame> {
    let mut frames = Vec::new();
    while let Some(end) = buffer.windows(2).position(|w| w == b"\n\n") {
        let raw: Vec<u8> = buffer.drain(..end + 2).collect();
        let raw = String::from_utf8_lossy(&raw);
        let mut event = String::from("message");
        let mut data = Vec::new();
        let mut has_field = false;

        for line in raw.lines() {
            if let Some(value) = line.strip_prefix("event:") {
                event = value.trim().to_string();
                has_field = true;
            } else if let Some(value) = line.strip_prefix("data:") {
                data.push(value.trim_start().to_string());
                has_field = true;
            }
        }

        if has_field {
            frames.push(SseFrame {
                event,
                data: data.join("\n"),
            });
        }
    }
    frames
}

#[derive(Clone)]
pub struct DashboardClient {
    client: Client,
    base_url: String,
}

impl DashboardClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;

        let status = response.status();
        let body: ApiResponse<T> = response.json().await?;
        match body.data {
            Some(data) if body.success => Ok(data),
            _ => Err(anyhow!(
                "{} failed ({}): {}",
                path,
                status,
                body.error.unwrap_or_else(|| "no data".to_string())
            )),
        }
    }

    pub async fn managers(&self) -> Result<Vec<ManagerRow>> {
        self.get("/managers").await
    }

    /// Follows the change feed for `table`, sending one notice per change.
    /// Returns when the server closes the stream or the receiver goes away.
    pub async fn follow_table(&self, table: Table, notify: mpsc::Sender<()>) -> Result<()> {
        let mut response = self
            .client
            .get(format!("{}/events/{}", self.base_url, table))
            .header("accept", "text/event-stream")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("Change feed for {} refused: {}", table, response.status()));
        }

        tracing::info!("Following changes on {}", table);
        let mut buffer: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            // CRLF line endings are folded to LF.
            buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));
            for frame in drain_frames(&mut buffer) {
                if frame.event == "change" || frame.event == "lagged" {
                    tracing::debug!("{} change: {}", table, frame.data);
                    if notify.send(()).await.is_err() {
                        return Ok(());
                    }
                }
            }
        }

        tracing::info!("Change feed for {} closed by server", table);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_late_response_cannot_overwrite_newer_state() {
        let slot: LatestSlot<Vec<u32>> = LatestSlot::new();
        let first = slot.begin();
        let second = slot.begin();

        assert!(slot.apply(second, ViewState::Data(vec![2])));
        assert!(!slot.apply(first, ViewState::Data(vec![1])));
        assert_eq!(slot.snapshot(), ViewState::Data(vec![2]));
    }

    #[test]
    fn test_in_order_responses_apply() {
        let slot: LatestSlot<Vec<u32>> = LatestSlot::new();
        assert_eq!(slot.snapshot(), ViewState::Loading);

        let first = slot.begin();
        assert!(slot.apply(first, ViewState::Empty));
        let second = slot.begin();
        assert!(slot.apply(second, ViewState::Error("offline".into())));
        assert_eq!(slot.snapshot(), ViewState::Error("offline".into()));
    }

    #[test]
    fn test_view_state_from_rows() {
        assert_eq!(ViewState::<Vec<u8>>::from_rows(Ok(vec![])), ViewState::Empty);
        assert_eq!(ViewState::from_rows(Ok(vec![1u8])), ViewState::Data(vec![1]));
        assert!(matches!(
            ViewState::<Vec<u8>>::from_rows(Err(anyhow!("boom"))),
            ViewState::Error(msg) if msg == "boom"
        ));
    }

    #[test]
    fn test_drain_frames_keeps_partial_tail() {
        let mut buffer = b": keep-alive\n\nevent: change\ndata: {\"table\":\"managers\"}\n\nevent: cha".to_vec();
        let frames = drain_frames(&mut buffer);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "change");
        assert_eq!(frames[0].data, "{\"table\":\"managers\"}");
        assert_eq!(buffer, b"event: cha");

        buffer.extend_from_slice(b"nge\ndata: x\n\n");
        let frames = drain_frames(&mut buffer);
        assert_eq!(frames[0].event, "change");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_drain_frames_rejoins_split_characters() {
        let frame = "event: change\ndata: Müller\n\n".as_bytes();
        let split = frame.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut buffer = frame[..split].to_vec();
        assert!(drain_frames(&mut buffer).is_empty());
        buffer.extend_from_slice(&frame[split..]);
        let frames = drain_frames(&mut buffer);
        assert_eq!(frames[0].data, "Müller");
    }
}
