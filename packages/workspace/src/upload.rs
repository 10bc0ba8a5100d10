//! Upload progress delivered to an editor.
//!
//! Uploads run on background tasks and report through an unbounded channel.
//! The editor is single-threaded, so the host drains the queue between
//! transactions.

use folio_editor::plugins::images;
use folio_editor::Editor;
use tokio::sync::mpsc;
use tracing::debug;

use crate::WorkspaceResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Progress { upload_id: String, percent: u8 },
    Completed { upload_id: String, object_key: String },
    Failed { upload_id: String },
}

impl UploadEvent {
    pub fn upload_id(&self) -> &str {
        match self {
            UploadEvent::Progress { upload_id, .. }
            | UploadEvent::Completed { upload_id, .. }
            | UploadEvent::Failed { upload_id } => upload_id,
        }
    }

    fn apply(&self, editor: &mut Editor) -> WorkspaceResult<bool> {
        let changed = match self {
            UploadEvent::Progress { upload_id, percent } => images::set_upload_progress(editor, upload_id, *percent)?,
            UploadEvent::Completed { upload_id, object_key } => images::complete_upload(editor, upload_id, object_key)?,
            UploadEvent::Failed { upload_id } => images::fail_upload(editor, upload_id)?,
        };
        Ok(changed)
    }
}

pub struct UploadQueue {
    sender: mpsc::UnboundedSender<UploadEvent>,
    receiver: mpsc::UnboundedReceiver<UploadEvent>,
}

impl UploadQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Handle for upload tasks
    pub fn sender(&self) -> mpsc::UnboundedSender<UploadEvent> {
        self.sender.clone()
    }

    /// Wait for the next event
    pub async fn recv(&mut self) -> Option<UploadEvent> {
        self.receiver.recv().await
    }

    /// Apply every queued event to `editor` and end the transaction.
    /// Returns how many events changed the document.
    pub fn drain_into(&mut self, editor: &mut Editor) -> WorkspaceResult<usize> {
        let mut applied = 0;
        while let Ok(event) = self.receiver.try_recv() {
            if event.apply(editor)? {
                applied += 1;
            } else {
                debug!(upload_id = event.upload_id(), ?event, "Upload event had no effect");
            }
        }
        if applied > 0 {
            editor.flush();
        }
        Ok(applied)
    }
}

impl Default for UploadQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{Document, Element, ElementType, Node, Point, Range};

    fn editor_with_upload(upload_id: &str) -> Editor {
        let mut editor = Editor::new(Document::new(vec![Node::Element(Element::paragraph("text"))])).unwrap();
        editor.select(Range::collapsed(Point::new([0, 0], 4))).unwrap();
        images::insert_image(&mut editor, upload_id).unwrap();
        editor.flush();
        editor
    }

    fn image(editor: &Editor) -> Option<Element> {
        editor
            .document()
            .descendants()
            .find_map(|(_, node)| node.as_element().filter(|element| element.kind == ElementType::Image).cloned())
    }

    #[tokio::test]
    async fn test_progress_then_completion() {
        let mut editor = editor_with_upload("up-1");
        let mut queue = UploadQueue::new();
        let sender = queue.sender();

        tokio::spawn(async move {
            for percent in [10, 50, 30] {
                sender
                    .send(UploadEvent::Progress {
                        upload_id: "up-1".to_string(),
                        percent,
                    })
                    .unwrap();
            }
        })
        .await
        .unwrap();

        // 30 arrives after 50 and is ignored
        assert_eq!(queue.drain_into(&mut editor).unwrap(), 2);
        assert_eq!(image(&editor).unwrap().uploading(), Some(50));

        queue
            .sender()
            .send(UploadEvent::Completed {
                upload_id: "up-1".to_string(),
                object_key: "figures/1.png".to_string(),
            })
            .unwrap();
        assert_eq!(queue.drain_into(&mut editor).unwrap(), 1);

        let image = image(&editor).unwrap();
        assert_eq!(image.object_key(), Some("figures/1.png"));
        assert_eq!(image.uploading(), None);
        assert_eq!(image.upload_id(), None);
    }

    #[tokio::test]
    async fn test_failed_upload_removes_image() {
        let mut editor = editor_with_upload("up-2");
        let mut queue = UploadQueue::new();

        queue.sender().send(UploadEvent::Failed { upload_id: "up-2".to_string() }).unwrap();
        assert_eq!(queue.drain_into(&mut editor).unwrap(), 1);
        assert!(image(&editor).is_none());

        // Events for an image that is gone are no-ops
        queue
            .sender()
            .send(UploadEvent::Progress {
                upload_id: "up-2".to_string(),
                percent: 90,
            })
            .unwrap();
        assert_eq!(queue.drain_into(&mut editor).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_recv_waits_for_events() {
        let mut queue = UploadQueue::default();
        let sender = queue.sender();
        tokio::spawn(async move {
            sender.send(UploadEvent::Failed { upload_id: "x".to_string() }).unwrap();
        });

        let event = queue.recv().await.unwrap();
        assert_eq!(event.upload_id(), "x");
    }
}
