//! Hand a locally built calendar document to the device.

use crate::invite::ics::{CONTENT_TYPE, FILENAME};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

/// How a document reaches the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Delivery {
    /// Data URI the share sheet can open directly
    DataUri { uri: String },
    /// File saved through the browser's download flow
    Attachment {
        filename: &'static str,
        content_type: &'static str,
        body: String,
    },
}

/// Strategy chosen once per client from its platform
pub trait DeliveryStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn deliver(&self, document: &str) -> Delivery;
}

/// iOS-style share sheet via a base64 data URI
#[derive(Debug, Default)]
pub struct ShareSheet;

impl DeliveryStrategy for ShareSheet {
    fn name(&self) -> &'static str {
        "share_sheet"
    }

    fn deliver(&self, document: &str) -> Delivery {
        Delivery::DataUri {
            uri: format!(
                "data:text/calendar;charset=utf-8;base64,{}",
                STANDARD.encode(document)
            ),
        }
    }
}

/// Plain `invite.ics` download
#[derive(Debug, Default)]
pub struct FileDownload;

impl DeliveryStrategy for FileDownload {
    fn name(&self) -> &'static str {
        "file_download"
    }

    fn deliver(&self, document: &str) -> Delivery {
        Delivery::Attachment {
            filename: FILENAME,
            content_type: CONTENT_TYPE,
            body: document.to_string(),
        }
    }
}

/// Pick the strategy for a client from its user agent
pub fn select_strategy(user_agent: &str) -> Box<dyn DeliveryStrategy> {
    let is_ios = ["iPhone", "iPad", "iPod"]
        .iter()
        .any(|device| user_agent.contains(device));

    if is_ios {
        Box::new(ShareSheet)
    } else {
        Box::new(FileDownload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15";
    const DESKTOP: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0";

    #[test]
    fn test_select_strategy() {
        assert_eq!(select_strategy(IPHONE).name(), "share_sheet");
        assert_eq!(select_strategy(DESKTOP).name(), "file_download");
        assert_eq!(select_strategy("").name(), "file_download");
    }

    #[test]
    fn test_share_sheet_data_uri() {
        let delivery = ShareSheet.deliver("BEGIN:VCALENDAR");
        assert_eq!(
            delivery,
            Delivery::DataUri {
                uri: "data:text/calendar;charset=utf-8;base64,QkVHSU46VkNBTEVOREFS".to_string()
            }
        );
    }

    #[test]
    fn test_file_download() {
        match FileDownload.deliver("BEGIN:VCALENDAR") {
            Delivery::Attachment { filename, body, .. } => {
                assert_eq!(filename, "invite.ics");
                assert_eq!(body, "BEGIN:VCALENDAR");
            }
            other => panic!("unexpected delivery {other:?}"),
        }
    }
}
