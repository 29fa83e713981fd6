//! The invitation core: decoding, calendar documents, provider links and display.

pub mod display;
pub mod ics;
pub mod links;
pub mod page;
pub mod params;

pub use display::{format_event_date_time, resolve_locale, DisplayDateTime, DisplayLocale};
pub use ics::{escape_calendar_text, generate_ics, CalendarEvent};
pub use links::ProviderLinks;
pub use page::{build_page, PageState};
pub use params::{decode_param, repair_offset, EventRequest, QueryParams};
