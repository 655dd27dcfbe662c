#![no_main]

use beacon_dashboard::{render_item_row, RowRenderContext, SectionId, TicketItem};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(item) = serde_json::from_slice::<TicketItem>(data) else {
        return;
    };
    let context = RowRenderContext {
        ticket_url_template: Some("https://desk.example.com/tickets/{id}".to_string()),
        ..RowRenderContext::default()
    };
    let row = render_item_row(&item, SectionId::S1, &context);
    assert!(row.html.starts_with("<tr>"));
    assert!(row.html.ends_with("</tr>"));
    assert!(!row.html.contains("<script"));
});
