//! `wren history list`

use tabled::Tabled;
use wren_shared::{ApiHistoryFilter, ApiHistoryItem, Pagination};

use crate::app::{App, Connect};
use crate::cli::{HistoryAction, HistoryListArgs};
use crate::error::CliError;
use crate::output::{dash, indent, short_time, Printer};

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Type")]
    api_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Thread")]
    thread: String,
}

impl From<&ApiHistoryItem> for HistoryRow {
    fn from(item: &ApiHistoryItem) -> Self {
        Self {
            time: short_time(Some(&item.created_at)),
            api_type: item.api_type.clone(),
            status: item
                .status_code
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            duration: item
                .duration_ms
                .map(|ms| format!("{}ms", ms))
                .unwrap_or_else(|| "-".to_string()),
            thread: dash(item.thread_id.as_deref()),
        }
    }
}

fn render_payloads(out: &mut Printer<'_>, item: &ApiHistoryItem) -> Result<(), CliError> {
    out.line("")?;
    out.line(format!(
        "{}  {}  {}",
        item.id,
        item.api_type,
        short_time(Some(&item.created_at))
    ))?;
    for (label, payload) in [
        ("Request", &item.request_payload),
        ("Response", &item.response_payload),
    ] {
        if let Some(payload) = payload.as_ref().filter(|p| !p.is_null()) {
            out.line(format!("  {}:", label))?;
            out.line(indent(&serde_json::to_string_pretty(payload)?, "    "))?;
        }
    }
    Ok(())
}

pub async fn run<C: Connect>(app: &mut App<'_, C>, action: HistoryAction) -> Result<(), CliError> {
    match action {
        HistoryAction::List(args) => list(app, args).await,
    }
}

async fn list<C: Connect>(app: &mut App<'_, C>, args: HistoryListArgs) -> Result<(), CliError> {
    let session = app.session()?;
    let filter = ApiHistoryFilter {
        api_type: args.api_type,
        status_code: args.status,
        thread_id: args.thread,
        start_date: args.start_date,
        end_date: args.end_date,
    };
    let pagination = Pagination {
        offset: args.offset,
        limit: args.limit,
    };
    let page = session.client.api_history(&filter, pagination).await?;

    if app.out.is_json() {
        return app.out.json(&page);
    }
    if page.items.is_empty() {
        return app.out.line("No API history found.");
    }

    if args.verbose {
        for item in &page.items {
            render_payloads(&mut app.out, item)?;
        }
    } else {
        app.out.table(page.items.iter().map(HistoryRow::from))?;
    }

    let shown_to = u64::from(args.offset) + page.items.len() as u64;
    let mut footer = format!(
        "Showing {}-{} of {}",
        u64::from(args.offset) + 1,
        shown_to,
        page.total
    );
    if page.has_more {
        footer.push_str(&format!(" (next page: --offset {})", shown_to));
    }
    app.out.note(footer)
}
