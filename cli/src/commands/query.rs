//! Natural-language and SQL commands: ask, sql, run-sql, summary, chart

use wren_shared::{AskRequest, ChartRequest, GenerateSqlRequest, RunSqlRequest, SummaryRequest};

use crate::app::{App, Connect};
use crate::cli::{AskArgs, ChartArgs, RunSqlArgs, SqlArgs, SummaryArgs};
use crate::error::CliError;
use crate::output::{format_sql, Printer};
use crate::ui::Progress;

fn thread_note(out: &mut Printer<'_>, thread_id: Option<&str>) -> Result<(), CliError> {
    match thread_id.filter(|t| !t.is_empty()) {
        Some(id) => out.note(format!("\nThread: {} (continue with --thread-id {})", id, id)),
        None => Ok(()),
    }
}

pub async fn ask<C: Connect>(app: &mut App<'_, C>, args: AskArgs) -> Result<(), CliError> {
    let (session, _) = app.project_session()?;
    let request = AskRequest {
        question: args.question,
        sample_size: args.sample_size,
        language: args.language,
        thread_id: args.thread_id,
    };
    let outcome = {
        let _progress = Progress::start(app.out.err(), "Thinking");
        session.client.ask(&request).await
    }?;
    let answer = app.settle(outcome)?;

    if app.out.is_json() {
        return app.out.json(&answer);
    }

    if answer.is_non_sql() {
        let text = answer
            .explanation
            .as_deref()
            .or(answer.summary.as_deref())
            .unwrap_or("The question could not be answered with SQL.");
        app.out.line(text)?;
        return thread_note(&mut app.out, answer.thread_id.as_deref());
    }

    if let Some(sql) = answer.sql.as_deref().filter(|s| !s.is_empty()) {
        app.out.section("SQL")?;
        app.out.line(format_sql(sql))?;
    }
    if let Some(summary) = answer.summary.as_deref().filter(|s| !s.is_empty()) {
        app.out.section("Answer")?;
        app.out.line(summary)?;
    }
    thread_note(&mut app.out, answer.thread_id.as_deref())
}

pub async fn generate_sql<C: Connect>(app: &mut App<'_, C>, args: SqlArgs) -> Result<(), CliError> {
    let (session, _) = app.project_session()?;
    let request = GenerateSqlRequest {
        question: args.question,
        thread_id: args.thread_id,
        language: args.language,
        return_sql_dialect: args.dialect,
    };
    let outcome = {
        let _progress = Progress::start(app.out.err(), "Generating SQL");
        session.client.generate_sql(&request).await
    }?;
    let generated = app.settle(outcome)?;

    if app.out.is_json() {
        return app.out.json(&generated);
    }
    app.out.line(format_sql(&generated.sql))?;
    thread_note(&mut app.out, generated.thread_id.as_deref())
}

pub async fn run_sql<C: Connect>(app: &mut App<'_, C>, args: RunSqlArgs) -> Result<(), CliError> {
    let (session, _) = app.project_session()?;
    let request = RunSqlRequest {
        sql: args.sql,
        thread_id: args.thread_id,
        limit: args.limit,
    };
    let outcome = session.client.run_sql(&request).await?;
    let result = app.settle(outcome)?;

    if app.out.is_json() {
        return app.out.json(&result);
    }
    if result.columns.is_empty() {
        return app.out.line("Query returned no columns.");
    }

    let headers = result.columns.iter().map(|c| c.name.clone()).collect();
    let rows = result.rows();
    let count = rows.len();
    app.out.grid(headers, rows)?;
    app.out.note(format!(
        "{} row(s) returned (of {} total)",
        count, result.total_rows
    ))?;
    thread_note(&mut app.out, result.thread_id.as_deref())
}

pub async fn summary<C: Connect>(app: &mut App<'_, C>, args: SummaryArgs) -> Result<(), CliError> {
    let (session, _) = app.project_session()?;
    let request = SummaryRequest {
        question: args.question,
        sql: args.sql,
        sample_size: args.sample_size,
        language: args.language,
        thread_id: args.thread_id,
    };
    let outcome = {
        let _progress = Progress::start(app.out.err(), "Summarizing");
        session.client.generate_summary(&request).await
    }?;
    let result = app.settle(outcome)?;

    if app.out.is_json() {
        return app.out.json(&result);
    }
    app.out.line(result.text())?;
    thread_note(&mut app.out, result.thread_id.as_deref())
}

pub async fn chart<C: Connect>(app: &mut App<'_, C>, args: ChartArgs) -> Result<(), CliError> {
    let (session, _) = app.project_session()?;
    let request = ChartRequest {
        question: args.question,
        sql: args.sql,
        sample_size: args.sample_size,
        thread_id: args.thread_id,
    };
    let outcome = {
        let _progress = Progress::start(app.out.err(), "Generating chart");
        session.client.generate_chart(&request).await
    }?;
    let result = app.settle(outcome)?;

    if app.out.is_json() {
        return app.out.json(&result);
    }
    app.out.json(&result.vega_spec)?;
    thread_note(&mut app.out, result.thread_id.as_deref())
}
