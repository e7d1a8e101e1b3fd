//! Support tickets stored in the service desk's incident object
//!
//! SOQL builders and display helpers used by the `tickets` command.

use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::api::query::{Record, field_text};

pub const TICKET_OBJECT: &str = "BMCServiceDesk__Incident__c";
pub const HISTORY_OBJECT: &str = "BMCServiceDesk__IncidentHistory__c";

pub mod fields {
    pub const ID: &str = "Id";
    pub const NAME: &str = "Name";
    pub const SUMMARY: &str = "COL_UCL_Summary__c";
    pub const LAST_MODIFIED: &str = "LastModifiedDate";
    pub const QUEUE: &str = "BMCServiceDesk__Queue__c";
    pub const STATUS: &str = "BMCServiceDesk__Status_ID__c";
    pub const USER: &str = "UCL_userid_UPI__c";
    pub const DESCRIPTION: &str = "BMCServiceDesk__incidentDescription__c";
    pub const LAUNCH_CONSOLE: &str = "BMCServiceDesk__Launch_console__c";

    pub const HISTORY_INCIDENT: &str = "BMCServiceDesk__FKIncident__c";
    pub const HISTORY_NOTE: &str = "BMCServiceDesk__RichTextNote__c";
    pub const HISTORY_USER: &str = "BMCServiceDesk__userId__c";
    pub const HISTORY_ACTION: &str = "BMCServiceDesk__actionId__c";
}

/// Predefined ticket listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    New,
    Waiting,
    Recent,
}

impl Listing {
    pub fn statuses(&self) -> &'static [&'static str] {
        match self {
            Listing::New => &["NEW"],
            Listing::Waiting => &["NEW", "CUSTOMER RESPONDED"],
            Listing::Recent => &[],
        }
    }

    pub fn limit(&self) -> u32 {
        match self {
            Listing::New | Listing::Waiting => 15,
            Listing::Recent => 50,
        }
    }
}

/// A ticket named on the command line, either by record Id or by number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketRef {
    Id(String),
    Number(String),
}

impl TicketRef {
    /// Incident Ids start with `a`; anything else is taken as a ticket
    /// number, with an optional `IN:` or `IN` prefix.
    ///
    /// This does not check the org's actual key prefixes.
    pub fn parse(arg: &str) -> Self {
        if arg.starts_with('a') {
            TicketRef::Id(arg.to_string())
        } else {
            let number = arg
                .strip_prefix("IN:")
                .or_else(|| arg.strip_prefix("IN"))
                .unwrap_or(arg);
            TicketRef::Number(number.to_string())
        }
    }

    /// Key for a record lookup: the Id, or `Name:<number>`
    pub fn lookup_key(&self) -> String {
        match self {
            TicketRef::Id(id) => id.clone(),
            TicketRef::Number(number) => format!("{}:{}", fields::NAME, number),
        }
    }

    fn field_and_value(&self) -> (&'static str, &str) {
        match self {
            TicketRef::Id(id) => (fields::ID, id),
            TicketRef::Number(number) => (fields::NAME, number),
        }
    }
}

/// Quote a value for use inside a SOQL string literal
pub fn escape_soql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

pub fn listing_soql(queue: &str, listing: Listing) -> String {
    let statuses = listing.statuses();
    let status_text = if statuses.is_empty() {
        String::new()
    } else {
        let parts: Vec<String> = statuses
            .iter()
            .map(|s| format!("({} = '{}')", fields::STATUS, escape_soql(s)))
            .collect();
        format!(" AND ({})", parts.join(" OR "))
    };

    format!(
        "SELECT {},{},{} FROM {} WHERE {} = '{}'{} ORDER BY {} DESC LIMIT {}",
        fields::ID,
        fields::SUMMARY,
        fields::LAST_MODIFIED,
        TICKET_OBJECT,
        fields::QUEUE,
        escape_soql(queue),
        status_text,
        fields::LAST_MODIFIED,
        listing.limit()
    )
}

pub fn history_soql(ticket_id: &str) -> String {
    format!(
        "SELECT {},{},{},{} FROM {} WHERE {} = '{}' ORDER BY {} DESC",
        fields::ID,
        fields::HISTORY_NOTE,
        fields::HISTORY_USER,
        fields::HISTORY_ACTION,
        HISTORY_OBJECT,
        fields::HISTORY_INCIDENT,
        escape_soql(ticket_id),
        fields::LAST_MODIFIED
    )
}

pub fn launch_console_soql(ticket: &TicketRef) -> String {
    let (field, value) = ticket.field_and_value();
    format!(
        "SELECT {},{} FROM {} WHERE {} = '{}' LIMIT 1",
        field,
        fields::LAUNCH_CONSOLE,
        TICKET_OBJECT,
        field,
        escape_soql(value)
    )
}

/// The console link field holds an anchor (`<a href="..." target="...">`);
/// pull the href out of it.
pub fn console_url(anchor: &str) -> anyhow::Result<String> {
    let parts: Vec<&str> = anchor.split('"').collect();
    if parts.len() != 5 {
        anyhow::bail!("ticket URL was not in the format we expect");
    }
    Ok(parts[1].to_string())
}

static BREAK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</p\s*>|</div\s*>|</li\s*>").unwrap());
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").unwrap());

/// Character for an entity name (`amp`) or numeric reference (`#39`, `#x2019`).
/// Non-breaking spaces come out as plain spaces.
fn decode_entity(entity: &str) -> Option<char> {
    let decoded = match entity {
        "nbsp" => ' ',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "amp" => '&',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some(if decoded == '\u{A0}' { ' ' } else { decoded })
}

/// Flatten a rich text note to plain text
pub fn html_to_text(html: &str) -> String {
    let text = BREAK_TAG.replace_all(html, "\n");
    let text = ANY_TAG.replace_all(&text, "");
    // one pass, so `&amp;lt;` stays `&lt;`
    let text = ENTITY.replace_all(&text, |caps: &Captures| match decode_entity(&caps[1]) {
        Some(c) => c.to_string(),
        None => caps[0].to_string(),
    });
    BLANK_LINES.replace_all(text.trim(), "\n\n").into_owned()
}

const SEPARATOR: &str = "-----------------------------------------------------";

/// Full description block of one ticket
pub fn format_ticket(ticket: &Record) -> String {
    format!(
        "Id:  {}\nUser:  {}\nTicket Subject:  {}\n{SEPARATOR}\n{}\n{SEPARATOR}",
        field_text(ticket, fields::ID),
        field_text(ticket, fields::USER),
        field_text(ticket, fields::SUMMARY),
        field_text(ticket, fields::DESCRIPTION),
    )
}

/// One entry of a ticket's history
pub fn format_history(entry: &Record) -> String {
    format!(
        "Id:  {}\nUser:  {}\nAction:  {}\n{SEPARATOR}\n{}\n{SEPARATOR}",
        field_text(entry, fields::ID),
        field_text(entry, fields::HISTORY_USER),
        field_text(entry, fields::HISTORY_ACTION),
        html_to_text(&field_text(entry, fields::HISTORY_NOTE)),
    )
}

/// API timestamps (`2024-03-01T09:15:00.000+0000`) shortened to minutes
pub fn format_timestamp(value: &str) -> String {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| value.to_string())
}

/// Fixed-width table of a ticket listing
pub fn format_listing(tickets: &[Record]) -> String {
    if tickets.is_empty() {
        return "No tickets found".to_string();
    }

    let rows: Vec<[String; 3]> = tickets
        .iter()
        .map(|t| {
            [
                field_text(t, fields::ID),
                format_timestamp(&field_text(t, fields::LAST_MODIFIED)),
                field_text(t, fields::SUMMARY),
            ]
        })
        .collect();

    let headers = ["Id", "Last Modified", "Summary"];
    let id_width = rows.iter().map(|r| r[0].len()).max().unwrap_or(0).max(headers[0].len());
    let ts_width = rows.iter().map(|r| r[1].len()).max().unwrap_or(0).max(headers[1].len());

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!(
        "{:<id_width$}  {:<ts_width$}  {}",
        headers[0], headers[1], headers[2]
    ));
    lines.push(format!(
        "{}  {}  {}",
        "-".repeat(id_width),
        "-".repeat(ts_width),
        "-".repeat(headers[2].len())
    ));
    for [id, ts, summary] in rows {
        lines.push(format!("{:<id_width$}  {:<ts_width$}  {}", id, ts, summary));
    }
    lines.join("\n")
}
