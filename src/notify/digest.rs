// src/notify/digest.rs
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};

use super::OutgoingMail;
use crate::store::BidAlert;

pub const DIGEST_SUBJECT: &str = "New Relevant Bids Alert";

fn fmt_date(d: &DateTime<Utc>) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn render_bid(out: &mut String, bid: &BidAlert) {
    // `write!` into a String cannot fail.
    let _ = write!(
        out,
        r#"<div style="margin-bottom: 20px; padding: 15px; border: 1px solid #ddd; border-radius: 5px;">
<h3 style="color: #2563eb;">{title}</h3>
<p><strong>Source:</strong> {source}</p>
<p><strong>Category:</strong> {category}</p>
<p><strong>Services:</strong> {services}</p>
<p><strong>Published:</strong> {published}</p>
"#,
        title = encode_text(&bid.title),
        source = encode_text(&bid.source),
        category = bid.bid_category,
        services = encode_text(&bid.services.join(", ")),
        published = fmt_date(&bid.publish_date),
    );
    if let Some(closing) = &bid.closing_date {
        let _ = writeln!(
            out,
            "<p><strong>Closing Date:</strong> {}</p>",
            fmt_date(closing)
        );
    }
    if let Some(desc) = bid.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let _ = writeln!(
            out,
            "<p><strong>Description:</strong> {}</p>",
            encode_text(desc)
        );
    }
    let _ = writeln!(
        out,
        r#"<a href="{}" style="display: inline-block; margin-top: 10px; padding: 8px 15px; background-color: #2563eb; color: white; text-decoration: none; border-radius: 5px;">View Bid</a>
</div>"#,
        encode_double_quoted_attribute(&bid.url)
    );
}

/// HTML body listing every bid in `bids`.
pub fn render_html(bids: &[BidAlert]) -> String {
    let mut out = String::from(
        "<h2>New Relevant Bids Found</h2>\n\
         <p>The following bids matching your services have been identified:</p>\n",
    );
    for b in bids {
        render_bid(&mut out, b);
    }
    out
}

pub fn build_digest(recipient: &str, bids: &[BidAlert]) -> OutgoingMail {
    OutgoingMail {
        to: recipient.to_string(),
        subject: DIGEST_SUBJECT.to_string(),
        html_body: render_html(bids),
    }
}
