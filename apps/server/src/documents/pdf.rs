//! Minimal PDF writer for policy version documents.
//!
//! Produces a PDF 1.4 file with one Helvetica text column, paginated at a
//! fixed number of lines. No layout engine is involved.

use eventcover_core::{
    details::{EventDetails, PolicyHolderDetails},
    documents::PolicyDocumentRenderer,
    policies::PolicySnapshot,
    premiums::coverage_limit,
    Result,
};

const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;
const MARGIN: u32 = 56;
const FONT_SIZE: u32 = 11;
const LINE_HEIGHT: u32 = 15;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LINE_HEIGHT) as usize;

/// Renders a policy snapshot as a plain text PDF.
#[derive(Debug, Clone, Default)]
pub struct TextPdfRenderer;

impl TextPdfRenderer {
    pub fn new() -> Self {
        Self
    }

    fn lines(snapshot: &PolicySnapshot) -> Vec<String> {
        let mut lines = vec![
            "Event Cover - Special Event Insurance Policy".to_string(),
            String::new(),
            format!("Policy number: {}", snapshot.policy.policy_number),
            format!(
                "Version captured: {} UTC",
                snapshot.captured_at.format("%Y-%m-%d %H:%M:%S")
            ),
        ];

        if let Some(quote) = &snapshot.quote {
            lines.push(format!("Quote number: {}", quote.quote_number));
            lines.push(format!("Email: {}", quote.email));
            lines.push(String::new());
            lines.push("Coverage".to_string());
            if let Some(level) = quote.coverage_level {
                let limit = coverage_limit(level)
                    .map(|limit| format!(" (limit ${})", limit))
                    .unwrap_or_default();
                lines.push(format!("  Coverage level: {}{}", level, limit));
            }
            lines.push(format!(
                "  Liability coverage: {}",
                quote.liability_coverage.as_deref().unwrap_or("none")
            ));
            lines.push(format!(
                "  Liquor liability: {}",
                if quote.liquor_liability { "yes" } else { "no" }
            ));
            lines.push(String::new());
            lines.push("Premium".to_string());
            lines.push(format!("  Base premium: ${}", quote.base_premium));
            lines.push(format!("  Liability premium: ${}", quote.liability_premium));
            lines.push(format!(
                "  Liquor liability premium: ${}",
                quote.liquor_liability_premium
            ));
            lines.push(format!("  Total premium: ${}", quote.total_premium));
        }

        if let Some(event) = &snapshot.event {
            lines.push(String::new());
            push_event(&mut lines, event);
        }
        if let Some(holder) = &snapshot.policy_holder {
            lines.push(String::new());
            push_policy_holder(&mut lines, holder);
        }
        lines
    }
}

fn push_field(lines: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        lines.push(format!("  {}: {}", label, value));
    }
}

fn push_event(lines: &mut Vec<String>, event: &EventDetails) {
    lines.push("Event".to_string());
    push_field(lines, "Type", event.event_type.as_deref());
    let date = event.event_date.map(|d| d.format("%Y-%m-%d").to_string());
    push_field(lines, "Date", date.as_deref());
    push_field(lines, "Guests", event.max_guests.as_deref());
    let honorees = [
        (&event.honoree1_first_name, &event.honoree1_last_name),
        (&event.honoree2_first_name, &event.honoree2_last_name),
    ];
    for (first, last) in honorees {
        let name = [first.as_deref(), last.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        push_field(lines, "Honoree", Some(name.as_str()));
    }

    if let Some(venue) = &event.venue {
        lines.push("Venue".to_string());
        push_field(lines, "Name", venue.name.as_deref());
        push_field(lines, "Address", venue.address1.as_deref());
        push_field(lines, "Address line 2", venue.address2.as_deref());
        let locality = [
            venue.city.as_deref(),
            venue.state.as_deref(),
            venue.zip.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");
        push_field(lines, "City", Some(locality.as_str()));
        push_field(lines, "Country", venue.country.as_deref());
        push_field(lines, "Location type", venue.location_type.as_deref());
        push_field(
            lines,
            "Ceremony location type",
            venue.ceremony_location_type.as_deref(),
        );
    }
}

fn push_policy_holder(lines: &mut Vec<String>, holder: &PolicyHolderDetails) {
    lines.push("Policy holder".to_string());
    let name = holder.full_name();
    push_field(lines, "Name", name.as_deref());
    push_field(lines, "Phone", holder.phone.as_deref());
    push_field(lines, "Relationship", holder.relationship.as_deref());
    push_field(lines, "Address", holder.address.as_deref());
    let locality = [
        holder.city.as_deref(),
        holder.state.as_deref(),
        holder.zip.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");
    push_field(lines, "City", Some(locality.as_str()));
    push_field(lines, "Country", holder.country.as_deref());
}

/// Escapes a line for a PDF literal string. Non-ASCII characters are
/// replaced because the standard Helvetica encoding cannot show them.
fn escape_pdf_text(line: &str) -> String {
    let mut escaped = String::with_capacity(line.len());
    for ch in line.chars() {
        match ch {
            '\\' | '(' | ')' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            ' '..='~' => escaped.push(ch),
            _ => escaped.push('?'),
        }
    }
    escaped
}

fn page_content(lines: &[String]) -> String {
    let mut content = format!(
        "BT\n/F1 {} Tf\n{} TL\n{} {} Td\n",
        FONT_SIZE,
        LINE_HEIGHT,
        MARGIN,
        PAGE_HEIGHT - MARGIN
    );
    for line in lines {
        content.push_str(&format!("({}) '\n", escape_pdf_text(line)));
    }
    content.push_str("ET\n");
    content
}

/// Assembles the PDF objects and cross-reference table.
fn write_pdf(lines: &[String]) -> Vec<u8> {
    let pages: Vec<&[String]> = if lines.is_empty() {
        vec![lines]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };

    // Objects 1 and 2 are the catalog and page tree, 3 is the font; each
    // page then takes two objects (page, content stream).
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + i * 2).collect();
    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            page_ids
                .iter()
                .map(|id| format!("{} 0 R", id))
                .collect::<Vec<_>>()
                .join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];
    for (page, page_id) in pages.iter().zip(&page_ids) {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            PAGE_WIDTH,
            PAGE_HEIGHT,
            page_id + 1
        ));
        let content = page_content(page);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", index + 1, object));
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for offset in offsets {
        out.push_str(&format!("{:010} 00000 n \n", offset));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));
    out.into_bytes()
}

impl PolicyDocumentRenderer for TextPdfRenderer {
    fn render(&self, snapshot: &PolicySnapshot) -> Result<Vec<u8>> {
        Ok(write_pdf(&Self::lines(snapshot)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use eventcover_core::policies::Policy;

    fn snapshot() -> PolicySnapshot {
        let at = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        PolicySnapshot {
            policy: Policy {
                id: "p1".to_string(),
                policy_number: "PI-123456".to_string(),
                quote_id: None,
                pdf_url: None,
                event: None,
                policy_holder: None,
                created_at: at,
                updated_at: at,
            },
            quote: None,
            event: Some(EventDetails {
                event_type: Some("Wedding (Smith)".to_string()),
                max_guests: Some("120".to_string()),
                ..Default::default()
            }),
            policy_holder: None,
            pdf_file_name: "policy_p1_1.pdf".to_string(),
            captured_at: at,
        }
    }

    #[test]
    fn test_renders_a_pdf_document() {
        let bytes = TextPdfRenderer::new().render(&snapshot()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("(Policy number: PI-123456) '"));
        assert!(text.contains("Wedding \\(Smith\\)"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let bytes = TextPdfRenderer::new().render(&snapshot()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let xref_start = text.find("xref\n").unwrap();
        let entries: Vec<usize> = text[xref_start..]
            .lines()
            .skip(3)
            .take_while(|line| line.ends_with(" n "))
            .map(|line| line[..10].parse().unwrap())
            .collect();

        assert_eq!(entries.len(), 5);
        for (index, offset) in entries.iter().enumerate() {
            assert!(text[*offset..].starts_with(&format!("{} 0 obj", index + 1)));
        }
    }

    #[test]
    fn test_long_documents_paginate() {
        let lines: Vec<String> = (0..LINES_PER_PAGE + 5).map(|i| format!("line {}", i)).collect();
        let text = String::from_utf8(write_pdf(&lines)).unwrap();
        assert!(text.contains("/Count 2"));
    }

    #[test]
    fn test_escape_replaces_non_ascii() {
        assert_eq!(escape_pdf_text("Café (a\\b)"), "Caf? \\(a\\\\b\\)");
    }
}
