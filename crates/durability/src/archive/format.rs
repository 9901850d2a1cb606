//! XML encoding of the archive
//!
//! Encoding drives a [`quick_xml::Writer`] directly so text content can be
//! escaped exactly:
//! - characters XML 1.0 does not allow are replaced with U+FFFD
//! - whitespace at either end of a value and every `\r` become character
//!   references, which survive the reader's whitespace trimming
//!
//! Decoding goes through serde.

use std::borrow::Cow;
use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use orderarchive_core::{Archive, Order, Product};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Deserialize;
use tracing::warn;

use crate::error::{DurabilityError, DurabilityResult};

const ORDERS_TAG: &str = "orders";
const ORDER_TAG: &str = "order";
const UID_TAG: &str = "uid";
const DATE_TAG: &str = "date";
const PRODUCTS_TAG: &str = "products";
const PRODUCT_TAG: &str = "product";
const CODE_TAG: &str = "code";
const AMOUNT_TAG: &str = "amount";

#[derive(Debug, Deserialize)]
#[serde(rename = "orders")]
struct XmlOrders {
    #[serde(rename = "order", default)]
    orders: Vec<XmlOrder>,
}

#[derive(Debug, Deserialize)]
struct XmlOrder {
    uid: String,
    date: String,
    #[serde(default)]
    products: XmlProducts,
}

#[derive(Debug, Default, Deserialize)]
struct XmlProducts {
    #[serde(rename = "product", default)]
    products: Vec<XmlProduct>,
}

#[derive(Debug, Deserialize)]
struct XmlProduct {
    code: String,
    amount: i64,
}

fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_date(raw: &str) -> DurabilityResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| DurabilityError::Decode(format!("invalid date '{}': {}", raw, e)))
}

impl TryFrom<XmlOrder> for Order {
    type Error = DurabilityError;

    fn try_from(xml: XmlOrder) -> DurabilityResult<Self> {
        let date = parse_date(&xml.date)?;
        let products = xml
            .products
            .products
            .into_iter()
            .map(|p| Product::new(p.code, p.amount))
            .collect();
        Ok(Order::new(xml.uid, date, products))
    }
}

/// Characters allowed in an XML 1.0 document
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Whitespace the reader trims from text content
fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Escape `raw` for use as element text
///
/// Returns the escaped text and the number of characters replaced with
/// U+FFFD.
fn escape_text(raw: &str) -> (Cow<'_, str>, usize) {
    let needs_work = raw.starts_with(is_xml_whitespace)
        || raw.ends_with(is_xml_whitespace)
        || raw
            .chars()
            .any(|c| matches!(c, '<' | '>' | '&' | '\r') || !is_xml_char(c));
    if !needs_work {
        return (Cow::Borrowed(raw), 0);
    }

    let lead = raw.len() - raw.trim_start_matches(is_xml_whitespace).len();
    let tail = raw.trim_end_matches(is_xml_whitespace).len().max(lead);

    let mut out = String::with_capacity(raw.len() + 16);
    let mut replaced = 0;
    for (pos, c) in raw.char_indices() {
        let edge = pos < lead || pos >= tail;
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            c if c == '\r' || (edge && is_xml_whitespace(c)) => {
                // writing to a String cannot fail
                let _ = write!(out, "&#x{:X};", c as u32);
            }
            c if !is_xml_char(c) => {
                out.push(char::REPLACEMENT_CHARACTER);
                replaced += 1;
            }
            c => out.push(c),
        }
    }
    (Cow::Owned(out), replaced)
}

struct ArchiveWriter {
    writer: Writer<Vec<u8>>,
    replaced: usize,
}

impl ArchiveWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            replaced: 0,
        }
    }

    fn event(&mut self, event: Event<'_>) -> DurabilityResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| DurabilityError::Encode(e.to_string()))
    }

    fn start(&mut self, tag: &str) -> DurabilityResult<()> {
        self.event(Event::Start(BytesStart::new(tag)))
    }

    fn end(&mut self, tag: &str) -> DurabilityResult<()> {
        self.event(Event::End(BytesEnd::new(tag)))
    }

    /// `<tag>text</tag>`; an empty value is written as `<tag></tag>`
    fn text_element(&mut self, tag: &str, text: &str) -> DurabilityResult<()> {
        self.start(tag)?;
        let (escaped, replaced) = escape_text(text);
        self.replaced += replaced;
        if !escaped.is_empty() {
            self.event(Event::Text(BytesText::from_escaped(escaped)))?;
        }
        self.end(tag)
    }

    fn order(&mut self, order: &Order) -> DurabilityResult<()> {
        self.start(ORDER_TAG)?;
        self.text_element(UID_TAG, order.uid())?;
        self.text_element(DATE_TAG, &format_date(order.date()))?;
        if order.products().is_empty() {
            self.event(Event::Empty(BytesStart::new(PRODUCTS_TAG)))?;
        } else {
            self.start(PRODUCTS_TAG)?;
            for product in order.products() {
                self.start(PRODUCT_TAG)?;
                self.text_element(CODE_TAG, &product.id)?;
                self.text_element(AMOUNT_TAG, &product.amount.to_string())?;
                self.end(PRODUCT_TAG)?;
            }
            self.end(PRODUCTS_TAG)?;
        }
        self.end(ORDER_TAG)
    }

    fn finish(self) -> Vec<u8> {
        if self.replaced > 0 {
            warn!(
                replaced = self.replaced,
                "Replaced characters not allowed in XML with U+FFFD"
            );
        }
        self.writer.into_inner()
    }
}

/// Serialize an archive to its XML bytes
pub fn encode_archive(archive: &Archive) -> DurabilityResult<Vec<u8>> {
    let mut out = ArchiveWriter::new();
    if archive.is_empty() {
        out.event(Event::Empty(BytesStart::new(ORDERS_TAG)))?;
        return Ok(out.finish());
    }
    out.start(ORDERS_TAG)?;
    for order in archive.orders() {
        out.order(order)?;
    }
    out.end(ORDERS_TAG)?;
    Ok(out.finish())
}

/// Parse archive XML bytes
pub fn decode_archive(bytes: &[u8]) -> DurabilityResult<Archive> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| DurabilityError::Decode(format!("archive is not UTF-8: {}", e)))?;
    let doc: XmlOrders =
        quick_xml::de::from_str(text).map_err(|e| DurabilityError::Decode(e.to_string()))?;

    let orders = doc
        .orders
        .into_iter()
        .map(Order::try_from)
        .collect::<DurabilityResult<Vec<_>>>()?;
    Ok(Archive::new(orders))
}

/// xxh3 checksum of archive bytes as lowercase hex
pub fn xxh3_hex(bytes: &[u8]) -> String {
    format!("{:016x}", xxhash_rust::xxh3::xxh3_64(bytes))
}
