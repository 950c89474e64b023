// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw-fragment extraction from delivery documents.
//!
//! The aggregator's deliveries mix elements from every operator; only the
//! configured operator's elements are forwarded. Matching is on a direct
//! child's text, the equivalent of `//Element[Child/text() = value]`, and
//! the matched element is returned as its original byte slice so the
//! downstream queue carries untouched XML.

use anyhow::Context;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Select every `element` whose direct child `ref_child` has text `value`.
pub fn extract_matching(
    xml: &str,
    element: &str,
    ref_child: &str,
    value: &str,
) -> anyhow::Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut out = Vec::new();

    // State while inside a candidate element.
    let mut in_element = false;
    let mut start = 0usize;
    let mut depth = 0usize;
    let mut in_ref = false;
    let mut matched = false;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event_into(&mut buf).context("malformed SIRI document")?;
        match event {
            Event::Start(ref e) => {
                let name = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                if in_element {
                    depth += 1;
                    in_ref = depth == 1 && name == ref_child;
                } else if name == element {
                    in_element = true;
                    start = before;
                    depth = 0;
                    in_ref = false;
                    matched = false;
                }
            }
            Event::Text(ref e) => {
                if in_element && in_ref {
                    let text = e.unescape().context("malformed SIRI document")?;
                    if text.trim() == value {
                        matched = true;
                    }
                }
            }
            Event::End(ref e) => {
                if in_element {
                    let name =
                        String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                    if depth == 0 && name == element {
                        let end = reader.buffer_position() as usize;
                        if matched {
                            out.push(xml[start..end].to_owned());
                        }
                        in_element = false;
                    } else {
                        in_ref = false;
                        depth = depth.saturating_sub(1);
                    }
                }
            }
            Event::Eof => break,
            _ => {
                in_ref = false;
            }
        }
        buf.clear();
    }

    Ok(out)
}
