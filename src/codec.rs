//! XML wire format for [`Envelope`].
//!
//! Decoding matches elements by local name and ignores anything outside the
//! schema. Encoding is deterministic: fixed prefixes, fixed leaf order and
//! one-space indentation, so re-encoding a decoded document is reproducible.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::RelayError;
use crate::model::Envelope;

const ENVELOPE: &str = "Envelope";
const HEADER: &str = "Header";
const BODY: &str = "Body";
const QUERY_RESULT: &str = "C2BPaymentQueryResult";

const ENVELOPE_TAG: &str = "soapenv:Envelope";
const HEADER_TAG: &str = "soapenv:Header";
const BODY_TAG: &str = "soapenv:Body";
const QUERY_RESULT_TAG: &str = "c2b:C2BPaymentQueryResult";

/// Decode an XML document into an [`Envelope`].
///
/// Reading stops once the root element closes; trailing content is ignored.
pub fn decode(xml: &[u8]) -> Result<Envelope, RelayError> {
    let text = std::str::from_utf8(xml)
        .map_err(|e| RelayError::MalformedXml(format!("invalid UTF-8: {e}")))?;

    let mut reader = Reader::from_str(text);
    let mut envelope = Envelope::default();
    let mut path: Vec<String> = Vec::new();
    let mut seen_root = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| RelayError::MalformedXml(e.to_string()))?;

        match event {
            Event::Start(start) => {
                let name = open_element(&mut envelope, &path, &start)?;
                seen_root = true;
                path.push(name);
            }
            Event::Empty(start) => {
                open_element(&mut envelope, &path, &start)?;
                seen_root = true;
                if path.is_empty() {
                    break;
                }
            }
            Event::End(_) => {
                path.pop();
                if path.is_empty() {
                    break;
                }
            }
            Event::Text(content) => {
                let value = content
                    .unescape()
                    .map_err(|e| RelayError::MalformedXml(e.to_string()))?;
                append_text(&mut envelope, &path, &value);
            }
            Event::CData(content) => {
                let value = std::str::from_utf8(&content)
                    .map_err(|e| RelayError::MalformedXml(format!("invalid UTF-8: {e}")))?;
                append_text(&mut envelope, &path, value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(RelayError::MalformedXml("empty document".into()));
    }
    if let Some(open) = path.last() {
        return Err(RelayError::MalformedXml(format!(
            "unexpected end of document: <{open}> not closed"
        )));
    }

    Ok(envelope)
}

/// Encode an [`Envelope`] as an indented XML document.
///
/// A prefix is only used when its namespace URI is known. An empty namespace
/// field leaves the matching elements unprefixed and undeclared, since
/// `xmlns:p=""` is not allowed.
pub fn encode(envelope: &Envelope) -> Result<Vec<u8>, RelayError> {
    let soapenv_bound = !envelope.soapenv.is_empty();
    let c2b_bound = !envelope.c2b.is_empty();
    let envelope_tag = tag(soapenv_bound, ENVELOPE_TAG, ENVELOPE);
    let header_tag = tag(soapenv_bound, HEADER_TAG, HEADER);
    let body_tag = tag(soapenv_bound, BODY_TAG, BODY);
    let query_result_tag = tag(c2b_bound, QUERY_RESULT_TAG, QUERY_RESULT);

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);

    let mut root = BytesStart::new(envelope_tag);
    if soapenv_bound {
        root.push_attribute(("xmlns:soapenv", envelope.soapenv.as_str()));
    }
    if c2b_bound {
        root.push_attribute(("xmlns:c2b", envelope.c2b.as_str()));
    }
    write(&mut writer, Event::Start(root))?;

    if envelope.header.is_empty() {
        write(&mut writer, Event::Empty(BytesStart::new(header_tag)))?;
    } else {
        write_leaf(&mut writer, header_tag, &envelope.header)?;
    }

    write(&mut writer, Event::Start(BytesStart::new(body_tag)))?;
    write(&mut writer, Event::Start(BytesStart::new(query_result_tag)))?;
    for (name, value) in envelope.message().fields() {
        write_leaf(&mut writer, name, value)?;
    }
    write(&mut writer, Event::End(BytesEnd::new(query_result_tag)))?;
    write(&mut writer, Event::End(BytesEnd::new(body_tag)))?;
    write(&mut writer, Event::End(BytesEnd::new(envelope_tag)))?;

    Ok(writer.into_inner())
}

fn tag(bound: bool, prefixed: &'static str, local: &'static str) -> &'static str {
    if bound {
        prefixed
    } else {
        local
    }
}

/// Validate an opening tag against its position and return its local name.
fn open_element(
    envelope: &mut Envelope,
    path: &[String],
    start: &BytesStart<'_>,
) -> Result<String, RelayError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

    if path.is_empty() {
        if name != ENVELOPE {
            return Err(RelayError::MalformedXml(format!(
                "expected element type <{ENVELOPE}> but have <{name}>"
            )));
        }
        read_namespaces(envelope, start)?;
    }

    // a repeated leaf replaces the earlier value
    if is_leaf_parent(path) {
        if let Some(field) = envelope.body.payment_query_result.field_mut(&name) {
            field.clear();
        }
    } else if path.len() == 1 && name == HEADER {
        envelope.header.clear();
    }

    Ok(name)
}

fn read_namespaces(envelope: &mut Envelope, start: &BytesStart<'_>) -> Result<(), RelayError> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| RelayError::MalformedXml(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| RelayError::MalformedXml(e.to_string()))?;
        match attr.key.local_name().as_ref() {
            b"soapenv" => envelope.soapenv = value.into_owned(),
            b"c2b" => envelope.c2b = value.into_owned(),
            _ => {}
        }
    }
    Ok(())
}

fn is_leaf_parent(path: &[String]) -> bool {
    matches!(path, [root, body, result] if root == ENVELOPE && body == BODY && result == QUERY_RESULT)
}

fn append_text(envelope: &mut Envelope, path: &[String], value: &str) {
    match path {
        [root, header] if root == ENVELOPE && header == HEADER => {
            envelope.header.push_str(value);
        }
        [parent @ .., leaf] if is_leaf_parent(parent) => {
            if let Some(field) = envelope.body.payment_query_result.field_mut(leaf) {
                field.push_str(value);
            }
        }
        _ => {}
    }
}

fn write_leaf(writer: &mut Writer<Vec<u8>>, name: &str, value: &str) -> Result<(), RelayError> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(value)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), RelayError> {
    writer
        .write_event(event)
        .map_err(|e| RelayError::MalformedXml(format!("encode: {e}")))
}

#[cfg(test)]
mod tests {
    use quick_xml::name::ResolveResult;
    use quick_xml::reader::NsReader;
    use rand::Rng;
    use rand::seq::SliceRandom;

    use super::*;
    use crate::model::PaymentQueryMessage;
    use crate::model::envelope::{C2B_NAMESPACE, SOAPENV_NAMESPACE};

    const SAMPLE: &str = r#"
<soapenv:Envelope
xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"
xmlns:c2b="http://cps.huawei.com/cpsinterface/c2bpayment">
<soapenv:Header/>
<soapenv:Body>
<c2b:C2BPaymentQueryResult>
<ResultCode>2</ResultCode>
<ResultDesc>Failed</ResultDesc>
<TransID>10111</TransID>
<BillRefNumber>12233</BillRefNumber>
<UtilityName>sddd</UtilityName>
<CustomerName>wee</CustomerName>
<Amount>30</Amount>
</c2b:C2BPaymentQueryResult>
</soapenv:Body>
</soapenv:Envelope>"#;

    fn sample_message() -> PaymentQueryMessage {
        PaymentQueryMessage {
            result_code: "2".into(),
            result_desc: "Failed".into(),
            transaction_id: "10111".into(),
            bill_reference_number: "12233".into(),
            utility_name: "sddd".into(),
            customer_name: "wee".into(),
            amount: "30".into(),
        }
    }

    fn trimmed_lines(xml: &[u8]) -> Vec<String> {
        String::from_utf8(xml.to_vec())
            .unwrap()
            .lines()
            .map(|line| line.trim().to_string())
            .collect()
    }

    #[test]
    fn test_decode_sample() {
        let envelope = decode(SAMPLE.as_bytes()).unwrap();
        assert_eq!(envelope.soapenv, SOAPENV_NAMESPACE);
        assert_eq!(envelope.c2b, C2B_NAMESPACE);
        assert_eq!(envelope.header, "");
        assert_eq!(envelope.message(), &sample_message());
    }

    #[test]
    fn test_encode_layout() {
        let xml = encode(&Envelope::new(sample_message())).unwrap();
        let lines = trimmed_lines(&xml);
        assert_eq!(
            lines,
            vec![
                format!(
                    r#"<soapenv:Envelope xmlns:soapenv="{SOAPENV_NAMESPACE}" xmlns:c2b="{C2B_NAMESPACE}">"#
                ),
                "<soapenv:Header/>".to_string(),
                "<soapenv:Body>".to_string(),
                "<c2b:C2BPaymentQueryResult>".to_string(),
                "<ResultCode>2</ResultCode>".to_string(),
                "<ResultDesc>Failed</ResultDesc>".to_string(),
                "<TransID>10111</TransID>".to_string(),
                "<BillRefNumber>12233</BillRefNumber>".to_string(),
                "<UtilityName>sddd</UtilityName>".to_string(),
                "<CustomerName>wee</CustomerName>".to_string(),
                "<Amount>30</Amount>".to_string(),
                "</c2b:C2BPaymentQueryResult>".to_string(),
                "</soapenv:Body>".to_string(),
                "</soapenv:Envelope>".to_string(),
            ]
        );
    }

    #[test]
    fn test_reencode_matches_source_up_to_whitespace() {
        let reencoded = encode(&decode(SAMPLE.as_bytes()).unwrap()).unwrap();
        let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(
            normalize(std::str::from_utf8(&reencoded).unwrap()),
            normalize(SAMPLE)
        );
    }

    #[test]
    fn test_reencode_is_deterministic() {
        let first = encode(&decode(SAMPLE.as_bytes()).unwrap()).unwrap();
        let second = encode(&decode(&first).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_values_carried_verbatim() {
        let message = PaymentQueryMessage {
            result_code: " 0 ".into(),
            result_desc: "Paid <in full> & \"settled\"".into(),
            customer_name: "O'Brien\nJr".into(),
            amount: "1,000.50 KES".into(),
            ..Default::default()
        };
        let xml = encode(&Envelope::new(message.clone())).unwrap();
        let decoded = decode(&xml).unwrap();
        assert_eq!(decoded.message(), &message);
    }

    #[test]
    fn test_unknown_elements_ignored() {
        let xml = r#"<soapenv:Envelope xmlns:soapenv="urn:s" xmlns:c2b="urn:c">
            <soapenv:Header><Trace>abc</Trace></soapenv:Header>
            <soapenv:Body>
                <Extra>ignored</Extra>
                <c2b:C2BPaymentQueryResult>
                    <TransID>10111</TransID>
                    <Currency>KES</Currency>
                    <Amount>30</Amount>
                </c2b:C2BPaymentQueryResult>
            </soapenv:Body>
        </soapenv:Envelope>"#;
        let envelope = decode(xml.as_bytes()).unwrap();
        assert_eq!(envelope.soapenv, "urn:s");
        assert_eq!(envelope.c2b, "urn:c");
        assert_eq!(envelope.message().transaction_id, "10111");
        assert_eq!(envelope.message().amount, "30");
        assert_eq!(envelope.message().result_code, "");
    }

    #[test]
    fn test_unprefixed_document() {
        let xml = "<Envelope><Body><C2BPaymentQueryResult><Amount>5</Amount>\
                   </C2BPaymentQueryResult></Body></Envelope>";
        let envelope = decode(xml.as_bytes()).unwrap();
        assert_eq!(envelope.message().amount, "5");
        assert_eq!(envelope.soapenv, "");
    }

    #[test]
    fn test_repeated_leaf_last_wins() {
        let xml = "<Envelope><Body><C2BPaymentQueryResult>\
                   <Amount>5</Amount><Amount>7</Amount>\
                   </C2BPaymentQueryResult></Body></Envelope>";
        let envelope = decode(xml.as_bytes()).unwrap();
        assert_eq!(envelope.message().amount, "7");
    }

    #[test]
    fn test_cdata_leaf() {
        let xml = "<Envelope><Body><C2BPaymentQueryResult>\
                   <CustomerName><![CDATA[A & B]]></CustomerName>\
                   </C2BPaymentQueryResult></Body></Envelope>";
        let envelope = decode(xml.as_bytes()).unwrap();
        assert_eq!(envelope.message().customer_name, "A & B");
    }

    #[test]
    fn test_header_text_round_trips() {
        let mut envelope = Envelope::new(sample_message());
        envelope.header = "trace-1".into();
        let xml = encode(&envelope).unwrap();
        assert!(trimmed_lines(&xml).contains(&"<soapenv:Header>trace-1</soapenv:Header>".to_string()));
        assert_eq!(decode(&xml).unwrap(), envelope);
    }

    #[test]
    fn test_trailing_content_after_root_ignored() {
        let xml = "<Envelope><Body/></Envelope><Other/>";
        assert!(decode(xml.as_bytes()).is_ok());
    }

    #[test]
    fn test_unexpected_root() {
        let err = decode(b"<Message><Body/></Message>").unwrap_err();
        assert!(matches!(err, RelayError::MalformedXml(_)));
        assert!(err.to_string().contains("<Envelope>"));
    }

    #[test]
    fn test_truncated_document() {
        let truncated = &SAMPLE.as_bytes()[..SAMPLE.len() / 2];
        let err = decode(truncated).unwrap_err();
        assert!(matches!(err, RelayError::MalformedXml(_)));
    }

    #[test]
    fn test_unclosed_root() {
        let err = decode(b"<Envelope><Body></Body>").unwrap_err();
        assert!(matches!(err, RelayError::MalformedXml(_)));
    }

    #[test]
    fn test_mismatched_end_tag() {
        let err = decode(b"<Envelope><Body></Header></Envelope>").unwrap_err();
        assert!(matches!(err, RelayError::MalformedXml(_)));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = decode(&[b'<', 0xff, 0xfe, b'>']).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(decode(b""), Err(RelayError::MalformedXml(_))));
        assert!(matches!(decode(b"   \n"), Err(RelayError::MalformedXml(_))));
    }

    /// Every prefix resolves and no namespace binding is empty.
    fn assert_namespace_well_formed(xml: &[u8]) {
        let mut reader = NsReader::from_str(std::str::from_utf8(xml).unwrap());
        loop {
            match reader.read_resolved_event().unwrap() {
                (ResolveResult::Unknown(prefix), _) => {
                    panic!("undeclared prefix {}", String::from_utf8_lossy(&prefix))
                }
                (_, Event::Start(e) | Event::Empty(e)) => {
                    for attr in e.attributes() {
                        let attr = attr.unwrap();
                        if attr.key.as_namespace_binding().is_some() {
                            assert!(!attr.value.is_empty(), "empty namespace binding");
                        }
                    }
                }
                (_, Event::Eof) => break,
                _ => {}
            }
        }
    }

    #[test]
    fn test_missing_namespaces_encode_unprefixed() {
        let xml = "<Envelope><Body><C2BPaymentQueryResult><Amount>5</Amount>\
                   </C2BPaymentQueryResult></Body></Envelope>";
        let envelope = decode(xml.as_bytes()).unwrap();
        let encoded = encode(&envelope).unwrap();

        assert_namespace_well_formed(&encoded);
        let text = std::str::from_utf8(&encoded).unwrap();
        assert!(!text.contains("xmlns"));
        assert!(text.starts_with("<Envelope>"));
        assert!(text.contains("<C2BPaymentQueryResult>"));
        assert_eq!(decode(&encoded).unwrap(), envelope);
    }

    #[test]
    fn test_one_missing_namespace() {
        let mut envelope = Envelope::new(sample_message());
        envelope.c2b.clear();
        let encoded = encode(&envelope).unwrap();

        assert_namespace_well_formed(&encoded);
        let text = std::str::from_utf8(&encoded).unwrap();
        assert!(text.contains(r#"xmlns:soapenv=""#));
        assert!(!text.contains("xmlns:c2b"));
        assert!(text.contains("<soapenv:Body>"));
        assert!(text.contains("<C2BPaymentQueryResult>"));
        assert_eq!(decode(&encoded).unwrap(), envelope);
    }

    #[test]
    fn test_sample_is_namespace_well_formed() {
        let encoded = encode(&decode(SAMPLE.as_bytes()).unwrap()).unwrap();
        assert_namespace_well_formed(&encoded);
    }

    #[test]
    fn test_random_values_survive_reencode() {
        const ALPHABET: &[char] = &[
            'a', 'Z', '0', '9', ' ', '\n', '\t', '<', '>', '&', '\'', '"', ';', '#', ']', 'é', '中',
        ];
        const NAMESPACES: &[&str] = &["", SOAPENV_NAMESPACE, C2B_NAMESPACE, "urn:a&b"];

        fn random_text(rng: &mut impl Rng) -> String {
            let len = rng.gen_range(0..=12);
            (0..len).map(|_| *ALPHABET.choose(rng).unwrap()).collect()
        }

        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let mut message = PaymentQueryMessage::default();
            for name in PaymentQueryMessage::FIELDS {
                *message.field_mut(name).unwrap() = random_text(&mut rng);
            }
            let mut envelope = Envelope::new(message);
            envelope.soapenv = NAMESPACES.choose(&mut rng).unwrap().to_string();
            envelope.c2b = NAMESPACES.choose(&mut rng).unwrap().to_string();
            envelope.header = random_text(&mut rng);

            let encoded = encode(&envelope).unwrap();
            assert_namespace_well_formed(&encoded);
            assert_eq!(decode(&encoded).unwrap(), envelope);
        }
    }
}
