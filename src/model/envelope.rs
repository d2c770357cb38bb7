use serde::{Deserialize, Serialize};

/// Namespace URI conventionally bound to the `soapenv` prefix.
pub const SOAPENV_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
/// Namespace URI conventionally bound to the `c2b` prefix.
pub const C2B_NAMESPACE: &str = "http://cps.huawei.com/cpsinterface/c2bpayment";

/// Payment-query result carried end-to-end.
///
/// Every field is opaque text and travels verbatim: nothing is parsed,
/// trimmed or validated. JSON keys match the XML leaf names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentQueryMessage {
    #[serde(rename = "ResultCode")]
    pub result_code: String,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
    #[serde(rename = "TransID")]
    pub transaction_id: String,
    #[serde(rename = "BillRefNumber")]
    pub bill_reference_number: String,
    #[serde(rename = "UtilityName")]
    pub utility_name: String,
    #[serde(rename = "CustomerName")]
    pub customer_name: String,
    #[serde(rename = "Amount")]
    pub amount: String,
}

impl PaymentQueryMessage {
    /// Leaf element names in wire order.
    pub const FIELDS: [&'static str; 7] = [
        "ResultCode",
        "ResultDesc",
        "TransID",
        "BillRefNumber",
        "UtilityName",
        "CustomerName",
        "Amount",
    ];

    /// Fields paired with their leaf names, in wire order.
    pub fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("ResultCode", self.result_code.as_str()),
            ("ResultDesc", self.result_desc.as_str()),
            ("TransID", self.transaction_id.as_str()),
            ("BillRefNumber", self.bill_reference_number.as_str()),
            ("UtilityName", self.utility_name.as_str()),
            ("CustomerName", self.customer_name.as_str()),
            ("Amount", self.amount.as_str()),
        ]
    }

    /// Mutable slot for a leaf name, `None` for names outside the schema.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "ResultCode" => Some(&mut self.result_code),
            "ResultDesc" => Some(&mut self.result_desc),
            "TransID" => Some(&mut self.transaction_id),
            "BillRefNumber" => Some(&mut self.bill_reference_number),
            "UtilityName" => Some(&mut self.utility_name),
            "CustomerName" => Some(&mut self.customer_name),
            "Amount" => Some(&mut self.amount),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Body {
    #[serde(rename = "C2BPaymentQueryResult")]
    pub payment_query_result: PaymentQueryMessage,
}

/// SOAP-style envelope: namespace declarations, an empty header and a body
/// holding exactly one [`PaymentQueryMessage`].
///
/// The namespace fields hold the URIs declared on the root element. They are
/// not interpreted, only carried so the document shape survives a
/// decode/encode cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    #[serde(rename = "Soapenv")]
    pub soapenv: String,
    #[serde(rename = "C2b")]
    pub c2b: String,
    #[serde(rename = "Header")]
    pub header: String,
    #[serde(rename = "Body")]
    pub body: Body,
}

impl Envelope {
    /// Wrap a message with the standard namespace URIs and an empty header.
    pub fn new(message: PaymentQueryMessage) -> Self {
        Self {
            soapenv: SOAPENV_NAMESPACE.to_string(),
            c2b: C2B_NAMESPACE.to_string(),
            header: String::new(),
            body: Body {
                payment_query_result: message,
            },
        }
    }

    pub fn message(&self) -> &PaymentQueryMessage {
        &self.body.payment_query_result
    }
}
