use super::money::Money;
use crate::error::{Result, SwitchError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Header names are stored lower-cased.
pub type Headers = BTreeMap<String, String>;

pub const HEADER_DATE: &str = "date";
pub const HEADER_SOURCE: &str = "fspiop-source";
pub const HEADER_DESTINATION: &str = "fspiop-destination";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_ACCEPT: &str = "accept";

pub const QUOTES_MEDIA_TYPE: &str = "application/vnd.interoperability.quotes+json;version=1.0";
pub const TRANSFERS_MEDIA_TYPE: &str =
    "application/vnd.interoperability.transfers+json;version=1.0";

/// The discriminant of a protocol message, decided once at the transport
/// boundary from its method and path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    QuotePost,
    QuotePut,
    QuoteError,
    QuoteGet,
    TransferPost,
    TransferPut,
    TransferError,
    TransferGet,
}

impl MessageKind {
    /// Parses one of the protocol routes, returning the kind and the path
    /// object id when the route carries one.
    pub fn from_route(method: &str, path: &str) -> Result<(Self, Option<String>)> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let method = method.to_ascii_uppercase();

        let kind = match (method.as_str(), segments.as_slice()) {
            ("POST", ["quotes"]) => return Ok((MessageKind::QuotePost, None)),
            ("POST", ["transfers"]) => return Ok((MessageKind::TransferPost, None)),
            ("PUT", ["quotes", _]) => MessageKind::QuotePut,
            ("PUT", ["quotes", _, "error"]) => MessageKind::QuoteError,
            ("GET", ["quotes", _]) => MessageKind::QuoteGet,
            ("PUT", ["transfers", _]) => MessageKind::TransferPut,
            ("PUT", ["transfers", _, "error"]) => MessageKind::TransferError,
            ("GET", ["transfers", _]) => MessageKind::TransferGet,
            _ => {
                return Err(SwitchError::InvalidMessage(format!(
                    "unsupported route {method} {path}"
                )));
            }
        };

        let id = segments[1];
        if id.is_empty() {
            return Err(SwitchError::InvalidMessage(format!(
                "empty object id in {method} {path}"
            )));
        }
        Ok((kind, Some(id.to_string())))
    }

    pub fn method(&self) -> &'static str {
        match self {
            MessageKind::QuotePost | MessageKind::TransferPost => "POST",
            MessageKind::QuoteGet | MessageKind::TransferGet => "GET",
            _ => "PUT",
        }
    }

    pub fn path(&self, object_id: Option<&str>) -> String {
        let id = object_id.unwrap_or_default();
        match self {
            MessageKind::QuotePost => "/quotes".to_string(),
            MessageKind::TransferPost => "/transfers".to_string(),
            MessageKind::QuotePut | MessageKind::QuoteGet => format!("/quotes/{id}"),
            MessageKind::QuoteError => format!("/quotes/{id}/error"),
            MessageKind::TransferPut | MessageKind::TransferGet => format!("/transfers/{id}"),
            MessageKind::TransferError => format!("/transfers/{id}/error"),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path(Some("{id}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionList {
    pub extension: Vec<Extension>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyIdInfo {
    pub party_id_type: String,
    pub party_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_sub_id_or_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fsp_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub party_id_info: PartyIdInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_classification_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionType {
    pub scenario: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_scenario: Option<String>,
    pub initiator: String,
    pub initiator_type: String,
}

/// Body of `POST /quotes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotesPostRequest {
    pub quote_id: String,
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_currency: Option<String>,
    pub payee: Party,
    pub payer: Party,
    pub amount_type: String,
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<Money>,
    pub transaction_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_list: Option<ExtensionList>,
}

impl QuotesPostRequest {
    /// The payee address the quote must be routed towards.
    pub fn payee_address(&self) -> &str {
        self.payee
            .party_id_info
            .party_sub_id_or_type
            .as_deref()
            .unwrap_or_default()
    }
}

/// Body of `PUT /quotes/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotesIdPutResponse {
    pub transfer_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee_receive_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee_fsp_fee: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee_fsp_commission: Option<Money>,
    pub expiration: String,
    pub ilp_packet: String,
    pub condition: String,
    /// FSP that will receive the transfer for this quote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_list: Option<ExtensionList>,
}

/// Body of `POST /transfers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransfersPostRequest {
    pub transfer_id: String,
    pub quote_id: String,
    pub payee_fsp: String,
    pub payer_fsp: String,
    pub amount: Money,
    pub ilp_packet: String,
    pub condition: String,
    pub expiration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_list: Option<ExtensionList>,
}

/// Body of `PUT /transfers/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransfersIdPutResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfilment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_timestamp: Option<String>,
    pub transfer_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_list: Option<ExtensionList>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInformation {
    pub error_code: String,
    pub error_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_list: Option<ExtensionList>,
}

/// Body of the `PUT .../error` callbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInformationObject {
    pub error_information: ErrorInformation,
}

/// A protocol message body, tagged by its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    QuotePost(QuotesPostRequest),
    QuotePut(QuotesIdPutResponse),
    QuoteError(ErrorInformationObject),
    QuoteGet,
    TransferPost(TransfersPostRequest),
    TransferPut(TransfersIdPutResponse),
    TransferError(ErrorInformationObject),
    TransferGet,
}

impl MessageBody {
    pub fn kind(&self) -> MessageKind {
        match self {
            MessageBody::QuotePost(_) => MessageKind::QuotePost,
            MessageBody::QuotePut(_) => MessageKind::QuotePut,
            MessageBody::QuoteError(_) => MessageKind::QuoteError,
            MessageBody::QuoteGet => MessageKind::QuoteGet,
            MessageBody::TransferPost(_) => MessageKind::TransferPost,
            MessageBody::TransferPut(_) => MessageKind::TransferPut,
            MessageBody::TransferError(_) => MessageKind::TransferError,
            MessageBody::TransferGet => MessageKind::TransferGet,
        }
    }

    /// Deserialises `value` into the variant chosen by `kind`.
    pub fn decode(kind: MessageKind, value: serde_json::Value) -> Result<Self> {
        let invalid = |e: serde_json::Error| {
            SwitchError::InvalidMessage(format!("malformed {kind} body: {e}"))
        };
        Ok(match kind {
            MessageKind::QuotePost => {
                MessageBody::QuotePost(serde_json::from_value(value).map_err(invalid)?)
            }
            MessageKind::QuotePut => {
                MessageBody::QuotePut(serde_json::from_value(value).map_err(invalid)?)
            }
            MessageKind::QuoteError => {
                MessageBody::QuoteError(serde_json::from_value(value).map_err(invalid)?)
            }
            MessageKind::TransferPost => {
                MessageBody::TransferPost(serde_json::from_value(value).map_err(invalid)?)
            }
            MessageKind::TransferPut => {
                MessageBody::TransferPut(serde_json::from_value(value).map_err(invalid)?)
            }
            MessageKind::TransferError => {
                MessageBody::TransferError(serde_json::from_value(value).map_err(invalid)?)
            }
            MessageKind::QuoteGet => MessageBody::QuoteGet,
            MessageKind::TransferGet => MessageBody::TransferGet,
        })
    }

    /// The JSON payload, `None` for GET requests.
    pub fn to_json(&self) -> Result<Option<serde_json::Value>> {
        let value = match self {
            MessageBody::QuotePost(body) => serde_json::to_value(body)?,
            MessageBody::QuotePut(body) => serde_json::to_value(body)?,
            MessageBody::QuoteError(body) | MessageBody::TransferError(body) => {
                serde_json::to_value(body)?
            }
            MessageBody::TransferPost(body) => serde_json::to_value(body)?,
            MessageBody::TransferPut(body) => serde_json::to_value(body)?,
            MessageBody::QuoteGet | MessageBody::TransferGet => return Ok(None),
        };
        Ok(Some(value))
    }

    /// The principal amount carried by the body, if any.
    pub fn amount(&self) -> Option<&Money> {
        match self {
            MessageBody::QuotePost(body) => Some(&body.amount),
            MessageBody::QuotePut(body) => Some(&body.transfer_amount),
            MessageBody::TransferPost(body) => Some(&body.amount),
            _ => None,
        }
    }
}

/// A protocol request travelling through the switch.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchRequest {
    pub headers: Headers,
    pub object_id: Option<String>,
    pub body: MessageBody,
}

impl SwitchRequest {
    pub fn new(headers: Headers, object_id: Option<String>, body: MessageBody) -> Self {
        Self {
            headers,
            object_id,
            body,
        }
    }

    /// Builds a request from its wire parts: validates the route, lower-cases
    /// header names and decodes the body for the route's kind.
    pub fn decode(
        method: &str,
        path: &str,
        headers: impl IntoIterator<Item = (String, String)>,
        body: Option<serde_json::Value>,
    ) -> Result<Self> {
        let (kind, object_id) = MessageKind::from_route(method, path)?;
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        let body = MessageBody::decode(kind, body.unwrap_or(serde_json::Value::Null))?;
        Ok(Self::new(headers, object_id, body))
    }

    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// The path object id; required for every PUT and GET kind.
    pub fn require_object_id(&self) -> Result<&str> {
        self.object_id.as_deref().ok_or_else(|| {
            SwitchError::InvalidMessage(format!("{} is missing its object id", self.kind()))
        })
    }

    pub fn method(&self) -> &'static str {
        self.kind().method()
    }

    pub fn path(&self) -> String {
        self.kind().path(self.object_id.as_deref())
    }
}

/// The reply a peer transport hands back for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchReply {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl SwitchReply {
    pub fn accepted() -> Self {
        Self {
            status: 202,
            body: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
