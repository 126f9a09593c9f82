use crate::application::pipeline::{Next, Rule};
use crate::domain::message::{MessageBody, SwitchReply, SwitchRequest};
use crate::domain::money::{Money, RateTable};
use crate::domain::peer::PeerInfo;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

/// Converts the amounts of messages leaving the switch into the destination
/// peer's settlement currency.
///
/// Only acts on the outgoing direction, after the next hop is known.
pub struct ForeignExchangeRule {
    peer_id: String,
    asset_code: String,
    asset_scale: u32,
    rates: Arc<RateTable>,
}

impl ForeignExchangeRule {
    pub fn new(peer: &PeerInfo, rates: Arc<RateTable>) -> Self {
        Self {
            peer_id: peer.id.clone(),
            asset_code: peer.asset_code.clone(),
            asset_scale: u32::from(peer.asset_scale),
            rates,
        }
    }

    pub fn convert(&self, money: &Money) -> Result<Money> {
        self.rates
            .convert(money, &self.asset_code, self.asset_scale)
            .inspect_err(|e| {
                error!(peer = %self.peer_id, incoming = %money, error = %e, "exchange failed");
            })
    }

    fn convert_optional(&self, money: &Option<Money>) -> Result<Option<Money>> {
        money.as_ref().map(|m| self.convert(m)).transpose()
    }

    /// Returns a copy of `body` with every amount converted. Nothing is
    /// changed if any conversion fails.
    pub fn convert_body(&self, body: &MessageBody) -> Result<MessageBody> {
        Ok(match body {
            MessageBody::QuotePost(post) => {
                let mut post = post.clone();
                post.amount = self.convert(&post.amount)?;
                post.fees = self.convert_optional(&post.fees)?;
                MessageBody::QuotePost(post)
            }
            MessageBody::QuotePut(put) => {
                let mut put = put.clone();
                put.transfer_amount = self.convert(&put.transfer_amount)?;
                put.payee_receive_amount = self.convert_optional(&put.payee_receive_amount)?;
                put.payee_fsp_fee = self.convert_optional(&put.payee_fsp_fee)?;
                put.payee_fsp_commission = self.convert_optional(&put.payee_fsp_commission)?;
                MessageBody::QuotePut(put)
            }
            MessageBody::TransferPost(post) => {
                let mut post = post.clone();
                post.amount = self.convert(&post.amount)?;
                MessageBody::TransferPost(post)
            }
            other => other.clone(),
        })
    }
}

#[async_trait]
impl Rule for ForeignExchangeRule {
    fn name(&self) -> &'static str {
        "foreign-exchange"
    }

    async fn outgoing(&self, mut request: SwitchRequest, next: Next<'_>) -> Result<SwitchReply> {
        let converted = self.convert_body(&request.body)?;
        if let (Some(before), Some(after)) = (request.body.amount(), converted.amount()) {
            debug!(peer = %self.peer_id, from = %before, to = %after, "converted amount");
        }
        request.body = converted;
        next.run(request).await
    }
}
